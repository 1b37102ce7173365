//! # Data Stream Crate
//!
//! Core parsing layer for the Netflix Prize dataset.
//!
//! ## Main Components
//!
//! - **types**: Domain types (RatingLine, MovieRatingGroup, MovieTitle)
//! - **stream**: GroupedRatingStream, the lazy grouped-ratings parser
//! - **titles**: Parse the movie_titles.csv metadata file
//! - **error**: Error types for scanning
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_stream::GroupedRatingStream;
//!
//! let sources = vec![
//!     "combined_data_1.txt",
//!     "combined_data_2.txt",
//!     "combined_data_3.txt",
//!     "combined_data_4.txt",
//! ];
//!
//! for group in GroupedRatingStream::open(sources) {
//!     let group = group?;
//!     println!("movie {} has {} ratings", group.movie_id, group.ratings.len());
//! }
//! ```
//!
//! The stream holds at most one movie's ratings in memory at a time, so the
//! full 100M-rating dataset can be scanned without loading it.

// Public modules
pub mod error;
pub mod stream;
pub mod titles;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataStreamError, Result};
pub use stream::GroupedRatingStream;
pub use titles::parse_movie_titles;
pub use types::{MovieRatingGroup, MovieTitle, RatingLine, ViewerId};
