//! # Emitters Crate
//!
//! Backend-specific load formats for the Netflix Prize data.
//!
//! Every backend loads the same grouped ratings; only the payload shape
//! differs. One [`GroupEmitter`] implementation per backend turns a
//! [`data_stream::MovieRatingGroup`] into that backend's native bulk-load
//! text, and free functions do the same for `movie_titles.csv` rows. The
//! emitters write to any `io::Write` sink and perform no network or
//! database calls themselves.
//!
//! ## Main Components
//!
//! - **traits**: The GroupEmitter trait
//! - **driver**: emit_groups, which walks a lazy scan through one emitter
//! - **relational**: flat ratings CSV and movie-table SQL
//! - **document**: mongoimport documents, `mongo` title updates, and
//!   `_bulk` payloads
//! - **graph**: unique viewer ids and cleaned movie node CSV

pub mod document;
pub mod driver;
pub mod graph;
pub mod relational;
pub mod traits;

// Re-export commonly used items for convenience
pub use document::{
    DocumentEmitter, UpdatePayloadEmitter, emit_movie_bulk, emit_movie_updates, movie_bulk_json,
    movie_update_command, new_movie_bulk_json, new_movie_document,
};
pub use driver::emit_groups;
pub use graph::{ViewerIdEmitter, emit_movie_csv, movie_csv_row};
pub use relational::{
    FlatCsvEmitter, emit_movie_sql, movie_id_sequence_sql, movie_insert_sql, new_movie_insert_sql,
};
pub use traits::GroupEmitter;
