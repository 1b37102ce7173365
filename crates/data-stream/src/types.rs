//! Core domain types for the Netflix Prize dataset.

use serde::{Deserialize, Serialize};

/// Unique identifier for a viewer (the Prize data calls these customers).
pub type ViewerId = u32;

/// One rating observation: a viewer rated the current movie on a date.
///
/// The rating is an integer and is *not* range-checked here. The source
/// data stays within 1-5, but enforcing that is a consumer decision; the
/// parser's job is only to get the line into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingLine {
    pub viewer_id: ViewerId,
    pub rating: i32,
    /// ISO 8601 date token, e.g. "2005-09-06". Kept as an opaque string;
    /// nothing in the loaders ever needs it parsed.
    pub date_rated: String,
}

/// All ratings for one movie, in source encounter order.
///
/// `movie_id` is a string token even though the source ids are numeric:
/// several backends switch to non-integer ids for movies added after the
/// initial load, so coercing to an integer here would paint consumers into
/// a corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRatingGroup {
    pub movie_id: String,
    /// May legitimately be empty: a delimiter followed directly by another
    /// delimiter (or end of input) is a movie with no ratings yet.
    pub ratings: Vec<RatingLine>,
}

/// One row of `movie_titles.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieTitle {
    pub id: String,
    /// `None` when the source field is the literal `NULL`.
    pub year: Option<u16>,
    /// Everything after the second comma. Titles embed commas, so this is
    /// the remainder of the line, not a single CSV field.
    pub title: String,
}
