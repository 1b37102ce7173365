//! Load formats for the relational backend.
//!
//! Two pieces: the flat ratings CSV that a `COPY`-style bulk load ingests,
//! and direct SQL `INSERT` statements for the movie table. Emitting SQL
//! text means the load needs no database library at all; the statements
//! pipe straight into a command line utility such as `psql`.

use crate::traits::GroupEmitter;
use anyhow::Result;
use data_stream::{MovieRatingGroup, MovieTitle};
use std::io::Write;

/// Flattens each group back into one CSV row per rating, with the movie id
/// prepended: `movie_id,viewer_id,rating,date_rated`.
pub struct FlatCsvEmitter;

impl GroupEmitter for FlatCsvEmitter {
    fn name(&self) -> &str {
        "FlatCsvEmitter"
    }

    fn emit(&mut self, group: &MovieRatingGroup, out: &mut dyn Write) -> Result<()> {
        for rating in &group.ratings {
            writeln!(
                out,
                "{},{},{},{}",
                group.movie_id, rating.viewer_id, rating.rating, rating.date_rated
            )?;
        }
        Ok(())
    }
}

/// One `INSERT` statement for the movie table.
///
/// Titles routinely contain apostrophes, which SQL escapes by doubling.
pub fn movie_insert_sql(movie: &MovieTitle) -> String {
    let year = match movie.year {
        Some(year) => year.to_string(),
        None => "null".to_string(),
    };
    let title = movie.title.replace('\'', "''");
    format!("INSERT INTO movie VALUES({}, {}, '{}');", movie.id, year, title)
}

/// Insert statement for one brand-new movie. Unlike the bulk load, no id
/// is supplied: the movie id sequence assigns the next one, which is why
/// the bulk load ends with [`movie_id_sequence_sql`].
pub fn new_movie_insert_sql(title: &str, year: u16) -> String {
    let title = title.replace('\'', "''");
    format!(
        "INSERT INTO movie (year, title) VALUES({}, '{}');",
        year, title
    )
}

/// Statement that advances the movie id sequence past the largest loaded
/// id, so inserts after the bulk load do not collide.
pub fn movie_id_sequence_sql() -> &'static str {
    "SELECT setval('movie_id_seq', (SELECT MAX(id) from movie));"
}

/// Write the full movie-table load script: one insert per movie, then the
/// sequence fix-up.
pub fn emit_movie_sql(movies: &[MovieTitle], out: &mut dyn Write) -> Result<()> {
    for movie in movies {
        writeln!(out, "{}", movie_insert_sql(movie))?;
    }
    writeln!(out, "{}", movie_id_sequence_sql())?;
    Ok(())
}
