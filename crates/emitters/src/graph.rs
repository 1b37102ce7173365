//! Load formats for the graph backend's `neo4j-admin import`.
//!
//! The bulk importer wants clean node CSVs: one file of unique viewer ids
//! and one of movie rows with proper quoting (the raw title field embeds
//! commas, which would shift columns).

use crate::traits::GroupEmitter;
use anyhow::Result;
use data_stream::{MovieRatingGroup, MovieTitle, ViewerId};
use std::collections::HashSet;
use std::io::Write;

/// Emits each viewer id once, in first-seen order.
///
/// Dedup happens in memory. That assumes the set of distinct viewer ids
/// fits in RAM; for the Prize data (~480k viewers) a pre-count confirmed
/// it does. The ratings themselves still stream one movie at a time.
#[derive(Default)]
pub struct ViewerIdEmitter {
    seen: HashSet<ViewerId>,
}

impl ViewerIdEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupEmitter for ViewerIdEmitter {
    fn name(&self) -> &str {
        "ViewerIdEmitter"
    }

    fn emit(&mut self, group: &MovieRatingGroup, out: &mut dyn Write) -> Result<()> {
        for rating in &group.ratings {
            if self.seen.insert(rating.viewer_id) {
                writeln!(out, "{}", rating.viewer_id)?;
            }
        }
        Ok(())
    }
}

/// Quote a CSV field if it embeds a comma or a quote; embedded quotes are
/// doubled.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One cleaned movie row: `id,year,title` with the title re-quoted and a
/// missing year left empty.
pub fn movie_csv_row(movie: &MovieTitle) -> String {
    let year = match movie.year {
        Some(year) => year.to_string(),
        None => String::new(),
    };
    format!("{},{},{}", movie.id, year, csv_field(&movie.title))
}

/// Write the cleaned movie node CSV.
pub fn emit_movie_csv(movies: &[MovieTitle], out: &mut dyn Write) -> Result<()> {
    for movie in movies {
        writeln!(out, "{}", movie_csv_row(movie))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_stream::RatingLine;

    fn group(movie_id: &str, viewers: &[u32]) -> MovieRatingGroup {
        MovieRatingGroup {
            movie_id: movie_id.to_string(),
            ratings: viewers
                .iter()
                .map(|&viewer_id| RatingLine {
                    viewer_id,
                    rating: 4,
                    date_rated: "2004-01-01".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_viewer_ids_deduped_in_first_seen_order() {
        let mut emitter = ViewerIdEmitter::new();
        let mut out = Vec::new();

        emitter.emit(&group("1", &[30, 10, 30]), &mut out).unwrap();
        emitter.emit(&group("2", &[10, 20]), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "30\n10\n20\n");
    }

    #[test]
    fn test_movie_row_quotes_embedded_commas() {
        let movie = MovieTitle {
            id: "5".to_string(),
            year: Some(1968),
            title: "Monty Python, Live".to_string(),
        };
        assert_eq!(movie_csv_row(&movie), "5,1968,\"Monty Python, Live\"");
    }

    #[test]
    fn test_movie_row_plain_title_unquoted() {
        let movie = MovieTitle {
            id: "1".to_string(),
            year: Some(2003),
            title: "Dinosaur Planet".to_string(),
        };
        assert_eq!(movie_csv_row(&movie), "1,2003,Dinosaur Planet");
    }

    #[test]
    fn test_movie_row_missing_year_is_empty() {
        let movie = MovieTitle {
            id: "2".to_string(),
            year: None,
            title: "Undated".to_string(),
        };
        assert_eq!(movie_csv_row(&movie), "2,,Undated");
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        let movie = MovieTitle {
            id: "8".to_string(),
            year: Some(1990),
            title: "The \"Best\" Movie".to_string(),
        };
        assert_eq!(movie_csv_row(&movie), "8,1990,\"The \"\"Best\"\" Movie\"");
    }
}
