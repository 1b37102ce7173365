//! Load formats for the document backends.
//!
//! Three shapes, all newline-delimited JSON so they pipe directly into the
//! backends' own bulk tooling:
//!
//! - whole-movie documents for `mongoimport`
//! - `_bulk` update action/payload pairs that attach ratings to existing
//!   movie documents
//! - `_bulk` index action/source pairs for the movie metadata itself
//! - `mongo`-shell update commands that set titles on ratings documents
//!   already loaded by [`DocumentEmitter`]
//! - insert payloads for a single new movie, with the id left to the
//!   backend to generate

use crate::traits::GroupEmitter;
use anyhow::Result;
use data_stream::{MovieRatingGroup, MovieTitle};
use serde_json::json;
use std::io::Write;

/// One self-contained JSON document per movie:
/// `{"id": "...", "ratings": [...]}`.
///
/// The resulting collection holds movies that *only* have ratings; titles
/// are merged in by a separate load.
pub struct DocumentEmitter;

impl GroupEmitter for DocumentEmitter {
    fn name(&self) -> &str {
        "DocumentEmitter"
    }

    fn emit(&mut self, group: &MovieRatingGroup, out: &mut dyn Write) -> Result<()> {
        let document = json!({
            "id": group.movie_id,
            "ratings": group.ratings,
        });
        writeln!(out, "{}", document)?;
        Ok(())
    }
}

/// Bulk-update payloads that add each group's ratings to the movie document
/// already indexed under that id: an action line naming the document,
/// then the partial-document body the update endpoint expects.
///
/// The movies index is assumed to be called `movies`; sending the payloads
/// is an external client's job, not this crate's.
pub struct UpdatePayloadEmitter;

impl GroupEmitter for UpdatePayloadEmitter {
    fn name(&self) -> &str {
        "UpdatePayloadEmitter"
    }

    fn emit(&mut self, group: &MovieRatingGroup, out: &mut dyn Write) -> Result<()> {
        let action = json!({ "update": { "_id": group.movie_id } });
        let payload = json!({ "doc": { "ratings": group.ratings } });
        writeln!(out, "{}", action)?;
        writeln!(out, "{}", payload)?;
        Ok(())
    }
}

/// The two-line `_bulk` pair for one movie: index action, then source.
///
/// The original ids are "inherited" from the source data; movies added
/// later get backend-generated (non-integer) ids, which is why ids stay
/// strings end to end.
pub fn movie_bulk_json(movie: &MovieTitle) -> String {
    let action = json!({ "index": { "_id": movie.id } });
    let source = json!({ "year": movie.year, "title": movie.title });
    format!("{}\n{}", action, source)
}

/// Write the `_bulk` load body for the whole movie list.
pub fn emit_movie_bulk(movies: &[MovieTitle], out: &mut dyn Write) -> Result<()> {
    for movie in movies {
        writeln!(out, "{}", movie_bulk_json(movie))?;
    }
    Ok(())
}

/// The `mongo`-shell command that sets one movie's title and year on the
/// ratings document already loaded under that id.
pub fn movie_update_command(movie: &MovieTitle) -> String {
    let filter = json!({ "id": movie.id });
    let set_argument = json!({ "$set": { "year": movie.year, "title": movie.title } });
    format!("db.movies.updateOne(\n  {},\n  {}\n)", filter, set_argument)
}

/// Write the full `mongo` title-load script: a `use netflix` preamble to
/// select the database, then one update per movie. Runs against a
/// collection whose ratings were loaded by [`DocumentEmitter`].
pub fn emit_movie_updates(movies: &[MovieTitle], out: &mut dyn Write) -> Result<()> {
    writeln!(out, "use netflix")?;
    for movie in movies {
        writeln!(out, "{}", movie_update_command(movie))?;
    }
    Ok(())
}

/// Insert command for one brand-new movie, `mongo`-shell flavor. The
/// backend generates the document id; `ratings` starts empty for
/// consistency with the loaded documents.
pub fn new_movie_document(title: &str, year: u16) -> String {
    let document = json!({ "title": title, "year": year, "ratings": [] });
    format!("db.movies.insertOne({})", document)
}

/// `_bulk` pair for one brand-new movie. The action carries no `_id`, so
/// the index assigns one; newer movies therefore get non-integer ids.
pub fn new_movie_bulk_json(title: &str, year: u16) -> String {
    let action = json!({ "index": {} });
    let source = json!({ "year": year, "title": title });
    format!("{}\n{}", action, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_stream::RatingLine;

    fn group() -> MovieRatingGroup {
        MovieRatingGroup {
            movie_id: "7".to_string(),
            ratings: vec![RatingLine {
                viewer_id: 1488844,
                rating: 3,
                date_rated: "2005-09-06".to_string(),
            }],
        }
    }

    #[test]
    fn test_document_shape() {
        let mut out = Vec::new();
        DocumentEmitter.emit(&group(), &mut out).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(value["id"], "7");
        assert_eq!(value["ratings"][0]["viewer_id"], 1488844);
        assert_eq!(value["ratings"][0]["rating"], 3);
        assert_eq!(value["ratings"][0]["date_rated"], "2005-09-06");
    }

    #[test]
    fn test_document_zero_ratings_still_emitted() {
        let mut out = Vec::new();
        let empty = MovieRatingGroup {
            movie_id: "9".to_string(),
            ratings: vec![],
        };
        DocumentEmitter.emit(&empty, &mut out).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(value["ratings"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_update_payload_pair() {
        let mut out = Vec::new();
        UpdatePayloadEmitter.emit(&group(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let action: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let payload: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(action["update"]["_id"], "7");
        assert_eq!(payload["doc"]["ratings"][0]["rating"], 3);
    }

    #[test]
    fn test_movie_bulk_pair() {
        let movie = MovieTitle {
            id: "1".to_string(),
            year: Some(2003),
            title: "Dinosaur Planet".to_string(),
        };
        let text = movie_bulk_json(&movie);
        let lines: Vec<&str> = text.lines().collect();

        let action: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let source: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(action["index"]["_id"], "1");
        assert_eq!(source["year"], 2003);
        assert_eq!(source["title"], "Dinosaur Planet");
    }

    #[test]
    fn test_movie_update_command_shape() {
        let movie = MovieTitle {
            id: "1".to_string(),
            year: Some(2003),
            title: "Dinosaur Planet".to_string(),
        };
        assert_eq!(
            movie_update_command(&movie),
            "db.movies.updateOne(\n  {\"id\":\"1\"},\n  {\"$set\":{\"title\":\"Dinosaur Planet\",\"year\":2003}}\n)"
        );
    }

    #[test]
    fn test_movie_update_command_null_year() {
        let movie = MovieTitle {
            id: "2".to_string(),
            year: None,
            title: "Isle of Man TT 2004 Review".to_string(),
        };
        assert_eq!(
            movie_update_command(&movie),
            "db.movies.updateOne(\n  {\"id\":\"2\"},\n  {\"$set\":{\"title\":\"Isle of Man TT 2004 Review\",\"year\":null}}\n)"
        );
    }

    #[test]
    fn test_movie_updates_script_selects_database_first() {
        let movies = vec![MovieTitle {
            id: "1".to_string(),
            year: Some(2003),
            title: "Dinosaur Planet".to_string(),
        }];
        let mut out = Vec::new();
        emit_movie_updates(&movies, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("use netflix\n"));
        assert!(text.contains("db.movies.updateOne("));
    }

    #[test]
    fn test_new_movie_document_has_no_id_and_empty_ratings() {
        let command = new_movie_document("Sharknado", 2013);
        let json_start = command.find('(').unwrap() + 1;
        let document: serde_json::Value =
            serde_json::from_str(&command[json_start..command.len() - 1]).unwrap();

        assert!(command.starts_with("db.movies.insertOne("));
        assert!(document.get("id").is_none());
        assert!(document.get("_id").is_none());
        assert_eq!(document["title"], "Sharknado");
        assert_eq!(document["year"], 2013);
        assert_eq!(document["ratings"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_new_movie_bulk_action_lets_backend_assign_id() {
        let text = new_movie_bulk_json("Sharknado", 2013);
        let lines: Vec<&str> = text.lines().collect();

        let action: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let source: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert!(action["index"].get("_id").is_none());
        assert_eq!(source["title"], "Sharknado");
        assert_eq!(source["year"], 2013);
    }

    #[test]
    fn test_movie_bulk_null_year() {
        let movie = MovieTitle {
            id: "2".to_string(),
            year: None,
            title: "Isle of Man TT 2004 Review".to_string(),
        };
        let text = movie_bulk_json(&movie);
        let source: serde_json::Value =
            serde_json::from_str(text.lines().nth(1).unwrap()).unwrap();
        assert!(source["year"].is_null());
    }
}
