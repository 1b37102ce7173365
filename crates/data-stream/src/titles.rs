//! Parser for the `movie_titles.csv` metadata file.
//!
//! Format: `id,year,title`, ISO-8859-1 encoded. The year field is the
//! literal `NULL` when unknown, and titles routinely contain commas
//! (`"Chitty Chitty Bang, Bang"`), so the title is everything after the
//! second comma rather than a single CSV field.

use crate::error::{DataStreamError, Result};
use crate::types::MovieTitle;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a whole file with ISO-8859-1 decoding.
///
/// Unlike the rating files, the title file is small enough to hold in
/// memory, so it is read in one shot. Each Latin-1 byte maps directly to
/// the same Unicode code point.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|source| DataStreamError::UnreadableSource {
        path: path.display().to_string(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| DataStreamError::Io {
            file: path.display().to_string(),
            source,
        })?;

    let content: String = bytes.iter().map(|&b| b as char).collect();
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Parse every row of `movie_titles.csv`. Empty lines are skipped;
/// anything else that does not fit `id,year,title` is a fatal
/// [`DataStreamError::MalformedLine`].
pub fn parse_movie_titles(path: &Path) -> Result<Vec<MovieTitle>> {
    let file_name = path.display().to_string();
    let lines = read_lines_latin1(path)?;
    let mut movies = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        if line.is_empty() {
            continue;
        }

        let malformed = |reason: String| DataStreamError::MalformedLine {
            file: file_name.clone(),
            line: line_no,
            content: line.clone(),
            reason,
        };

        let mut fields = line.splitn(3, ',');
        let id = fields
            .next()
            .ok_or_else(|| malformed("missing movie id".to_string()))?;
        let year = fields
            .next()
            .ok_or_else(|| malformed("missing year".to_string()))?;
        let title = fields
            .next()
            .ok_or_else(|| malformed("missing title".to_string()))?;

        let year = if year == "NULL" {
            None
        } else {
            Some(
                year.parse()
                    .map_err(|e| malformed(format!("invalid year: {}", e)))?,
            )
        };

        movies.push(MovieTitle {
            id: id.to_string(),
            year,
            title: title.to_string(),
        });
    }

    Ok(movies)
}
