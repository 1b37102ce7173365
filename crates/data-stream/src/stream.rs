//! Streaming grouped-ratings parser for the Prize `combined_data_*.txt` files.
//!
//! The rating files interleave two kinds of lines: a movie delimiter
//! (`1234:`) opening a block, and data lines (`viewer,rating,date`) that
//! belong to the most recently opened block. Every loader and query over
//! these files needs the same regrouping, so it lives here once: the stream
//! walks the files in order, keeps exactly one group open at a time, and
//! hands each [`MovieRatingGroup`] to the caller the moment its block
//! closes. Memory stays bounded to one movie's ratings no matter how large
//! the inputs are.
//!
//! The stream is pull-based and single-use: iterate it once, call
//! [`GroupedRatingStream::open`] again to re-scan. Dropping it mid-scan
//! drops whichever file handle is open.

use crate::error::{DataStreamError, Result};
use crate::types::{MovieRatingGroup, RatingLine};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Returns the movie id when `line` is a delimiter line (`^[0-9]+:$`),
/// `None` otherwise. A line like `12,3,2005-01-01` starts with digits but
/// is not a delimiter; the colon must be the final and only extra character.
fn delimiter_movie_id(line: &str) -> Option<&str> {
    let id = line.strip_suffix(':')?;
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

/// One open source file plus the cursor state needed for error reporting.
struct SourceFile {
    name: String,
    reader: BufReader<File>,
    line_no: usize,
    buf: Vec<u8>,
}

impl SourceFile {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| DataStreamError::UnreadableSource {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            name: path.display().to_string(),
            reader: BufReader::new(file),
            line_no: 0,
            buf: Vec::new(),
        })
    }

    /// Read the next line, or `None` at end of file.
    ///
    /// The Prize files are ISO-8859-1 encoded, so the raw bytes are decoded
    /// byte-for-byte (each Latin-1 byte is the same Unicode code point)
    /// rather than through a UTF-8 validation that could reject them. One
    /// line is decoded at a time; the file is never slurped.
    fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| DataStreamError::Io {
                file: self.name.clone(),
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let mut line: String = self.buf.iter().map(|&b| b as char).collect();
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// Lazily regroups flat rating lines under their movie delimiters.
///
/// Yields `Result<MovieRatingGroup>`; the first `Err` fuses the stream
/// (subsequent `next()` returns `None`). Groups already yielded before an
/// error remain valid.
///
/// The input files are treated as one continuous line stream, so a block
/// may end exactly at a file boundary without losing or duplicating lines.
/// An empty file list yields an empty sequence.
pub struct GroupedRatingStream {
    pending: std::vec::IntoIter<PathBuf>,
    current: Option<SourceFile>,
    open_group: Option<MovieRatingGroup>,
    finished: bool,
}

impl GroupedRatingStream {
    /// Begin a scan over `files`, in order. Files are opened lazily, one at
    /// a time, as the caller pulls groups; an unreadable file surfaces as
    /// an `Err` item when the scan reaches it.
    pub fn open<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
        Self {
            pending: files.into_iter(),
            current: None,
            open_group: None,
            finished: false,
        }
    }

    /// Advance to the next completed group.
    ///
    /// Reads exactly as far as needed: the line that closes a group is the
    /// next delimiter, which becomes the new open group before the closed
    /// one is returned. `Ok(None)` means all input is exhausted and the
    /// final group (if any) has already been flushed.
    fn scan_next(&mut self) -> Result<Option<MovieRatingGroup>> {
        loop {
            if self.current.is_none() {
                match self.pending.next() {
                    Some(path) => self.current = Some(SourceFile::open(&path)?),
                    // All files exhausted: flush the last open group once.
                    None => return Ok(self.open_group.take()),
                }
            }
            let Some(source) = self.current.as_mut() else {
                continue;
            };

            let Some(line) = source.next_line()? else {
                // End of this file; drop its handle before opening the next.
                self.current = None;
                continue;
            };
            if line.is_empty() {
                continue;
            }

            if let Some(id) = delimiter_movie_id(&line) {
                let next_group = MovieRatingGroup {
                    movie_id: id.to_string(),
                    ratings: Vec::new(),
                };
                // The previous block is complete the instant a new
                // delimiter shows up. Zero ratings is a valid block.
                if let Some(done) = self.open_group.replace(next_group) {
                    return Ok(Some(done));
                }
                continue;
            }

            let Some(group) = self.open_group.as_mut() else {
                return Err(DataStreamError::OrphanDataLine {
                    file: source.name.clone(),
                    line: source.line_no,
                    content: line,
                });
            };
            group.ratings.push(parse_data_line(&line, &source.name, source.line_no)?);
        }
    }
}

impl Iterator for GroupedRatingStream {
    type Item = Result<MovieRatingGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.scan_next() {
            Ok(Some(group)) => Some(Ok(group)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                self.current = None;
                self.open_group = None;
                Some(Err(error))
            }
        }
    }
}

/// Split a data line into its exactly-three comma-separated fields.
fn parse_data_line(line: &str, file: &str, line_no: usize) -> Result<RatingLine> {
    let malformed = |reason: String| DataStreamError::MalformedLine {
        file: file.to_string(),
        line: line_no,
        content: line.to_string(),
        reason,
    };

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 3 {
        return Err(malformed(format!(
            "expected 3 fields, found {}",
            fields.len()
        )));
    }

    let viewer_id = fields[0]
        .parse()
        .map_err(|e| malformed(format!("invalid viewer id: {}", e)))?;
    let rating = fields[1]
        .parse()
        .map_err(|e| malformed(format!("invalid rating: {}", e)))?;

    Ok(RatingLine {
        viewer_id,
        rating,
        date_rated: fields[2].to_string(),
    })
}
