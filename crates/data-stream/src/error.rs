//! Error types for the data-stream crate.
//!
//! Every error in a scan is fatal: a silently dropped rating corrupts any
//! aggregate a consumer computes downstream, so the stream stops at the
//! first bad line instead of skipping it. Retries belong to whichever sink
//! consumes the groups, never to the parsing core.

use thiserror::Error;

/// Errors that can occur while scanning rating source files.
///
/// The parse variants carry the source file, the 1-based line number, and
/// the raw line content so a bad input can be located by hand.
#[derive(Error, Debug)]
pub enum DataStreamError {
    /// A listed source file could not be opened.
    #[error("failed to open source file {path}: {source}")]
    UnreadableSource {
        path: String,
        source: std::io::Error,
    },

    /// I/O error while reading an already-open source file.
    #[error("I/O error reading {file}: {source}")]
    Io {
        file: String,
        source: std::io::Error,
    },

    /// A data line did not have exactly three fields, or a field failed to
    /// parse as its expected type.
    #[error("malformed line {line} in {file} ({reason}): {content:?}")]
    MalformedLine {
        file: String,
        line: usize,
        content: String,
        reason: String,
    },

    /// A data line appeared before any movie delimiter line.
    #[error("data line {line} in {file} appears before any movie delimiter: {content:?}")]
    OrphanDataLine {
        file: String,
        line: usize,
        content: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataStreamError>;
