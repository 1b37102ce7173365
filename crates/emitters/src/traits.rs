//! Core trait for the per-backend load-format emitters.
//!
//! Each storage backend wants the same grouped ratings in a different
//! shape (flat CSV rows, JSON documents, bulk-update payloads, bare viewer
//! ids). An emitter is the one function that differs: group in, backend
//! payload out. The grouping itself never varies and lives in data-stream.

use anyhow::Result;
use data_stream::MovieRatingGroup;
use std::io::Write;

/// Converts one completed rating group into a backend's load format.
///
/// Emitters may carry state across groups (the viewer-id emitter keeps a
/// seen-set for dedup), hence `&mut self`. They write to a caller-supplied
/// sink and never perform their own file or network I/O.
pub trait GroupEmitter {
    /// Returns the name of this emitter (for logging/debugging)
    fn name(&self) -> &str;

    /// Write the payload for `group` to `out`.
    fn emit(&mut self, group: &MovieRatingGroup, out: &mut dyn Write) -> Result<()>;
}
