//! Drives a lazy group stream through one emitter.

use crate::traits::GroupEmitter;
use anyhow::Result;
use data_stream::MovieRatingGroup;
use std::io::Write;

/// Walk `groups` in order, emitting each one, and return how many groups
/// were written.
///
/// The stream stays lazy: one group is in memory at a time, matching the
/// memory bound of the scan itself. The first scan error or emit failure
/// aborts the run; a partially written sink is the caller's to discard.
pub fn emit_groups<I>(
    groups: I,
    emitter: &mut dyn GroupEmitter,
    out: &mut dyn Write,
) -> Result<usize>
where
    I: IntoIterator<Item = data_stream::Result<MovieRatingGroup>>,
{
    let mut count = 0;
    for group in groups {
        let group = group?;
        tracing::debug!(
            "{}: movie {} ({} ratings)",
            emitter.name(),
            group.movie_id,
            group.ratings.len()
        );
        emitter.emit(&group, out)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}
