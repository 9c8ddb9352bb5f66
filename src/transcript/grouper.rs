//! Run-length grouping of chunk events into segments.

use crate::error::TranscriptError;

use super::store::{Segment, SegmentKind, SegmentRef, TranscriptStore};

/// Returns true when an event of `incoming` kind continues `current`.
///
/// Only coalescing kinds continue; tool calls and permission requests always
/// open their own segment.
#[must_use]
pub fn continues_segment(current: Option<&Segment>, incoming: SegmentKind) -> bool {
    incoming.coalesces() && current.is_some_and(|segment| segment.kind() == incoming)
}

/// Resolves the segment a chunk of `kind` lands in, opening one when the run changes.
///
/// Returns the target and whether it was newly opened.
pub fn chunk_target(
    store: &mut TranscriptStore,
    kind: SegmentKind,
) -> Result<(SegmentRef, bool), TranscriptError> {
    if continues_segment(store.current_segment(), kind) {
        if let Some(at) = store.current_segment_ref() {
            return Ok((at, false));
        }
    }
    let at = store.open_segment(Segment::with_blocks(kind))?;
    Ok((at, true))
}
