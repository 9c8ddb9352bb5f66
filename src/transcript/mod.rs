//! Turn and segment bookkeeping.

pub mod grouper;
mod store;

pub use store::{Segment, SegmentKind, SegmentRef, TranscriptStore, Turn};
