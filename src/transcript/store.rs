use crate::content::ContentBlocks;
use crate::error::TranscriptError;
use crate::permission::{PermissionPrompt, PermissionRequestRecord};
use crate::tool_call::ToolCallRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    SessionPrompt,
    UserMessage,
    AgentThought,
    AgentMessage,
    ToolCall,
    PermissionRequest,
}

impl SegmentKind {
    /// Whether consecutive events of this kind share one segment.
    #[must_use]
    pub fn coalesces(self) -> bool {
        !matches!(self, Self::ToolCall | Self::PermissionRequest)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionPrompt => "session_prompt",
            Self::UserMessage => "user_message",
            Self::AgentThought => "agent_thought",
            Self::AgentMessage => "agent_message",
            Self::ToolCall => "tool_call",
            Self::PermissionRequest => "permission_request",
        }
    }
}

/// Stable position of a segment: turn index, then segment index within the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentRef {
    pub turn: usize,
    pub segment: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentBody {
    Blocks(ContentBlocks),
    ToolCall(ToolCallRecord),
    Permission(PermissionRequestRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    kind: SegmentKind,
    body: SegmentBody,
}

impl Segment {
    pub(crate) fn with_blocks(kind: SegmentKind) -> Self {
        Self {
            kind,
            body: SegmentBody::Blocks(ContentBlocks::new()),
        }
    }

    pub(crate) fn from_tool_call(record: ToolCallRecord) -> Self {
        Self {
            kind: SegmentKind::ToolCall,
            body: SegmentBody::ToolCall(record),
        }
    }

    pub(crate) fn from_permission_request(record: PermissionRequestRecord) -> Self {
        Self {
            kind: SegmentKind::PermissionRequest,
            body: SegmentBody::Permission(record),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    #[must_use]
    pub fn blocks(&self) -> Option<&ContentBlocks> {
        match &self.body {
            SegmentBody::Blocks(blocks) => Some(blocks),
            _ => None,
        }
    }

    #[must_use]
    pub fn tool_call(&self) -> Option<&ToolCallRecord> {
        match &self.body {
            SegmentBody::ToolCall(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn permission_request(&self) -> Option<&PermissionRequestRecord> {
        match &self.body {
            SegmentBody::Permission(record) => Some(record),
            _ => None,
        }
    }

    /// Permission options carried by this segment, from either a tool call or a request.
    #[must_use]
    pub fn permission_prompt(&self) -> Option<&PermissionPrompt> {
        match &self.body {
            SegmentBody::Blocks(_) => None,
            SegmentBody::ToolCall(record) => record.permission(),
            SegmentBody::Permission(record) => Some(record.prompt()),
        }
    }

    pub(crate) fn blocks_mut(&mut self) -> Option<&mut ContentBlocks> {
        match &mut self.body {
            SegmentBody::Blocks(blocks) => Some(blocks),
            _ => None,
        }
    }

    pub(crate) fn tool_call_mut(&mut self) -> Option<&mut ToolCallRecord> {
        match &mut self.body {
            SegmentBody::ToolCall(record) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn permission_prompt_mut(&mut self) -> Option<&mut PermissionPrompt> {
        match &mut self.body {
            SegmentBody::Blocks(_) => None,
            SegmentBody::ToolCall(record) => record.permission_mut(),
            SegmentBody::Permission(record) => Some(record.prompt_mut()),
        }
    }

    pub(crate) fn collapse_details(&mut self) {
        match &mut self.body {
            SegmentBody::Blocks(_) => {}
            SegmentBody::ToolCall(record) => record.collapse(),
            SegmentBody::Permission(record) => record.collapse_details(),
        }
    }

    /// Returns false when the segment has nothing to expand or collapse.
    pub(crate) fn toggle_details(&mut self) -> bool {
        match &mut self.body {
            SegmentBody::Blocks(_) => false,
            SegmentBody::ToolCall(record) => record.toggle(),
            SegmentBody::Permission(record) => record.toggle_details(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    session_id: String,
    segments: Vec<Segment>,
}

impl Turn {
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Ordered, append-only collection of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptStore {
    turns: Vec<Turn>,
}

impl TranscriptStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty turn, makes it current, and returns its index.
    pub fn start_turn(&mut self, session_id: impl Into<String>) -> usize {
        self.turns.push(Turn {
            session_id: session_id.into(),
            segments: Vec::new(),
        });
        self.turns.len() - 1
    }

    pub fn current_turn(&self) -> Result<&Turn, TranscriptError> {
        self.turns
            .last()
            .ok_or_else(|| TranscriptError::no_active_turn("current_turn"))
    }

    #[must_use]
    pub fn current_segment(&self) -> Option<&Segment> {
        self.turns.last().and_then(|turn| turn.segments.last())
    }

    #[must_use]
    pub fn current_segment_ref(&self) -> Option<SegmentRef> {
        let turn = self.turns.len().checked_sub(1)?;
        let segment = self.turns[turn].segments.len().checked_sub(1)?;
        Some(SegmentRef { turn, segment })
    }

    /// Appends `segment` to the current turn and makes it current.
    pub fn open_segment(&mut self, segment: Segment) -> Result<SegmentRef, TranscriptError> {
        let turn = self
            .turns
            .len()
            .checked_sub(1)
            .ok_or_else(|| TranscriptError::no_active_turn(segment.kind.as_str()))?;
        let segments = &mut self.turns[turn].segments;
        segments.push(segment);
        Ok(SegmentRef {
            turn,
            segment: segments.len() - 1,
        })
    }

    #[must_use]
    pub fn segment(&self, at: SegmentRef) -> Option<&Segment> {
        self.turns.get(at.turn)?.segments.get(at.segment)
    }

    pub(crate) fn segment_mut(&mut self, at: SegmentRef) -> Option<&mut Segment> {
        self.turns.get_mut(at.turn)?.segments.get_mut(at.segment)
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Total segment count across all turns.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.turns.iter().map(|turn| turn.segments.len()).sum()
    }

    /// Iterates every segment in transcript order.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentRef, &Segment)> {
        self.turns.iter().enumerate().flat_map(|(turn, entry)| {
            entry
                .segments
                .iter()
                .enumerate()
                .map(move |(segment, value)| (SegmentRef { turn, segment }, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::{Segment, SegmentKind, SegmentRef, TranscriptStore};
    use crate::error::TranscriptError;

    #[test]
    fn current_turn_requires_a_started_turn() {
        let mut store = TranscriptStore::new();

        assert_matches!(store.current_turn(), Err(TranscriptError::NoActiveTurn { .. }));
        assert!(store.current_segment().is_none());
        assert_matches!(
            store.open_segment(Segment::with_blocks(SegmentKind::AgentMessage)),
            Err(TranscriptError::NoActiveTurn { event: "agent_message" })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn open_segment_appends_to_the_latest_turn() {
        let mut store = TranscriptStore::new();
        store.start_turn("s1");
        store
            .open_segment(Segment::with_blocks(SegmentKind::SessionPrompt))
            .unwrap();
        assert_eq!(store.start_turn("s1"), 1);
        let at = store
            .open_segment(Segment::with_blocks(SegmentKind::AgentMessage))
            .unwrap();

        assert_eq!(at, SegmentRef { turn: 1, segment: 0 });
        assert_eq!(store.current_segment_ref(), Some(at));
        assert_eq!(
            store.current_segment().map(Segment::kind),
            Some(SegmentKind::AgentMessage)
        );
        assert_eq!(store.current_turn().unwrap().session_id(), "s1");
        assert_eq!(store.segment_count(), 2);
        assert_eq!(
            store.segments().map(|(at, _)| at).collect::<Vec<_>>(),
            vec![
                SegmentRef { turn: 0, segment: 0 },
                SegmentRef { turn: 1, segment: 0 }
            ]
        );
    }

    #[test]
    fn fresh_turn_has_no_current_segment() {
        let mut store = TranscriptStore::new();
        store.start_turn("s1");
        store
            .open_segment(Segment::with_blocks(SegmentKind::SessionPrompt))
            .unwrap();
        store.start_turn("s1");

        assert!(store.current_segment().is_none());
        assert!(store.current_segment_ref().is_none());
    }
}
