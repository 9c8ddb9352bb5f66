//! Event router for one agent session.
//!
//! Every inbound [`HostEvent`] runs to completion against the transcript before
//! the next one is applied. A failing event is rejected as a whole and leaves
//! the rest of the session usable.

use std::collections::HashMap;

use acp_protocol::{HostEvent, PermissionOption, PermissionResponse};
use serde_json::Value;
use tracing::{debug, warn};

use crate::content;
use crate::error::TranscriptError;
use crate::permission::{PermissionCorrelator, PermissionRequestRecord, ResponseSink};
use crate::tool_call::{display_title, ToolCallRecord, ToolKind};
use crate::transcript::grouper::chunk_target;
use crate::transcript::{Segment, SegmentKind, SegmentRef, TranscriptStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Title `other` tool calls from their id instead of the host title.
    pub derive_other_titles: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            derive_other_titles: true,
        }
    }
}

/// What an applied event did to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    TurnStarted {
        at: SegmentRef,
        blocks: usize,
        skipped: usize,
    },
    ChunkAppended {
        at: SegmentRef,
        opened: bool,
        blocks: usize,
    },
    ToolCallOpened {
        at: SegmentRef,
    },
    ToolCallUpdated {
        at: SegmentRef,
        status_changed: bool,
        content_applied: bool,
    },
    PermissionRequested {
        at: SegmentRef,
        superseded: Option<SegmentRef>,
    },
    UnknownToolCall {
        tool_call_id: String,
    },
}

/// A live permission request as the presentation layer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPermission<'a> {
    pub tool_call_id: &'a str,
    pub title: &'a str,
    pub options: &'a [PermissionOption],
    pub at: SegmentRef,
}

#[derive(Debug, Default)]
pub struct Session {
    store: TranscriptStore,
    correlator: PermissionCorrelator,
    tool_calls: HashMap<String, SegmentRef>,
    permission_requests: HashMap<String, SegmentRef>,
    options: SessionOptions,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    #[must_use]
    pub fn transcript(&self) -> &TranscriptStore {
        &self.store
    }

    /// Applies one host event.
    pub fn apply(&mut self, event: HostEvent) -> Result<EventOutcome, TranscriptError> {
        match event {
            HostEvent::Prompt { session_id, prompt } => self.apply_prompt(session_id, &prompt),
            HostEvent::UserMessageChunk { content } => {
                self.apply_chunk("user_message_chunk", SegmentKind::UserMessage, &content)
            }
            HostEvent::AgentThoughtChunk { content } => {
                self.apply_chunk("agent_thought_chunk", SegmentKind::AgentThought, &content)
            }
            HostEvent::AgentMessageChunk { content } => {
                self.apply_chunk("agent_message_chunk", SegmentKind::AgentMessage, &content)
            }
            HostEvent::ToolCall {
                tool_call_id,
                title,
                kind,
                status,
                content,
                options,
            } => {
                let title = display_title(
                    &tool_call_id,
                    title.as_deref(),
                    kind.as_deref().and_then(ToolKind::parse),
                    self.options.derive_other_titles,
                    options.is_some(),
                );
                let record = ToolCallRecord::create(
                    tool_call_id,
                    title,
                    kind.as_deref(),
                    status.as_deref(),
                    content,
                    options,
                );
                self.apply_tool_call(record)
            }
            HostEvent::ToolCallUpdate {
                tool_call_id,
                status,
                content,
            } => Ok(self.apply_tool_call_update(tool_call_id, status.as_deref(), content.as_deref())),
            HostEvent::PermissionRequest {
                tool_call_id,
                options,
                title,
                kind,
                input,
                output,
            } => {
                let kind = kind.as_deref().and_then(ToolKind::parse);
                let title = display_title(
                    &tool_call_id,
                    title.as_deref(),
                    kind,
                    self.options.derive_other_titles,
                    true,
                );
                let record = PermissionRequestRecord::new(
                    tool_call_id,
                    title,
                    kind,
                    options,
                    input.as_deref(),
                    output.as_deref(),
                );
                self.apply_permission_request(record)
            }
        }
    }

    fn apply_prompt(
        &mut self,
        session_id: String,
        prompt: &[Value],
    ) -> Result<EventOutcome, TranscriptError> {
        let turn = self.store.start_turn(session_id);
        let mut segment = Segment::with_blocks(SegmentKind::SessionPrompt);
        let mut skipped = 0;
        if let Some(blocks) = segment.blocks_mut() {
            for raw in prompt {
                if let Err(err) = content::append(blocks, raw) {
                    warn!(turn, error = %err, "dropping malformed prompt block");
                    skipped += 1;
                }
            }
        }
        let blocks = segment.blocks().map_or(0, |blocks| blocks.len());
        let at = self.store.open_segment(segment)?;
        debug!(turn, blocks, skipped, "turn started");
        Ok(EventOutcome::TurnStarted { at, blocks, skipped })
    }

    fn apply_chunk(
        &mut self,
        event: &'static str,
        kind: SegmentKind,
        raw: &Value,
    ) -> Result<EventOutcome, TranscriptError> {
        if self.store.is_empty() {
            return Err(TranscriptError::no_active_turn(event));
        }
        let block = content::validate(raw).inspect_err(|err| {
            warn!(event, error = %err, "dropping malformed content block");
        })?;
        let (at, opened) = chunk_target(&mut self.store, kind)?;
        let blocks = self
            .store
            .segment_mut(at)
            .and_then(Segment::blocks_mut)
            .map_or(0, |blocks| blocks.push(block));
        debug!(event, turn = at.turn, segment = at.segment, opened, blocks, "chunk appended");
        Ok(EventOutcome::ChunkAppended { at, opened, blocks })
    }

    fn apply_tool_call(&mut self, record: ToolCallRecord) -> Result<EventOutcome, TranscriptError> {
        if self.store.is_empty() {
            return Err(TranscriptError::no_active_turn("tool_call"));
        }
        let id = record.id().to_string();
        let gated = record.is_permission_request();
        let at = self.store.open_segment(Segment::from_tool_call(record))?;
        if self.tool_calls.insert(id.clone(), at).is_some() {
            debug!(tool_call_id = %id, "tool call id reused; updates now target the newest call");
        }
        if gated {
            self.correlator.register(&mut self.store, &id, at);
        }
        debug!(tool_call_id = %id, turn = at.turn, segment = at.segment, "tool call opened");
        Ok(EventOutcome::ToolCallOpened { at })
    }

    fn apply_tool_call_update(
        &mut self,
        tool_call_id: String,
        status: Option<&str>,
        content: Option<&str>,
    ) -> EventOutcome {
        let Some((at, record)) = self.tool_calls.get(&tool_call_id).copied().and_then(|at| {
            self.store
                .segment_mut(at)
                .and_then(Segment::tool_call_mut)
                .map(|record| (at, record))
        }) else {
            debug!(tool_call_id = %tool_call_id, "ignoring update for unknown tool call");
            return EventOutcome::UnknownToolCall { tool_call_id };
        };
        let status_changed = status.is_some_and(|status| record.update_status(status));
        let content_applied = content.is_some_and(|content| record.update_content(content));
        EventOutcome::ToolCallUpdated {
            at,
            status_changed,
            content_applied,
        }
    }

    fn apply_permission_request(
        &mut self,
        record: PermissionRequestRecord,
    ) -> Result<EventOutcome, TranscriptError> {
        if self.store.is_empty() {
            return Err(TranscriptError::no_active_turn("permission_request"));
        }
        let id = record.id().to_string();
        let at = self
            .store
            .open_segment(Segment::from_permission_request(record))?;
        self.permission_requests.insert(id.clone(), at);
        let superseded = self.correlator.register(&mut self.store, &id, at);
        debug!(tool_call_id = %id, turn = at.turn, segment = at.segment, "permission requested");
        Ok(EventOutcome::PermissionRequested { at, superseded })
    }

    /// Resolves the live permission request for `tool_call_id`.
    ///
    /// Exactly one response reaches `sink` per request; repeated or invalid
    /// choices fail without touching the transcript.
    pub fn resolve_permission(
        &mut self,
        sink: &mut dyn ResponseSink,
        tool_call_id: &str,
        option_id: &str,
    ) -> Result<PermissionResponse, TranscriptError> {
        self.correlator
            .resolve(&mut self.store, sink, tool_call_id, option_id)
    }

    /// Latest tool call created with `tool_call_id`.
    #[must_use]
    pub fn tool_call(&self, tool_call_id: &str) -> Option<&ToolCallRecord> {
        let at = self.tool_calls.get(tool_call_id)?;
        self.store.segment(*at)?.tool_call()
    }

    /// Latest permission request created for `tool_call_id`.
    #[must_use]
    pub fn permission_request(&self, tool_call_id: &str) -> Option<&PermissionRequestRecord> {
        let at = self.permission_requests.get(tool_call_id)?;
        self.store.segment(*at)?.permission_request()
    }

    /// Requests still waiting for a choice, in transcript order.
    #[must_use]
    pub fn pending_permissions(&self) -> Vec<PendingPermission<'_>> {
        self.correlator
            .live()
            .into_iter()
            .filter_map(|(tool_call_id, at)| {
                let segment = self.store.segment(at)?;
                let prompt = segment.permission_prompt()?;
                let title = segment
                    .permission_request()
                    .map(PermissionRequestRecord::title)
                    .or_else(|| segment.tool_call().map(ToolCallRecord::title))?;
                Some(PendingPermission {
                    tool_call_id,
                    title,
                    options: prompt.options(),
                    at,
                })
            })
            .collect()
    }

    /// Flips the detail region of the newest segment for `tool_call_id`.
    ///
    /// Returns false when no such segment exists or it has nothing to show.
    pub fn toggle_details(&mut self, tool_call_id: &str) -> bool {
        let latest = [
            self.tool_calls.get(tool_call_id),
            self.permission_requests.get(tool_call_id),
        ]
        .into_iter()
        .flatten()
        .copied()
        .max();
        latest
            .and_then(|at| self.store.segment_mut(at))
            .is_some_and(Segment::toggle_details)
    }
}
