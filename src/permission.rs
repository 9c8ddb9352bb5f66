//! Permission requests and their at-most-once resolution.

use std::collections::{HashMap, HashSet};

use acp_protocol::{ContentBlock, PermissionOption, PermissionResponse};
use tracing::{info, warn};

use crate::error::TranscriptError;
use crate::tool_call::{Disclosure, ToolKind};
use crate::transcript::{SegmentRef, TranscriptStore};

/// Outbound boundary for resolved permission requests.
pub trait ResponseSink {
    fn respond(&mut self, response: PermissionResponse);
}

impl ResponseSink for Vec<PermissionResponse> {
    fn respond(&mut self, response: PermissionResponse) {
        self.push(response);
    }
}

/// The live option set offered by one request.
///
/// Options are cleared for good once an option is selected or the request is
/// superseded, so the buttons become inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPrompt {
    options: Vec<PermissionOption>,
    selected: Option<String>,
}

impl PermissionPrompt {
    #[must_use]
    pub fn new(options: Vec<PermissionOption>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &[PermissionOption] {
        &self.options
    }

    /// The option the user picked, once resolved.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.selected.is_some()
    }

    fn select(&mut self, tool_call_id: &str, option_id: &str) -> Result<(), TranscriptError> {
        if self.selected.is_some() {
            return Err(TranscriptError::already_resolved(tool_call_id));
        }
        if !self
            .options
            .iter()
            .any(|option| option.option_id == option_id)
        {
            return Err(TranscriptError::unknown_option(tool_call_id, option_id));
        }
        self.options.clear();
        self.selected = Some(option_id.to_string());
        Ok(())
    }

    fn retire(&mut self) {
        self.options.clear();
    }
}

/// Expandable pane holding a request's input or output payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPane {
    block: ContentBlock,
    disclosure: Disclosure,
}

impl DetailPane {
    /// Wraps a raw payload in a fenced `json` text block, shown expanded.
    #[must_use]
    pub fn from_payload(payload: &str) -> Self {
        Self {
            block: ContentBlock::text(format!("```json\n{}\n```", payload.trim_end())),
            disclosure: Disclosure::Expanded,
        }
    }

    #[must_use]
    pub fn block(&self) -> &ContentBlock {
        &self.block
    }

    #[must_use]
    pub fn disclosure(&self) -> Disclosure {
        self.disclosure
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequestRecord {
    id: String,
    title: String,
    kind: Option<ToolKind>,
    prompt: PermissionPrompt,
    input: Option<DetailPane>,
    output: Option<DetailPane>,
}

impl PermissionRequestRecord {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: Option<ToolKind>,
        options: Vec<PermissionOption>,
        input: Option<&str>,
        output: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            prompt: PermissionPrompt::new(options),
            input: input.map(DetailPane::from_payload),
            output: output.map(DetailPane::from_payload),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn kind(&self) -> Option<ToolKind> {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &PermissionPrompt {
        &self.prompt
    }

    pub(crate) fn prompt_mut(&mut self) -> &mut PermissionPrompt {
        &mut self.prompt
    }

    #[must_use]
    pub fn input(&self) -> Option<&DetailPane> {
        self.input.as_ref()
    }

    #[must_use]
    pub fn output(&self) -> Option<&DetailPane> {
        self.output.as_ref()
    }

    fn panes_mut(&mut self) -> impl Iterator<Item = &mut DetailPane> {
        self.input.iter_mut().chain(self.output.iter_mut())
    }

    pub(crate) fn collapse_details(&mut self) {
        for pane in self.panes_mut() {
            pane.disclosure = pane.disclosure.collapsed();
        }
    }

    pub(crate) fn toggle_details(&mut self) -> bool {
        let mut toggled = false;
        for pane in self.panes_mut() {
            pane.disclosure = pane.disclosure.toggled();
            toggled = true;
        }
        toggled
    }
}

/// Tracks the single live request per tool call and resolves it at most once.
#[derive(Debug, Default)]
pub struct PermissionCorrelator {
    live: HashMap<String, SegmentRef>,
    resolved: HashSet<String>,
}

impl PermissionCorrelator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the request at `at` as live for `tool_call_id`.
    ///
    /// A request still live for the same id is superseded: its options are
    /// cleared without emitting anything. Returns the superseded position.
    pub fn register(
        &mut self,
        store: &mut TranscriptStore,
        tool_call_id: &str,
        at: SegmentRef,
    ) -> Option<SegmentRef> {
        self.resolved.remove(tool_call_id);
        let previous = self.live.insert(tool_call_id.to_string(), at)?;
        if let Some(prompt) = store
            .segment_mut(previous)
            .and_then(|segment| segment.permission_prompt_mut())
        {
            prompt.retire();
        }
        warn!(tool_call_id, "superseding unresolved permission request");
        Some(previous)
    }

    #[must_use]
    pub fn is_live(&self, tool_call_id: &str) -> bool {
        self.live.contains_key(tool_call_id)
    }

    /// Live request positions in transcript order.
    #[must_use]
    pub fn live(&self) -> Vec<(&str, SegmentRef)> {
        let mut live = self
            .live
            .iter()
            .map(|(id, at)| (id.as_str(), *at))
            .collect::<Vec<_>>();
        live.sort_by_key(|(_, at)| *at);
        live
    }

    /// Resolves the live request for `tool_call_id` with `option_id`.
    ///
    /// On success the option set is cleared, the request's detail regions are
    /// collapsed, and exactly one response is handed to `sink`. Failures leave
    /// the transcript untouched and emit nothing.
    pub fn resolve(
        &mut self,
        store: &mut TranscriptStore,
        sink: &mut dyn ResponseSink,
        tool_call_id: &str,
        option_id: &str,
    ) -> Result<PermissionResponse, TranscriptError> {
        let Some(at) = self.live.get(tool_call_id).copied() else {
            let err = if self.resolved.contains(tool_call_id) {
                TranscriptError::already_resolved(tool_call_id)
            } else {
                TranscriptError::unknown_request(tool_call_id)
            };
            warn!(tool_call_id, option_id, error = %err, "rejected permission resolution");
            return Err(err);
        };

        let segment = store
            .segment_mut(at)
            .ok_or_else(|| TranscriptError::unknown_request(tool_call_id))?;
        let prompt = segment
            .permission_prompt_mut()
            .ok_or_else(|| TranscriptError::unknown_request(tool_call_id))?;
        if let Err(err) = prompt.select(tool_call_id, option_id) {
            warn!(tool_call_id, option_id, error = %err, "rejected permission resolution");
            return Err(err);
        }
        segment.collapse_details();

        self.live.remove(tool_call_id);
        self.resolved.insert(tool_call_id.to_string());

        let response = PermissionResponse::new(tool_call_id, option_id);
        info!(tool_call_id, option_id, "permission response emitted");
        sink.respond(response.clone());
        Ok(response)
    }
}
