//! Deterministic scripted host for the `acp_protocol` event contract.
//!
//! This crate contains no transport logic. It builds realistic host event
//! sequences for transcript tests and the CLI demo mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use acp_protocol::{HostEvent, PermissionOption, PermissionOptionKind};
use serde_json::{json, Value};

/// Session identifier used by every scripted prompt.
pub const MOCK_SESSION_ID: &str = "session1";

/// Raw `text` content block.
#[must_use]
pub fn text_block(text: &str) -> Value {
    json!({ "type": "text", "text": text })
}

/// Raw `resource_link` content block.
#[must_use]
pub fn resource_link_block(uri: &str, name: &str, mime_type: &str, size: u64) -> Value {
    json!({
        "type": "resource_link",
        "uri": uri,
        "name": name,
        "mimeType": mime_type,
        "size": size,
        "title": name,
        "description": "description",
    })
}

/// Raw `resource` content block with inline text contents.
#[must_use]
pub fn text_resource_block(uri: &str, mime_type: &str, text: &str) -> Value {
    json!({
        "type": "resource",
        "resource": { "uri": uri, "mimeType": mime_type, "text": text },
    })
}

/// Raw `resource` content block with base64 blob contents.
#[must_use]
pub fn blob_resource_block(uri: &str, mime_type: &str, blob: &str) -> Value {
    json!({
        "type": "resource",
        "resource": { "uri": uri, "mimeType": mime_type, "blob": blob },
    })
}

#[must_use]
pub fn prompt(blocks: Vec<Value>) -> HostEvent {
    HostEvent::Prompt {
        session_id: MOCK_SESSION_ID.to_string(),
        prompt: blocks,
    }
}

#[must_use]
pub fn user_message(text: &str) -> HostEvent {
    HostEvent::UserMessageChunk {
        content: text_block(text),
    }
}

#[must_use]
pub fn agent_thought(text: &str) -> HostEvent {
    HostEvent::AgentThoughtChunk {
        content: text_block(text),
    }
}

#[must_use]
pub fn agent_message(text: &str) -> HostEvent {
    HostEvent::AgentMessageChunk {
        content: text_block(text),
    }
}

/// Streams `text` as one agent message chunk per word, keeping separators.
#[must_use]
pub fn streamed_agent_message(text: &str) -> Vec<HostEvent> {
    let mut events = Vec::new();
    let mut pending_token = String::new();
    for ch in text.chars() {
        pending_token.push(ch);
        if matches!(ch, ' ' | '\n') {
            events.push(agent_message(&std::mem::take(&mut pending_token)));
        }
    }
    if !pending_token.is_empty() {
        events.push(agent_message(&pending_token));
    }
    events
}

#[must_use]
pub fn tool_call(tool_call_id: &str, title: &str, kind: &str, status: &str) -> HostEvent {
    HostEvent::ToolCall {
        tool_call_id: tool_call_id.to_string(),
        title: Some(title.to_string()),
        kind: Some(kind.to_string()),
        status: Some(status.to_string()),
        content: None,
        options: None,
    }
}

#[must_use]
pub fn tool_call_update(tool_call_id: &str, status: &str, content: Option<&str>) -> HostEvent {
    HostEvent::ToolCallUpdate {
        tool_call_id: tool_call_id.to_string(),
        status: Some(status.to_string()),
        content: content.map(str::to_string),
    }
}

#[must_use]
pub fn permission_request(
    tool_call_id: &str,
    title: &str,
    options: Vec<PermissionOption>,
) -> HostEvent {
    HostEvent::PermissionRequest {
        tool_call_id: tool_call_id.to_string(),
        options,
        title: Some(title.to_string()),
        kind: None,
        input: None,
        output: None,
    }
}

/// The four standard choices, in host order.
#[must_use]
pub fn standard_options() -> Vec<PermissionOption> {
    vec![
        PermissionOption::new("allow", PermissionOptionKind::AllowOnce, "Allow"),
        PermissionOption::new("allow_always", PermissionOptionKind::AllowAlways, "Always Allow"),
        PermissionOption::new("reject", PermissionOptionKind::RejectOnce, "Reject"),
        PermissionOption::new("reject_always", PermissionOptionKind::RejectAlways, "Never Allow"),
    ]
}

/// A complete session: mixed-block prompt, interleaved thoughts and message
/// chunks, a tool call run to completion, and a gated file edit.
#[must_use]
pub fn demo_script() -> Vec<HostEvent> {
    let mut events = vec![
        prompt(vec![
            resource_link_block("file:///no/where/dot/sample", "sample.html", "text/html", 123456),
            text_resource_block(
                "file:///no/where/dot/snippet.html",
                "text/html",
                "<html><body></body></html>",
            ),
            text_block("Using sample.html and the snippet of selected xml code, compare them to "),
            resource_link_block("file:///no/where/dot/mystery", "mystery.xml", "text/xml", 654321),
            text_block("and see if the comparison matches "),
            blob_resource_block(
                "file:///no/where/dot/snippet.xml",
                "text/xml",
                "PHhtbD48Ym9keT48L2JvZHk+PC94bWw+",
            ),
            text_block(". if not ask me for additional details"),
        ]),
        agent_thought("**Im Thinking About**\n- one thing\n- another thing"),
        agent_thought("\n**Im Also Thinking About**\n- one thing\n- another thing"),
        tool_call("read_file-1", "Read sample.html", "read", "pending"),
        tool_call_update("read_file-1", "in_progress", None),
        tool_call_update(
            "read_file-1",
            "completed",
            Some("[{\"type\":\"content\",\"content\":{\"type\":\"text\",\"text\":\"<html><body></body></html>\"}}]"),
        ),
    ];
    events.extend(streamed_agent_message(
        "Here is what I came up with: the two documents share an empty body.\n",
    ));
    events.push(HostEvent::AgentMessageChunk {
        content: resource_link_block("file:///no/where/dot/mystery", "mystery.xml", "text/xml", 654321),
    });
    events.push(HostEvent::PermissionRequest {
        tool_call_id: "write_file-2".to_string(),
        options: standard_options(),
        title: Some("Write comparison.md?".to_string()),
        kind: Some("edit".to_string()),
        input: Some("{\"path\":\"comparison.md\",\"content\":\"# Same body\"}".to_string()),
        output: None,
    });
    events
}

/// Result of playing a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Finished { emitted: usize },
    Cancelled { emitted: usize },
}

/// Replays a fixed event script, optionally pacing emissions.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    events: Vec<HostEvent>,
    delay: Duration,
}

impl ScriptedHost {
    /// Creates a host that emits `events` back to back.
    #[must_use]
    pub fn new(events: Vec<HostEvent>) -> Self {
        Self {
            events,
            delay: Duration::ZERO,
        }
    }

    /// Sets the pause taken after each emitted event.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Emits every event in order, stopping early once `cancel` is set.
    pub fn play(&self, cancel: &AtomicBool, emit: &mut dyn FnMut(HostEvent)) -> PlayOutcome {
        for (emitted, event) in self.events.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                return PlayOutcome::Cancelled { emitted };
            }
            emit(event.clone());
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        PlayOutcome::Finished {
            emitted: self.events.len(),
        }
    }

    /// Renders the script as JSON lines, the format the CLI replays.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new(demo_script())
    }
}
