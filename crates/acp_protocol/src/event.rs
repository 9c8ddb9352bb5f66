use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::permission::PermissionOption;

/// Host-emitted session event, in host emission order.
///
/// Content payloads stay as raw JSON so block validation happens where the
/// block is appended. Tool `kind` and `status` travel as raw strings because
/// the host protocol may add values the transcript does not know yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Prompt {
        #[serde(rename = "sessionId")]
        session_id: String,
        prompt: Vec<Value>,
    },
    UserMessageChunk {
        content: Value,
    },
    AgentThoughtChunk {
        content: Value,
    },
    AgentMessageChunk {
        content: Value,
    },
    ToolCall {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        options: Option<Vec<PermissionOption>>,
    },
    ToolCallUpdate {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },
    PermissionRequest {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        options: Vec<PermissionOption>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default)]
        input: Option<String>,
        #[serde(default)]
        output: Option<String>,
    },
}

impl HostEvent {
    /// Returns the wire name of this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prompt { .. } => "prompt",
            Self::UserMessageChunk { .. } => "user_message_chunk",
            Self::AgentThoughtChunk { .. } => "agent_thought_chunk",
            Self::AgentMessageChunk { .. } => "agent_message_chunk",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolCallUpdate { .. } => "tool_call_update",
            Self::PermissionRequest { .. } => "permission_request",
        }
    }

    /// Returns the tool call this event targets, when it targets one.
    #[must_use]
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::ToolCall { tool_call_id, .. }
            | Self::ToolCallUpdate { tool_call_id, .. }
            | Self::PermissionRequest { tool_call_id, .. } => Some(tool_call_id),
            Self::Prompt { .. }
            | Self::UserMessageChunk { .. }
            | Self::AgentThoughtChunk { .. }
            | Self::AgentMessageChunk { .. } => None,
        }
    }

    /// Parses one JSON line as emitted by the host.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
