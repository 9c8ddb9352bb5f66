use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("no active turn; a prompt must start a turn before {event} can be applied")]
    NoActiveTurn { event: &'static str },

    #[error("content block does not match text, resource_link, or resource: {source}")]
    MalformedBlock {
        #[source]
        source: serde_json::Error,
    },

    #[error("option '{option_id}' is not offered by permission request '{tool_call_id}'")]
    UnknownOption {
        tool_call_id: String,
        option_id: String,
    },

    #[error("permission request '{tool_call_id}' was already resolved")]
    AlreadyResolved { tool_call_id: String },

    #[error("no permission request is registered for tool call '{tool_call_id}'")]
    UnknownRequest { tool_call_id: String },
}

impl TranscriptError {
    #[must_use]
    pub fn no_active_turn(event: &'static str) -> Self {
        Self::NoActiveTurn { event }
    }

    #[must_use]
    pub fn malformed_block(source: serde_json::Error) -> Self {
        Self::MalformedBlock { source }
    }

    #[must_use]
    pub fn unknown_option(tool_call_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self::UnknownOption {
            tool_call_id: tool_call_id.into(),
            option_id: option_id.into(),
        }
    }

    #[must_use]
    pub fn already_resolved(tool_call_id: impl Into<String>) -> Self {
        Self::AlreadyResolved {
            tool_call_id: tool_call_id.into(),
        }
    }

    #[must_use]
    pub fn unknown_request(tool_call_id: impl Into<String>) -> Self {
        Self::UnknownRequest {
            tool_call_id: tool_call_id.into(),
        }
    }
}
