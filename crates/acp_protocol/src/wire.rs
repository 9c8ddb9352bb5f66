//! Location-string encoding for permission responses.
//!
//! Embedded front ends report a choice by navigating to
//! `response:<toolCallId>/<optionId>`; the host side decodes it back.

use thiserror::Error;

use crate::permission::PermissionResponse;

pub const RESPONSE_SCHEME: &str = "response";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("location is not a permission response: {location}")]
    NotAResponse { location: String },

    #[error("could not determine permission response from {location}")]
    Malformed { location: String },
}

impl WireError {
    fn malformed(location: &str) -> Self {
        Self::Malformed {
            location: location.to_string(),
        }
    }
}

impl PermissionResponse {
    /// Encodes this response as a `response:` location string.
    #[must_use]
    pub fn to_location(&self) -> String {
        format!(
            "{RESPONSE_SCHEME}:{}/{}",
            self.tool_call_id, self.option_id
        )
    }
}

/// Returns true when `location` uses the permission response scheme.
#[must_use]
pub fn is_permission_response(location: &str) -> bool {
    location
        .split(':')
        .next()
        .is_some_and(|prefix| prefix == RESPONSE_SCHEME)
}

/// Decodes a `response:<toolCallId>/<optionId>` location.
pub fn parse_permission_response(location: &str) -> Result<PermissionResponse, WireError> {
    if !is_permission_response(location) {
        return Err(WireError::NotAResponse {
            location: location.to_string(),
        });
    }

    let parts = location.split(':').collect::<Vec<_>>();
    let [_, info] = parts.as_slice() else {
        return Err(WireError::malformed(location));
    };

    let params = info.split('/').collect::<Vec<_>>();
    let [tool_call_id, option_id] = params.as_slice() else {
        return Err(WireError::malformed(location));
    };

    if tool_call_id.is_empty() || option_id.is_empty() {
        return Err(WireError::malformed(location));
    }

    Ok(PermissionResponse::new(*tool_call_id, *option_id))
}
