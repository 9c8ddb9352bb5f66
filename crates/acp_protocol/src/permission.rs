use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// One button offered by a permission request.
///
/// An unrecognized `kind` leaves the option selectable with no kind hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOption {
    #[serde(rename = "optionId")]
    pub option_id: String,
    #[serde(
        default,
        deserialize_with = "lenient_option_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<PermissionOptionKind>,
    pub name: String,
}

impl PermissionOption {
    #[must_use]
    pub fn new(
        option_id: impl Into<String>,
        kind: PermissionOptionKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            option_id: option_id.into(),
            kind: Some(kind),
            name: name.into(),
        }
    }
}

/// Semantic hint for a permission option.
///
/// Input accepts either the protocol names or the legacy numeric codes `0..=3`
/// that older hosts still send. Output always uses the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOptionKind {
    AllowOnce,
    AllowAlways,
    RejectOnce,
    RejectAlways,
}

impl PermissionOptionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowOnce => "allow_once",
            Self::AllowAlways => "allow_always",
            Self::RejectOnce => "reject_once",
            Self::RejectAlways => "reject_always",
        }
    }

    #[must_use]
    pub fn is_allow(self) -> bool {
        matches!(self, Self::AllowOnce | Self::AllowAlways)
    }

    fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::AllowOnce),
            1 => Some(Self::AllowAlways),
            2 => Some(Self::RejectOnce),
            3 => Some(Self::RejectAlways),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "allow_once" => Some(Self::AllowOnce),
            "allow_always" => Some(Self::AllowAlways),
            "reject_once" => Some(Self::RejectOnce),
            "reject_always" => Some(Self::RejectAlways),
            _ => None,
        }
    }
}

impl fmt::Display for PermissionOptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOptionKind {
    Name(String),
    Code(u64),
    Other(Value),
}

impl RawOptionKind {
    fn resolve(self) -> Result<PermissionOptionKind, UnknownOptionKind> {
        match self {
            Self::Name(name) => name.parse(),
            Self::Code(code) => PermissionOptionKind::from_code(code)
                .ok_or_else(|| UnknownOptionKind(code.to_string())),
            Self::Other(value) => Err(UnknownOptionKind(value.to_string())),
        }
    }
}

/// Error returned when a permission option kind is neither a known name nor a legacy code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission option kind: {0}")]
pub struct UnknownOptionKind(pub String);

impl std::str::FromStr for PermissionOptionKind {
    type Err = UnknownOptionKind;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::from_name(name).ok_or_else(|| UnknownOptionKind(name.to_string()))
    }
}

impl<'de> Deserialize<'de> for PermissionOptionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawOptionKind::deserialize(deserializer)?
            .resolve()
            .map_err(de::Error::custom)
    }
}

fn lenient_option_kind<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PermissionOptionKind>, D::Error> {
    match RawOptionKind::deserialize(deserializer)?.resolve() {
        Ok(kind) => Ok(Some(kind)),
        Err(error) => {
            debug!(error = %error, "ignoring unrecognized permission option kind");
            Ok(None)
        }
    }
}

/// The single outbound message produced when a user resolves a permission request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionResponse {
    #[serde(rename = "toolCallId")]
    pub tool_call_id: String,
    #[serde(rename = "optionId")]
    pub option_id: String,
}

impl PermissionResponse {
    #[must_use]
    pub fn new(tool_call_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            option_id: option_id.into(),
        }
    }

    /// Returns the host-facing outcome for this response.
    #[must_use]
    pub fn outcome(&self) -> PermissionOutcome {
        PermissionOutcome::Selected {
            option_id: self.option_id.clone(),
        }
    }
}

/// Completion value handed back to the host for one permission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PermissionOutcome {
    Cancelled,
    Selected {
        #[serde(rename = "optionId")]
        option_id: String,
    },
}
