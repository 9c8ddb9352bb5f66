//! Tool-call lifecycle.
//!
//! A record starts in whatever state the creating event names, moves forward on
//! updates, and stops at `completed` or `failed`. Unknown status and kind strings
//! are tolerated: they leave the record as it was.

use acp_protocol::PermissionOption;
use serde_json::Value;
use tracing::debug;

use crate::permission::PermissionPrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCallStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ToolCallStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// `pending` and `in_progress` render the same way.
    #[must_use]
    pub fn is_running(self) -> bool {
        !self.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Read,
    Edit,
    Delete,
    Move,
    Search,
    Execute,
    Think,
    Fetch,
    SwitchMode,
    Other,
}

impl ToolKind {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "read" => Some(Self::Read),
            "edit" => Some(Self::Edit),
            "delete" => Some(Self::Delete),
            "move" => Some(Self::Move),
            "search" => Some(Self::Search),
            "execute" => Some(Self::Execute),
            "think" => Some(Self::Think),
            "fetch" => Some(Self::Fetch),
            "switch_mode" => Some(Self::SwitchMode),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Search => "search",
            Self::Execute => "execute",
            Self::Think => "think",
            Self::Fetch => "fetch",
            Self::SwitchMode => "switch_mode",
            Self::Other => "other",
        }
    }
}

/// Visibility of an expandable detail region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disclosure {
    /// Nothing to show yet.
    #[default]
    Hidden,
    Expanded,
    Collapsed,
}

impl Disclosure {
    /// Whether the region exists at all, expanded or not.
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    #[must_use]
    pub fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }

    #[must_use]
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Hidden => Self::Hidden,
            Self::Expanded => Self::Collapsed,
            Self::Collapsed => Self::Expanded,
        }
    }

    #[must_use]
    pub(crate) fn collapsed(self) -> Self {
        match self {
            Self::Hidden => Self::Hidden,
            Self::Expanded | Self::Collapsed => Self::Collapsed,
        }
    }
}

/// Title shown for a tool call or permission request.
///
/// With `derive_other` set, `other` tools are titled from their id with a
/// trailing `-<digits>` removed, since hosts put raw input in those titles.
/// Permission-bearing records fall back to the id when the title is blank.
#[must_use]
pub fn display_title(
    tool_call_id: &str,
    title: Option<&str>,
    kind: Option<ToolKind>,
    derive_other: bool,
    has_permission: bool,
) -> String {
    if derive_other && kind == Some(ToolKind::Other) {
        return strip_numeric_suffix(tool_call_id).to_string();
    }
    match title.map(str::trim) {
        Some(title) if !is_placeholder_title(title) => title.to_string(),
        _ if has_permission => tool_call_id.to_string(),
        _ => String::new(),
    }
}

fn is_placeholder_title(title: &str) -> bool {
    matches!(title, "" | "{}" | "null" | "undefined")
}

fn strip_numeric_suffix(id: &str) -> &str {
    match id.rsplit_once('-') {
        Some((head, digits))
            if !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) =>
        {
            head
        }
        _ => id,
    }
}

/// True for payloads that carry nothing: blank text or an empty JSON array.
fn is_empty_payload(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return true;
    }
    matches!(
        serde_json::from_str::<Value>(trimmed),
        Ok(Value::Array(items)) if items.is_empty()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRecord {
    id: String,
    title: String,
    kind: Option<ToolKind>,
    status: Option<ToolCallStatus>,
    content: Option<String>,
    disclosure: Disclosure,
    permission: Option<PermissionPrompt>,
}

impl ToolCallRecord {
    /// Creates a record from a `tool_call` event.
    ///
    /// `kind` and `status` are parsed tolerantly. Initial content, when present,
    /// shows the content region expanded.
    #[must_use]
    pub fn create(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: Option<&str>,
        status: Option<&str>,
        content: Option<String>,
        options: Option<Vec<PermissionOption>>,
    ) -> Self {
        let id = id.into();
        let content = content.filter(|content| !is_empty_payload(content));
        let disclosure = if content.is_some() {
            Disclosure::Expanded
        } else {
            Disclosure::Hidden
        };
        Self {
            kind: kind.and_then(|raw| parse_logged(&id, "kind", raw, ToolKind::parse)),
            status: status.and_then(|raw| parse_logged(&id, "status", raw, ToolCallStatus::parse)),
            id,
            title: title.into(),
            content,
            disclosure,
            permission: options.map(PermissionPrompt::new),
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
    pub fn status(&self) -> Option<ToolCallStatus> {
        self.status
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn disclosure(&self) -> Disclosure {
        self.disclosure
    }

    /// Whether a content region has ever been shown for this call.
    #[must_use]
    pub fn is_content_visible(&self) -> bool {
        self.disclosure.is_visible()
    }

    #[must_use]
    pub fn is_permission_request(&self) -> bool {
        self.permission.is_some()
    }

    #[must_use]
    pub fn permission(&self) -> Option<&PermissionPrompt> {
        self.permission.as_ref()
    }

    pub(crate) fn permission_mut(&mut self) -> Option<&mut PermissionPrompt> {
        self.permission.as_mut()
    }

    /// Applies a status update. Returns true when the status changed.
    ///
    /// Terminal records ignore further status changes; unknown strings leave
    /// the status unchanged.
    pub fn update_status(&mut self, raw: &str) -> bool {
        if let Some(current) = self.status.filter(|status| status.is_terminal()) {
            debug!(
                tool_call_id = %self.id,
                status = current.as_str(),
                requested = raw,
                "ignoring status update for finished tool call"
            );
            return false;
        }
        let Some(next) = parse_logged(&self.id, "status", raw, ToolCallStatus::parse) else {
            return false;
        };
        if self.status == Some(next) {
            return false;
        }
        debug!(tool_call_id = %self.id, status = next.as_str(), "tool call status changed");
        self.status = Some(next);
        true
    }

    /// Replaces the accumulated content with the latest full payload.
    ///
    /// Empty payloads are ignored. The first real payload expands the content
    /// region; later payloads leave the disclosure as the user set it.
    pub fn update_content(&mut self, content: &str) -> bool {
        if is_empty_payload(content) {
            return false;
        }
        self.content = Some(content.to_string());
        if self.disclosure == Disclosure::Hidden {
            self.disclosure = Disclosure::Expanded;
        }
        true
    }

    pub(crate) fn toggle(&mut self) -> bool {
        if !self.disclosure.is_visible() {
            return false;
        }
        self.disclosure = self.disclosure.toggled();
        true
    }

    pub(crate) fn collapse(&mut self) {
        self.disclosure = self.disclosure.collapsed();
    }
}

fn parse_logged<T>(
    tool_call_id: &str,
    field: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let parsed = parse(raw);
    if parsed.is_none() {
        debug!(tool_call_id, field, value = raw, "ignoring unrecognized tool call value");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use acp_protocol::{PermissionOption, PermissionOptionKind};

    use super::{display_title, Disclosure, ToolCallRecord, ToolCallStatus, ToolKind};

    fn record(status: &str) -> ToolCallRecord {
        ToolCallRecord::create("t1", "title", Some("edit"), Some(status), None, None)
    }

    #[test]
    fn pending_runs_to_completed_through_any_number_of_progress_updates() {
        let mut call = record("pending");
        assert!(call.status().is_some_and(ToolCallStatus::is_running));

        assert!(call.update_status("in_progress"));
        assert!(!call.update_status("in_progress"));
        assert!(!call.update_status("in_progress"));
        assert!(call.update_status("completed"));

        assert_eq!(call.status(), Some(ToolCallStatus::Completed));
        assert_eq!(call.title(), "title");
        assert_eq!(call.kind(), Some(ToolKind::Edit));
    }

    #[test]
    fn terminal_states_absorb_later_updates() {
        let mut failed = record("pending");
        failed.update_status("failed");
        assert!(!failed.update_status("in_progress"));
        assert!(!failed.update_status("completed"));
        assert_eq!(failed.status(), Some(ToolCallStatus::Failed));

        assert!(failed.update_content("late output"));
        assert_eq!(failed.content(), Some("late output"));
    }

    #[test]
    fn unknown_status_and_kind_degrade_gracefully() {
        let mut call =
            ToolCallRecord::create("t1", "title", Some("teleport"), Some("queued"), None, None);
        assert_eq!(call.kind(), None);
        assert_eq!(call.status(), None);

        assert!(!call.update_status("paused"));
        assert_eq!(call.status(), None);
        assert!(call.update_status("in_progress"));
        assert!(!call.update_status("paused"));
        assert_eq!(call.status(), Some(ToolCallStatus::InProgress));
    }

    #[test]
    fn content_is_last_write_wins_and_reveals_once() {
        let mut call = record("pending");
        assert!(!call.is_content_visible());

        assert!(!call.update_content("[]"));
        assert!(!call.update_content("  "));
        assert_eq!(call.content(), None);
        assert_eq!(call.disclosure(), Disclosure::Hidden);

        assert!(call.update_content("[{\"type\":\"content\"}]"));
        assert_eq!(call.disclosure(), Disclosure::Expanded);
        assert!(call.toggle());
        assert_eq!(call.disclosure(), Disclosure::Collapsed);

        assert!(call.update_content("second"));
        assert_eq!(call.content(), Some("second"));
        assert_eq!(call.disclosure(), Disclosure::Collapsed);
        assert!(call.is_content_visible());
    }

    #[test]
    fn initial_content_expands_and_missing_content_hides() {
        let shown =
            ToolCallRecord::create("t1", "t", None, None, Some("output".to_string()), None);
        assert_eq!(shown.disclosure(), Disclosure::Expanded);

        let mut hidden = ToolCallRecord::create("t2", "t", None, None, None, None);
        assert!(!hidden.toggle());
        hidden.collapse();
        assert_eq!(hidden.disclosure(), Disclosure::Hidden);
    }

    #[test]
    fn options_make_a_permission_request() {
        let plain = record("pending");
        assert!(!plain.is_permission_request());

        let gated = ToolCallRecord::create(
            "t3",
            "t3",
            Some("edit"),
            Some("pending"),
            None,
            Some(vec![PermissionOption::new(
                "a",
                PermissionOptionKind::AllowOnce,
                "Allow",
            )]),
        );
        assert!(gated.is_permission_request());
        assert_eq!(gated.permission().map(|prompt| prompt.options().len()), Some(1));
    }

    #[test]
    fn titles_follow_kind_and_permission_rules() {
        assert_eq!(
            display_title("mcp_tool-12", Some("{\"q\":1}"), Some(ToolKind::Other), true, false),
            "mcp_tool"
        );
        assert_eq!(
            display_title("mcp_tool-12", Some("raw"), Some(ToolKind::Other), false, false),
            "raw"
        );
        assert_eq!(
            display_title("tool-v2", None, Some(ToolKind::Other), true, false),
            "tool-v2"
        );
        assert_eq!(display_title("t2", Some(""), None, true, true), "t2");
        assert_eq!(display_title("t2", Some("null"), None, true, true), "t2");
        assert_eq!(display_title("t9", Some("{}"), Some(ToolKind::Edit), true, true), "t9");
        assert_eq!(display_title("t9", Some("{}"), None, true, false), "");
        assert_eq!(display_title("t2", None, None, true, false), "");
        assert_eq!(
            display_title("t2", Some("Edit file?"), Some(ToolKind::Edit), true, true),
            "Edit file?"
        );
    }
}
