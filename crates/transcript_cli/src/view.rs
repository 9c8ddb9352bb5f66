//! Plain-text transcript rendering.

use std::fmt::Write as _;

use acp_protocol::{ContentBlock, EmbeddedResource, PermissionOption};
use acp_transcript::{
    DetailPane, Disclosure, PermissionPrompt, PermissionRequestRecord, Segment, SegmentKind,
    ToolCallRecord, ToolCallStatus,
};

use crate::app::{App, NoticeLevel};

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    pub ansi: bool,
}

/// Maps a resource MIME type to a fenced-code language tag.
#[must_use]
pub fn mime_to_code_language(mime_type: Option<&str>) -> &str {
    let Some(mime_type) = mime_type else {
        return "text";
    };
    let language = ["application/x-", "text/x-", "text/", "application/"]
        .iter()
        .find_map(|prefix| mime_type.strip_prefix(prefix))
        .unwrap_or("");
    if language.is_empty() {
        "text"
    } else {
        language
    }
}

/// Renders the whole transcript followed by front-end notices.
#[must_use]
pub fn render(app: &App, options: ViewOptions) -> String {
    let mut out = String::new();
    let style = Style { ansi: options.ansi };

    for (index, turn) in app.session().transcript().turns().iter().enumerate() {
        let _ = writeln!(
            out,
            "{}",
            style.paint(BOLD, &format!("== turn {} ({}) ==", index + 1, turn.session_id()))
        );
        for segment in turn.segments() {
            render_segment(&mut out, segment, style);
        }
    }

    for notice in &app.notices {
        let line = match notice.level {
            NoticeLevel::Info => style.paint(DIM, &format!("-- {}", notice.text)),
            NoticeLevel::Error => style.paint(RED, &format!("!! {}", notice.text)),
        };
        let _ = writeln!(out, "{line}");
    }

    out
}

#[derive(Clone, Copy)]
struct Style {
    ansi: bool,
}

impl Style {
    fn paint(self, code: &str, text: &str) -> String {
        if self.ansi {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn render_segment(out: &mut String, segment: &Segment, style: Style) {
    match segment.kind() {
        SegmentKind::SessionPrompt
        | SegmentKind::UserMessage
        | SegmentKind::AgentThought
        | SegmentKind::AgentMessage => {
            let label = match segment.kind() {
                SegmentKind::SessionPrompt => "you",
                SegmentKind::UserMessage => "user",
                SegmentKind::AgentThought => "thinking",
                _ => "agent",
            };
            let body = segment
                .blocks()
                .map(|blocks| blocks.iter().map(render_block).collect::<String>())
                .unwrap_or_default();
            let header = style.paint(BOLD, &format!("[{label}]"));
            if segment.kind() == SegmentKind::AgentThought {
                let _ = writeln!(out, "{header} {}", style.paint(DIM, &body));
            } else {
                let _ = writeln!(out, "{header} {body}");
            }
        }
        SegmentKind::ToolCall => {
            if let Some(record) = segment.tool_call() {
                render_tool_call(out, record, style);
            }
        }
        SegmentKind::PermissionRequest => {
            if let Some(record) = segment.permission_request() {
                render_permission_request(out, record, style);
            }
        }
    }
}

fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { text } => text.clone(),
        ContentBlock::ResourceLink {
            uri,
            name,
            mime_type,
            size,
            ..
        } => {
            let mut details = Vec::new();
            if let Some(mime_type) = mime_type {
                details.push(mime_type.clone());
            }
            if let Some(size) = size {
                details.push(format!("{size} bytes"));
            }
            if details.is_empty() {
                format!("[{name}]({uri})")
            } else {
                format!("[{name}]({uri}) ({})", details.join(", "))
            }
        }
        ContentBlock::Resource { resource } => match resource {
            EmbeddedResource::Text {
                uri,
                mime_type,
                text,
            } => format!(
                "\n{uri}\n```{}\n{text}\n```\n",
                mime_to_code_language(mime_type.as_deref())
            ),
            EmbeddedResource::Blob { uri, mime_type, .. } => format!(
                "[embedded {}]({uri})",
                mime_type.as_deref().unwrap_or("blob")
            ),
        },
    }
}

fn status_label(status: Option<ToolCallStatus>) -> &'static str {
    match status {
        Some(ToolCallStatus::Completed) => "done",
        Some(ToolCallStatus::Failed) => "failed",
        Some(status) if status.is_running() => "running",
        _ => "?",
    }
}

fn render_tool_call(out: &mut String, record: &ToolCallRecord, style: Style) {
    let kind = record.kind().map_or("tool", |kind| kind.as_str());
    let status = status_label(record.status());
    let status = match record.status() {
        Some(ToolCallStatus::Failed) => style.paint(RED, status),
        _ => style.paint(DIM, status),
    };
    let _ = writeln!(out, "[{kind}] {} ({status}) #{}", record.title(), record.id());
    match (record.disclosure(), record.content()) {
        (Disclosure::Expanded, Some(content)) => {
            for line in content.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
        (Disclosure::Collapsed, Some(_)) => {
            let _ = writeln!(out, "    {}", style.paint(DIM, "(output collapsed)"));
        }
        _ => {}
    }
    if let Some(prompt) = record.permission() {
        render_prompt(out, record.id(), prompt, style);
    }
}

fn render_permission_request(out: &mut String, record: &PermissionRequestRecord, style: Style) {
    let _ = writeln!(
        out,
        "{} {} #{}",
        style.paint(BOLD, "[permission]"),
        record.title(),
        record.id()
    );
    render_pane(out, "input", record.input(), style);
    render_pane(out, "output", record.output(), style);
    render_prompt(out, record.id(), record.prompt(), style);
}

fn render_pane(out: &mut String, label: &str, pane: Option<&DetailPane>, style: Style) {
    let Some(pane) = pane else {
        return;
    };
    if pane.disclosure().is_expanded() {
        let _ = writeln!(out, "    {label}:");
        for line in render_block(pane.block()).lines() {
            let _ = writeln!(out, "    {line}");
        }
    } else {
        let _ = writeln!(out, "    {}", style.paint(DIM, &format!("({label} collapsed)")));
    }
}

fn render_prompt(out: &mut String, tool_call_id: &str, prompt: &PermissionPrompt, style: Style) {
    if let Some(selected) = prompt.selected() {
        let _ = writeln!(out, "    {}", style.paint(DIM, &format!("chose {selected}")));
        return;
    }
    for PermissionOption {
        option_id,
        kind,
        name,
    } in prompt.options()
    {
        let label = match kind {
            Some(kind) if kind.is_allow() => style.paint(GREEN, name),
            Some(_) => style.paint(RED, name),
            None => name.clone(),
        };
        let kind = kind.map_or("option", |kind| kind.as_str());
        let _ = writeln!(
            out,
            "    {label} [{kind}] -> /choose {tool_call_id} {option_id}"
        );
    }
}

#[cfg(test)]
mod tests {
    use acp_host_mock::{permission_request, prompt, standard_options, text_block};
    use acp_protocol::{PermissionOption, PermissionResponse};

    use super::{mime_to_code_language, render, ViewOptions, GREEN, RED, RESET};
    use crate::app::{App, HostOps};

    struct NoHost;

    impl HostOps for NoHost {
        fn send_response(&mut self, _response: PermissionResponse) {}
        fn cancel_pending(&mut self) {}
        fn request_render(&mut self) {}
        fn request_stop(&mut self) {}
    }

    #[test]
    fn option_hints_are_colored_by_allow_or_reject() {
        let mut app = App::new();
        let mut options = standard_options();
        options.push(PermissionOption {
            option_id: "later".to_string(),
            kind: None,
            name: "Ask later".to_string(),
        });
        app.on_host_event(prompt(vec![text_block("go")]), &mut NoHost);
        app.on_host_event(permission_request("t2", "Edit?", options), &mut NoHost);

        let frame = render(&app, ViewOptions { ansi: true });

        assert!(frame.contains(&format!("{GREEN}Allow{RESET} [allow_once]")));
        assert!(frame.contains(&format!("{RED}Reject{RESET} [reject_once]")));
        assert!(frame.contains("    Ask later [option] -> /choose t2 later"));
    }

    #[test]
    fn mime_types_map_to_code_languages() {
        assert_eq!(mime_to_code_language(Some("application/x-sh")), "sh");
        assert_eq!(mime_to_code_language(Some("text/x-python")), "python");
        assert_eq!(mime_to_code_language(Some("text/html")), "html");
        assert_eq!(mime_to_code_language(Some("application/json")), "json");
        assert_eq!(mime_to_code_language(Some("image/png")), "text");
        assert_eq!(mime_to_code_language(Some("text/")), "text");
        assert_eq!(mime_to_code_language(None), "text");
    }
}
