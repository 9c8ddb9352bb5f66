use acp_protocol::{parse_permission_response, HostEvent, PermissionResponse};
use acp_transcript::{ResponseSink, Session, SessionOptions};
use tracing::warn;

use crate::commands::{parse_slash_command, SlashCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Front-end message shown beside the transcript, never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug)]
pub struct App {
    session: Session,
    options: SessionOptions,
    pub notices: Vec<Notice>,
    pub should_exit: bool,
}

pub trait HostOps {
    /// Delivers a resolved permission choice to the host.
    fn send_response(&mut self, response: PermissionResponse);
    /// Completes every host request still waiting on the user as cancelled.
    fn cancel_pending(&mut self);
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

struct HostSink<'a> {
    host: &'a mut dyn HostOps,
}

impl ResponseSink for HostSink<'_> {
    fn respond(&mut self, response: PermissionResponse) {
        self.host.send_response(response);
    }
}

pub const HELP_TEXT: &str = "Commands: /choose <toolCallId> <optionId>, /respond <response-uri>, /toggle <toolCallId>, /clear, /help, /quit. Lines starting with '{' are host events.";
const INPUT_HINT: &str = "Expected a /command or a JSON host event";

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            session: Session::with_options(options),
            options,
            notices: Vec::new(),
            should_exit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn push_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }

    /// Applies one host event. Returns false when the session rejected it.
    pub fn on_host_event(&mut self, event: HostEvent, host: &mut dyn HostOps) -> bool {
        let name = event.name();
        let applied = match self.session.apply(event) {
            Ok(_) => true,
            Err(error) => {
                warn!(event = name, error = %error, "host event rejected");
                self.push_notice(NoticeLevel::Error, format!("Dropped {name}: {error}"));
                false
            }
        };
        host.request_render();
        applied
    }

    /// Parses one JSON line from the host and applies it.
    pub fn on_host_line(&mut self, line: &str, host: &mut dyn HostOps) {
        match HostEvent::from_json_line(line) {
            Ok(event) => {
                self.on_host_event(event, host);
            }
            Err(error) => {
                warn!(error = %error, "unparseable host event line");
                self.push_notice(NoticeLevel::Error, format!("Invalid host event: {error}"));
                host.request_render();
            }
        }
    }

    /// Handles one line of user input.
    pub fn on_input_line(&mut self, line: &str, host: &mut dyn HostOps) {
        let input = line.trim();
        if input.is_empty() {
            host.request_render();
            return;
        }

        if input.starts_with('{') {
            self.on_host_line(input, host);
            return;
        }

        let Some(command) = parse_slash_command(input) else {
            self.push_notice(NoticeLevel::Error, INPUT_HINT);
            host.request_render();
            return;
        };

        match command {
            SlashCommand::Help => self.push_notice(NoticeLevel::Info, HELP_TEXT),
            SlashCommand::Clear => self.clear(host),
            SlashCommand::Quit => {
                self.on_quit(host);
                return;
            }
            SlashCommand::Choose {
                tool_call_id,
                option_id,
            } => self.choose(&tool_call_id, &option_id, host),
            SlashCommand::Respond(location) => match parse_permission_response(&location) {
                Ok(response) => self.choose(&response.tool_call_id, &response.option_id, host),
                Err(error) => self.push_notice(NoticeLevel::Error, error.to_string()),
            },
            SlashCommand::Toggle(tool_call_id) => {
                if !self.session.toggle_details(&tool_call_id) {
                    self.push_notice(
                        NoticeLevel::Error,
                        format!("Nothing to expand or collapse for {tool_call_id}"),
                    );
                }
            }
            SlashCommand::Usage(usage) => self.push_notice(NoticeLevel::Error, usage),
            SlashCommand::Unknown(command) => {
                self.push_notice(NoticeLevel::Error, format!("Unknown command: {command}"));
            }
        }

        host.request_render();
    }

    /// Resolves a permission request on the user's behalf.
    pub fn choose(&mut self, tool_call_id: &str, option_id: &str, host: &mut dyn HostOps) {
        let mut sink = HostSink { host };
        match self
            .session
            .resolve_permission(&mut sink, tool_call_id, option_id)
        {
            Ok(response) => self.push_notice(
                NoticeLevel::Info,
                format!("Sent {}", response.to_location()),
            ),
            Err(error) => self.push_notice(NoticeLevel::Error, error.to_string()),
        }
    }

    /// Starts over with an empty session; host requests still waiting are cancelled.
    pub fn clear(&mut self, host: &mut dyn HostOps) {
        host.cancel_pending();
        self.session = Session::with_options(self.options);
        self.notices.clear();
        self.push_notice(NoticeLevel::Info, "Transcript cleared");
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        self.should_exit = true;
        host.request_stop();
    }
}
