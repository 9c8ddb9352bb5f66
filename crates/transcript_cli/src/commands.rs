#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Clear,
    Quit,
    Choose {
        tool_call_id: String,
        option_id: String,
    },
    Respond(String),
    Toggle(String),
    Usage(&'static str),
    Unknown(String),
}

pub const CHOOSE_USAGE: &str = "Usage: /choose <toolCallId> <optionId>";
pub const RESPOND_USAGE: &str = "Usage: /respond response:<toolCallId>/<optionId>";
pub const TOGGLE_USAGE: &str = "Usage: /toggle <toolCallId>";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or(trimmed).to_string();
    let args = parts.collect::<Vec<_>>();

    let parsed = match (command.as_str(), args.as_slice()) {
        ("/help", _) => SlashCommand::Help,
        ("/clear", _) => SlashCommand::Clear,
        ("/quit", _) => SlashCommand::Quit,
        ("/choose", [tool_call_id, option_id]) => SlashCommand::Choose {
            tool_call_id: (*tool_call_id).to_string(),
            option_id: (*option_id).to_string(),
        },
        ("/choose", _) => SlashCommand::Usage(CHOOSE_USAGE),
        ("/respond", [location]) => SlashCommand::Respond((*location).to_string()),
        ("/respond", _) => SlashCommand::Usage(RESPOND_USAGE),
        ("/toggle", [tool_call_id]) => SlashCommand::Toggle((*tool_call_id).to_string()),
        ("/toggle", _) => SlashCommand::Usage(TOGGLE_USAGE),
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
