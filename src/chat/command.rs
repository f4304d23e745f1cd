use inquire::autocompletion::{Autocomplete, Replacement};

// (command, description)
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/config", "Show current connection settings"),
    ("/help", "Show available commands"),
    ("/history", "Show the whole conversation so far"),
    ("/state", "Show the conversation state"),
    ("/quit", "Leave the chat"),
];

/// Slash command autocompleter
#[derive(Clone, Default)]
pub struct SlashCommandCompleter;

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') {
            return Ok(vec![]);
        }

        let suggestions: Vec<String> = SLASH_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        let replacement =
            highlighted_suggestion.map(|s| s.split_whitespace().next().unwrap_or("").to_string());
        Ok(replacement)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Config,
    Help,
    History,
    State,
    Quit,
    Unknown(String),
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// A turn for the coach, as typed.
    Text(String),
    Command(SlashCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Input::Empty;
    }

    trimmed
        .strip_prefix('/')
        .map_or_else(|| Input::Text(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some("config") => Input::Command(SlashCommand::Config),
        Some("help" | "?") => Input::Command(SlashCommand::Help),
        Some("history") => Input::Command(SlashCommand::History),
        Some("state") => Input::Command(SlashCommand::State),
        Some("quit" | "exit" | "q") => Input::Command(SlashCommand::Quit),
        _ => Input::Command(SlashCommand::Unknown(parts.join(" "))),
    }
}
