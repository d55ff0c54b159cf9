#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    New,
    List,
    Search(String),
    Open(String),
    Delete(String),
    Attach(String),
    Detach,
    Persona,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "Commands: /help, /new, /list, /search <text>, /open <id>, /delete <id>, /attach <path>..., /detach, /persona, /quit. Ctrl-C stops a streaming reply; Ctrl-D exits.";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim().to_string()),
        None => (trimmed, String::new()),
    };

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/new" => SlashCommand::New,
        "/list" => SlashCommand::List,
        "/search" => SlashCommand::Search(argument),
        "/open" => SlashCommand::Open(argument),
        "/delete" => SlashCommand::Delete(argument),
        "/attach" => SlashCommand::Attach(argument),
        "/detach" => SlashCommand::Detach,
        "/persona" => SlashCommand::Persona,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}
