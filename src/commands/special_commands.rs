//! Special commands for the interactive chat client
//!
//! Commands are prefixed with `/` and are case-insensitive. Anything else is
//! sent to the server as a chat message.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Commands handled locally instead of being sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show the conversation so far
    History,
    /// Start a new conversation with the greeting
    Reset,
    /// Display help information
    Help,
    /// Leave the chat
    Exit,
    /// Not a special command
    None,
}

/// Parse a line of input
///
/// `exit` and `quit` are accepted without the slash.
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognised `/` command
///
/// # Examples
///
/// ```
/// use profrag::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/reset"), Ok(SpecialCommand::Reset));
/// assert_eq!(parse_special_command("physics?"), Ok(SpecialCommand::None));
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/history" => Ok(SpecialCommand::History),
        "/reset" | "/new" => Ok(SpecialCommand::Reset),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the list of special commands
pub fn print_help() {
    println!(
        r#"
Special commands:
  /history   Show the conversation so far
  /reset     Start over with a new conversation
  /help      Show this help
  /exit      Leave the chat (also: exit, quit, Ctrl-D)

Anything else is sent as a question, for example:
  Who teaches linear algebra with a rating of 4.5?
"#
    );
}
