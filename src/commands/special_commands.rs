//! Special commands parser for the interactive console
//!
//! Special commands are prefixed with `/` and let the user:
//! - Upload a document for indexing
//! - View session status
//! - Probe backend health
//! - Display help information
//! - Exit the session
//!
//! Command words are case-insensitive; arguments (file paths) keep their
//! case. Anything that is not a special command is a query for the agent.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed in the console
///
/// These commands act on the session or the terminal rather than being
/// sent to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Upload a document for indexing
    ///
    /// `None` when no path was given; the upload is then a no-op.
    Upload(Option<PathBuf>),

    /// Show transcript size and busy indicators
    ShowStatus,

    /// Probe `GET /health`
    Health,

    /// Display help information
    Help,

    /// Exit the console
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted as a query.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with `/` but is
/// not a known command, and `CommandError::UnsupportedArgument` when a
/// command that takes no argument is given one.
///
/// # Examples
///
/// ```
/// use ragconsole::commands::special_commands::{parse_special_command, SpecialCommand};
/// use std::path::PathBuf;
///
/// let cmd = parse_special_command("/upload docs/Q3 Report.pdf").unwrap();
/// assert_eq!(cmd, SpecialCommand::Upload(Some(PathBuf::from("docs/Q3 Report.pdf"))));
///
/// let cmd = parse_special_command("what changed in Q3?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, arg)) => (word.to_lowercase(), arg.trim()),
        None => (lower.clone(), ""),
    };

    let no_arg = |command: SpecialCommand| {
        if arg.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnsupportedArgument {
                command: word.clone(),
                arg: arg.to_string(),
            })
        }
    };

    match word.as_str() {
        "/upload" | "/ingest" => Ok(SpecialCommand::Upload(
            (!arg.is_empty()).then(|| PathBuf::from(arg)),
        )),
        "/status" => no_arg(SpecialCommand::ShowStatus),
        "/health" => no_arg(SpecialCommand::Health),
        "/help" | "/?" => no_arg(SpecialCommand::Help),
        "/exit" | "/quit" => no_arg(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(word.clone())),
    }
}

/// Display help information for the console
pub fn print_help() {
    println!(
        r#"
Console Commands
================

DOCUMENTS:
  /upload <path>  - Upload a document for indexing
  /ingest <path>  - Same as /upload

SESSION INFORMATION:
  /status         - Show transcript size and pending requests
  /health         - Check that the backend is reachable
  /help           - Show this help message

EXIT:
  exit, quit      - Leave the console (the transcript is not saved)

Anything else is sent to the agent as a query.
"#
    );
}
