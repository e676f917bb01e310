//! Line commands for the interactive front end.

use crate::types::TaskId;
use std::str::FromStr;
use thiserror::Error;

/// Usage text printed by `help` and after unknown commands
pub const USAGE: &str = "\
Commands:
  add <text>     add a task
  type <text>    set the input line
  submit         add the input line as a task
  toggle <id>    mark a task done or not done
  delete <id>    remove a task
  help           show this help
  quit           exit";

/// One parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Add a task from the given text (may be blank; the store rejects it)
    Add(String),
    /// Replace the pending input
    Type(String),
    /// Add a task from the pending input
    Submit,
    /// Flip a task's completion flag
    Toggle(TaskId),
    /// Remove a task
    Delete(TaskId),
    /// Print usage
    Help,
    /// Exit
    Quit,
}

/// Why a line could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing but whitespace
    #[error("Empty command")]
    Empty,

    /// First word is not a command
    #[error("Unknown command: {0}")]
    Unknown(String),

    /// `toggle` or `delete` without a usable id
    #[error("Invalid task id: {0:?}")]
    InvalidId(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "add" => Ok(Self::Add(rest.to_string())),
            // Keep the text as typed, minus the line ending
            "type" => Ok(Self::Type(rest.trim_end_matches(['\r', '\n']).to_string())),
            "submit" => Ok(Self::Submit),
            "toggle" => parse_id(rest).map(Self::Toggle),
            "delete" | "rm" => parse_id(rest).map(Self::Delete),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(text: &str) -> Result<TaskId, CommandError> {
    text.parse()
        .map_err(|_| CommandError::InvalidId(text.trim().to_string()))
}
