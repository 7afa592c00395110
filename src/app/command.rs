//! Command parsing for the command line

use crate::quiz::QuestionKind;
use crate::story::{CefrLevel, LengthBucket};

/// Parsed command from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the level: :level B2
    Level(CefrLevel),
    /// Set any theme, including ones not in the picker: :theme Space travel
    Theme(String),
    /// Set the length: :length short
    Length(LengthBucket),
    /// Generate a story from the current selections: :generate
    Generate,
    /// Generate a question batch: :quiz grammar
    Quiz(QuestionKind),
    /// Drop the current batch: :reset
    Reset,
    /// Forget the story and answers: :clear
    Clear,
    /// Copy the story text to the clipboard: :copy
    Copy,
    /// Quit the application: :q or :quit
    Quit,
    /// Show help: :help or :h
    Help,
    /// Clear message: (empty command)
    Nop,
}

/// Result of parsing a command
#[derive(Debug)]
pub enum ParseResult {
    /// Successfully parsed command
    Ok(Command),
    /// Unknown command
    UnknownCommand(String),
    /// Command needs an argument
    MissingArgument(String),
    /// Argument could not be understood
    InvalidArgument { command: String, message: String },
}

fn with_arg<T>(
    name: &str,
    args: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
    wrap: impl FnOnce(T) -> Command,
) -> ParseResult {
    if args.is_empty() {
        return ParseResult::MissingArgument(name.to_string());
    }
    match parse(args) {
        Ok(value) => ParseResult::Ok(wrap(value)),
        Err(message) => ParseResult::InvalidArgument { command: name.to_string(), message },
    }
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim();

    if input.is_empty() {
        return ParseResult::Ok(Command::Nop);
    }

    // Split into command and arguments
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim()).unwrap_or("");

    match cmd.to_lowercase().as_str() {
        "level" | "lv" => with_arg("level", args, |a| a.parse(), Command::Level),
        "theme" | "th" => with_arg("theme", args, |a| Ok(a.to_string()), Command::Theme),
        "length" | "len" => with_arg("length", args, |a| a.parse(), Command::Length),
        "generate" | "gen" | "story" => ParseResult::Ok(Command::Generate),
        "quiz" => with_arg("quiz", args, |a| a.parse(), Command::Quiz),
        "reset" => ParseResult::Ok(Command::Reset),
        "clear" => ParseResult::Ok(Command::Clear),
        "copy" | "yank" => ParseResult::Ok(Command::Copy),
        "quit" | "q" => ParseResult::Ok(Command::Quit),
        "help" | "h" | "?" => ParseResult::Ok(Command::Help),
        _ => ParseResult::UnknownCommand(cmd.to_string()),
    }
}
