//! Parsing of the line-oriented commands typed at the prompt.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Load(Option<String>),
    /// Engine cell index, as reported by the board projection.
    Click(usize),
    /// 1-based Connect-Four column.
    Drop(usize),
    Ai,
    Side(String),
    TwoPlayer(bool),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'; type 'help'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a cell index or square name")]
    InvalidCell(String),
    #[error("'{0}' is not a column between 1 and 7")]
    InvalidColumn(String),
    #[error("expected on/off, got '{0}'")]
    InvalidToggle(String),
}

pub const HELP: &str = "\
commands:
  new                 start a new game
  load [state]        load a saved chess position, or resync the current one
  <n> | click <n>     click cell index n
  e2 | click e2       click a chess square by name
  drop <1-7>          drop a disc in a Connect-Four column
  ai                  ask the engine to move (after a failed engine move)
  side <name>         play as white/black or red/yellow from the next game
  two-player on|off   toggle engine replies
  show                redraw the board
  quit                leave";

/// `a1` is index 0 and `h8` index 63, matching the engine's numbering.
pub fn parse_square(raw: &str) -> Option<usize> {
    let mut chars = raw.chars();
    let file = chars.next()?.to_ascii_lowercase();
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    let file = file as usize - 'a' as usize;
    let rank = rank as usize - '1' as usize;
    Some(rank * 8 + file)
}

fn parse_cell(raw: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .ok()
        .or_else(|| parse_square(raw))
        .ok_or_else(|| CommandError::InvalidCell(raw.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        if head.is_empty() {
            return Err(CommandError::Empty);
        }
        let arg = rest.split_whitespace().next();

        match head.to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            // Position codes such as FEN contain spaces; keep the whole tail.
            "load" => Ok(Self::Load((!rest.is_empty()).then(|| rest.to_string()))),
            "click" => parse_cell(arg.ok_or(CommandError::MissingArgument("click"))?).map(Self::Click),
            "drop" => {
                let raw = arg.ok_or(CommandError::MissingArgument("drop"))?;
                match raw.parse::<usize>() {
                    Ok(column @ 1..=7) => Ok(Self::Drop(column)),
                    _ => Err(CommandError::InvalidColumn(raw.to_string())),
                }
            }
            "ai" => Ok(Self::Ai),
            "side" => arg
                .map(|side| Self::Side(side.to_string()))
                .ok_or(CommandError::MissingArgument("side")),
            "two-player" | "twoplayer" => {
                let raw = arg.ok_or(CommandError::MissingArgument("two-player"))?;
                match raw.to_ascii_lowercase().as_str() {
                    "on" | "true" | "yes" => Ok(Self::TwoPlayer(true)),
                    "off" | "false" | "no" => Ok(Self::TwoPlayer(false)),
                    _ => Err(CommandError::InvalidToggle(raw.to_string())),
                }
            }
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => parse_cell(head)
                .map(Self::Click)
                .map_err(|_| CommandError::Unknown(head.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;
