//! Bang-command parser.
//!
//! Parses chat payloads of the form `!command [argument]` into
//! [`ParsedCommand`] values that the bot can act on.

use super::protocol::Grammar;

/// A `!command` with at most one argument token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub argument: Option<String>,
}

/// What the bot does with a command from the channel owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Shutdown,
    /// Recognized syntax, no handler.
    Other(String),
}

impl ParsedCommand {
    pub fn resolve(&self, shutdown_token: &str) -> BotCommand {
        if self.name == shutdown_token {
            BotCommand::Shutdown
        } else {
            BotCommand::Other(self.name.clone())
        }
    }
}

/// Parse a chat payload into a [`ParsedCommand`].
///
/// Returns `None` unless the payload starts with `!` followed by a word.
/// Anything after the optional argument token is ignored.
pub fn parse_command(grammar: &Grammar, payload: &str) -> Option<ParsedCommand> {
    let (name, argument) = grammar.command_captures(payload)?;
    Some(ParsedCommand {
        name: name.to_string(),
        argument: argument.map(|a| a.to_string()),
    })
}
