//! Line grammar for the Twitch flavour of IRC.
//!
//! Inbound lines are matched against two regular expressions, compiled once
//! into a [`Grammar`] and shared read-only with the bot. Outbound lines are
//! built by the small helpers at the bottom of this module; every one of
//! them is terminated with CR+LF.

use regex::Regex;

/// Keepalive probe sent by the server.
pub const PING_LINE: &str = "PING :tmi.twitch.tv";
/// Reply to [`PING_LINE`], terminator included.
pub const PONG_LINE: &str = "PONG :tmi.twitch.tv\r\n";

// Word and space classes are ASCII-only.
const MESSAGE_PATTERN: &str =
    r"^:((?-u:\w)+)!(?-u:\w)+@(?-u:\w)+\.tmi\.twitch\.tv (PRIVMSG) #(?-u:\w)+(?: :(.*))?$";
const COMMAND_PATTERN: &str = r"^!((?-u:\w)+)[\t\n\f\r ]?((?-u:\w)+)?";

/// Message types the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// `PRIVMSG` to a channel
    ChannelMessage,
}

impl MessageKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "PRIVMSG" => Some(MessageKind::ChannelMessage),
            _ => None,
        }
    }
}

/// One inbound line that matched the message grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub sender: String,
    pub kind: MessageKind,
    pub payload: Option<String>,
}

impl ParsedLine {
    /// Payload text, empty when the line carried none.
    pub fn text(&self) -> &str {
        self.payload.as_deref().unwrap_or("")
    }
}

/// The compiled message and bang-command grammars.
#[derive(Debug, Clone)]
pub struct Grammar {
    message: Regex,
    command: Regex,
}

impl Grammar {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            message: Regex::new(MESSAGE_PATTERN)?,
            command: Regex::new(COMMAND_PATTERN)?,
        })
    }

    /// Match a line against the message grammar. Server notices, join
    /// confirmations and anything else that does not match yield `None`.
    pub fn parse_line(&self, line: &str) -> Option<ParsedLine> {
        let caps = self.message.captures(line)?;
        let sender = caps.get(1)?.as_str().to_string();
        let kind = MessageKind::from_tag(caps.get(2)?.as_str())?;
        let payload = caps.get(3).map(|m| m.as_str().to_string());
        Some(ParsedLine {
            sender,
            kind,
            payload,
        })
    }

    pub(crate) fn command_captures<'a>(
        &self,
        text: &'a str,
    ) -> Option<(&'a str, Option<&'a str>)> {
        let caps = self.command.captures(text)?;
        let name = caps.get(1)?.as_str();
        let argument = caps.get(2).map(|m| m.as_str());
        Some((name, argument))
    }
}

pub fn pass_line(secret: &str) -> String {
    format!("PASS {}\r\n", secret)
}

pub fn nick_line(name: &str) -> String {
    format!("NICK {}\r\n", name)
}

pub fn join_line(channel: &str) -> String {
    format!("JOIN #{}\r\n", channel)
}

pub fn privmsg_line(channel: &str, message: &str) -> String {
    format!("PRIVMSG #{} {}\r\n", channel, message)
}
