use std::fmt;
use std::time::Duration;

/// Status events emitted by the transport session and the bot engine.
///
/// Nothing in the engine prints directly; every observable step is sent as
/// one of these over an unbounded channel and rendered by the status
/// printer in [`crate::logging`].
#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    /// A dial attempt is about to start
    Connecting { server: String },
    ConnectFailed { server: String },
    Connected { server: String },
    Disconnected { server: String, uptime: Duration },

    /// Handshake progress
    Joining { channel: String },
    Joined { channel: String, name: String },
    Watching { channel: String },

    /// Raw line read from the server, before any dispatch
    Received(String),
    Chat {
        channel: String,
        user: String,
        message: String,
    },

    ShutdownRequested,
    ConnectionLost { reason: String },
    Restarting,
}

impl fmt::Display for BotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotEvent::Connecting { server } => write!(f, "Connecting to {}...", server),
            BotEvent::ConnectFailed { server } => {
                write!(f, "Cannot connect to {}, retrying.", server)
            }
            BotEvent::Connected { server } => write!(f, "Connected to {}!", server),
            BotEvent::Disconnected { server, uptime } => write!(
                f,
                "Closed connection from {}! | Live for: {:.6}s",
                server,
                uptime.as_secs_f64()
            ),
            BotEvent::Joining { channel } => write!(f, "Joining #{}...", channel),
            BotEvent::Joined { channel, name } => write!(f, "Joined #{} as @{}!", channel, name),
            BotEvent::Watching { channel } => write!(f, "Watching #{}...", channel),
            BotEvent::Received(line) => write!(f, "{}", line),
            BotEvent::Chat { user, message, .. } => write!(f, "{}: {}", user, message),
            BotEvent::ShutdownRequested => {
                write!(f, "Shutdown command received. Shutting down now...")
            }
            BotEvent::ConnectionLost { reason } => write!(f, "{}", reason),
            BotEvent::Restarting => write!(f, "Starting bot again..."),
        }
    }
}
