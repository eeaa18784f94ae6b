//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default except the identity pair (`name`, `channel`),
//! which must be supplied by the config file or on the command line.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root bot configuration. Immutable once the bot is started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Hostname of the chat server.
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Display name sent with `NICK`.
    #[serde(default)]
    pub name: String,
    /// Channel to join, without the leading `#`. Its owner is the only
    /// sender whose bang-commands are acted on.
    #[serde(default)]
    pub channel: String,
    /// Pause after each processed line, in milliseconds.
    #[serde(default = "default_msg_rate")]
    pub msg_rate_ms: u64,
    /// Pause before restarting after a lost connection, in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Initial pause between failed dials. Zero retries immediately.
    #[serde(default)]
    pub connect_retry_delay_ms: u64,
    #[serde(default = "default_connect_retry_max")]
    pub connect_retry_max_ms: u64,
    /// JSON file holding `{"password": "oauth:..."}`.
    #[serde(default = "default_private_path")]
    pub private_path: PathBuf,
    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: String,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            name: String::new(),
            channel: String::new(),
            msg_rate_ms: default_msg_rate(),
            reconnect_delay_ms: default_reconnect_delay(),
            connect_retry_delay_ms: 0,
            connect_retry_max_ms: default_connect_retry_max(),
            private_path: default_private_path(),
            shutdown_command: default_shutdown_command(),
            timestamp_format: default_timestamp_format(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn msg_rate(&self) -> Duration {
        Duration::from_millis(self.msg_rate_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }

    pub fn connect_retry_max(&self) -> Duration {
        Duration::from_millis(self.connect_retry_max_ms)
    }
}

/// Chat transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
        }
    }
}

fn default_server() -> String {
    "irc.chat.twitch.tv".to_string()
}
fn default_port() -> u16 {
    6667
}
fn default_msg_rate() -> u64 {
    // 20 messages per 30 seconds
    1500
}
fn default_reconnect_delay() -> u64 {
    1000
}
fn default_connect_retry_max() -> u64 {
    30_000
}
fn default_private_path() -> PathBuf {
    PathBuf::from("private/oauth.json")
}
fn default_shutdown_command() -> String {
    "tbdown".to_string()
}
fn default_timestamp_format() -> String {
    "%b %-d %H:%M:%S IST".to_string()
}
fn default_log_dir() -> String {
    "~/.local/share/twitchbot/logs".to_string()
}
