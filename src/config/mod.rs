pub mod credentials;
pub mod model;

use anyhow::{bail, Context, Result};
use chrono::format::{Item, StrftimeItems};
use std::path::{Path, PathBuf};

pub use model::{BotConfig, LoggingConfig};

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("twitchbot")
        .join("config.toml")
}

/// Load the config at `path`, falling back to defaults when the file does
/// not exist.
pub fn load_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        return Ok(BotConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: BotConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Normalize and check the identity fields. A leading `#` on the channel is
/// stripped.
pub fn validate(config: &mut BotConfig) -> Result<()> {
    if let Some(stripped) = config.channel.strip_prefix('#') {
        config.channel = stripped.to_string();
    }
    if config.name.trim().is_empty() {
        bail!("Bot name is not set (use `name` in the config or --name)");
    }
    if config.channel.trim().is_empty() {
        bail!("Channel is not set (use `channel` in the config or --channel)");
    }
    if config.server.trim().is_empty() {
        bail!("Server is not set");
    }
    if StrftimeItems::new(&config.timestamp_format).any(|item| matches!(item, Item::Error)) {
        bail!("Invalid timestamp_format {:?}", config.timestamp_format);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.server, "irc.chat.twitch.tv");
        assert_eq!(cfg.port, 6667);
        assert_eq!(cfg.shutdown_command, "tbdown");
        assert_eq!(cfg.connect_retry_delay_ms, 0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        let contents = r#"
name = "bot1"
channel = "streamerx"
msg_rate_ms = 20

[logging]
enabled = true
"#;
        file.write_all(contents.as_bytes()).unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.name, "bot1");
        assert_eq!(cfg.channel, "streamerx");
        assert_eq!(cfg.msg_rate_ms, 20);
        assert_eq!(cfg.reconnect_delay_ms, 1000);
        assert!(cfg.logging.enabled);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_validate() {
        let mut cfg = BotConfig {
            name: "bot1".into(),
            channel: "#streamerx".into(),
            ..BotConfig::default()
        };
        validate(&mut cfg).unwrap();
        assert_eq!(cfg.channel, "streamerx");

        cfg.name.clear();
        assert!(validate(&mut cfg).is_err());

        let mut cfg = BotConfig {
            name: "bot1".into(),
            ..BotConfig::default()
        };
        assert!(validate(&mut cfg).is_err());

        let mut cfg = BotConfig {
            name: "bot1".into(),
            channel: "streamerx".into(),
            timestamp_format: "%Q".into(),
            ..BotConfig::default()
        };
        assert!(validate(&mut cfg).is_err());
    }
}
