//! Status output and chat transcripts.
//!
//! Bot events are rendered as `[<timestamp>] <text>` lines on stdout by
//! [`run_status_printer`]. Diagnostics go through `tracing` to stderr.
//! When enabled, chat lines are also appended to daily per-channel log
//! files named `<channel>_<date>.log` in the configured log directory
//! (default: `~/.local/share/twitchbot/logs/`).

use crate::app::event::BotEvent;
use crate::config::LoggingConfig;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Install the stderr `tracing` subscriber. `RUST_LOG` takes precedence
/// over `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn status_line(timestamp_format: &str, event: &BotEvent) -> String {
    format!("[{}] {}", Local::now().format(timestamp_format), event)
}

/// Print every event until the sending side is dropped.
pub async fn run_status_printer(
    mut event_rx: mpsc::UnboundedReceiver<BotEvent>,
    timestamp_format: String,
    mut chat_logger: ChatLogger,
) {
    while let Some(event) = event_rx.recv().await {
        println!("{}", status_line(&timestamp_format, &event));
        if let BotEvent::Chat {
            channel,
            user,
            message,
        } = &event
        {
            chat_logger.log_chat(channel, user, message);
        }
    }
}

/// Writes chat lines to per-channel daily log files.
///
/// File handles are cached until the date changes. A file that cannot be
/// opened is reported once per day and then skipped.
pub struct ChatLogger {
    enabled: bool,
    log_dir: PathBuf,
    current_date: String,
    file_handles: HashMap<String, Option<fs::File>>,
}

impl ChatLogger {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            log_dir: expand_home(&config.log_dir),
            current_date: String::new(),
            file_handles: HashMap::new(),
        }
    }

    pub fn log_chat(&mut self, channel: &str, user: &str, message: &str) {
        self.log_chat_at(Local::now(), channel, user, message);
    }

    fn log_chat_at(&mut self, now: DateTime<Local>, channel: &str, user: &str, message: &str) {
        if !self.enabled {
            return;
        }

        let date = now.format("%Y-%m-%d").to_string();
        if date != self.current_date {
            // Yesterday's files are never written again.
            self.file_handles.clear();
            self.current_date = date;
        }

        let filename = format!("{}_{}.log", sanitize(channel), self.current_date);
        let log_dir = &self.log_dir;

        let handle = self.file_handles.entry(filename.clone()).or_insert_with(|| {
            let _ = fs::create_dir_all(log_dir);
            let path = log_dir.join(&filename);
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot open chat log");
                    None
                }
            }
        });

        if let Some(file) = handle {
            if let Err(e) = writeln!(file, "[{}] <{}> {}", now.format("%H:%M:%S"), user, message) {
                warn!(error = %e, "failed to write chat log");
            }
        }
    }
}

fn sanitize(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(dir)),
        None => PathBuf::from(dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_has_timestamp_prefix() {
        let line = status_line("%H:%M:%S", &BotEvent::Restarting);
        assert!(line.starts_with('['));
        assert!(line.ends_with("] Starting bot again..."));
        // [HH:MM:SS]
        assert_eq!(line.find(']'), Some(9));
    }

    #[test]
    fn test_chat_logger_appends_daily_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: true,
            log_dir: dir.path().to_string_lossy().into_owned(),
        };
        let mut logger = ChatLogger::new(&config);
        logger.log_chat("streamerx", "viewer", "hello");
        logger.log_chat("streamerx", "streamerx", "!tbdown");

        let file = dir
            .path()
            .join(format!("streamerx_{}.log", Local::now().format("%Y-%m-%d")));
        let contents = fs::read_to_string(file).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("<viewer> hello"));
        assert!(lines[1].ends_with("<streamerx> !tbdown"));
    }

    #[test]
    fn test_chat_logger_closes_files_from_previous_days() {
        use chrono::TimeZone;

        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: true,
            log_dir: dir.path().to_string_lossy().into_owned(),
        };
        let mut logger = ChatLogger::new(&config);
        let day_one = Local.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).single().unwrap();
        let day_two = Local.with_ymd_and_hms(2024, 3, 2, 0, 1, 0).single().unwrap();

        logger.log_chat_at(day_one, "streamerx", "viewer", "late");
        logger.log_chat_at(day_one, "otherchan", "viewer", "late too");
        assert_eq!(logger.file_handles.len(), 2);

        logger.log_chat_at(day_two, "streamerx", "viewer", "early");
        assert_eq!(logger.file_handles.len(), 1);
        assert!(logger.file_handles.contains_key("streamerx_2024-03-02.log"));

        let old = fs::read_to_string(dir.path().join("streamerx_2024-03-01.log")).unwrap();
        let new = fs::read_to_string(dir.path().join("streamerx_2024-03-02.log")).unwrap();
        assert_eq!(old, "[23:59:00] <viewer> late\n");
        assert_eq!(new, "[00:01:00] <viewer> early\n");
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            enabled: false,
            log_dir: dir.path().to_string_lossy().into_owned(),
        };
        ChatLogger::new(&config).log_chat("streamerx", "viewer", "hello");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("stream/er"), "stream_er");
        assert_eq!(sanitize("../etc"), ".._etc");
    }
}
