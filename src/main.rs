use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use twitchbot::config::credentials::FileCredentials;
use twitchbot::config::{self, BotConfig};
use twitchbot::irc::bot::{Bot, BotError};
use twitchbot::irc::connection::TcpDialer;
use twitchbot::irc::protocol::Grammar;
use twitchbot::logging::{self, ChatLogger};

#[derive(Parser, Debug)]
#[command(name = "twitchbot")]
#[command(about = "A minimal Twitch chat bot")]
#[command(long_about = "Connects to Twitch chat over IRC, joins a channel and watches it. \
The channel owner can stop the bot by typing the shutdown command (default `!tbdown`) in chat.")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    server: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Bot display name
    #[arg(short, long)]
    name: Option<String>,

    /// Channel to join (also the only account allowed to issue commands)
    #[arg(long)]
    channel: Option<String>,

    /// JSON file holding `{"password": "oauth:..."}`
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Pause after each processed line, in milliseconds
    #[arg(long)]
    msg_rate_ms: Option<u64>,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn apply(self, cfg: &mut BotConfig) {
        if let Some(server) = self.server {
            cfg.server = server;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(name) = self.name {
            cfg.name = name;
        }
        if let Some(channel) = self.channel {
            cfg.channel = channel;
        }
        if let Some(path) = self.credentials {
            cfg.private_path = path;
        }
        if let Some(rate) = self.msg_rate_ms {
            cfg.msg_rate_ms = rate;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(&args.log_level);

    let path = args.config.clone().unwrap_or_else(config::config_path);
    let mut cfg = config::load_config(&path)?;
    args.apply(&mut cfg);
    config::validate(&mut cfg)?;

    let grammar = Arc::new(Grammar::compile()?);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(logging::run_status_printer(
        event_rx,
        cfg.timestamp_format.clone(),
        ChatLogger::new(&cfg.logging),
    ));

    let credentials = FileCredentials::new(&cfg.private_path);
    let mut bot = Bot::new(cfg, grammar, TcpDialer, credentials, event_tx);
    let result = bot.start().await;

    // Closing the event channel lets the printer drain and exit.
    drop(bot);
    let _ = printer.await;

    match result {
        Ok(()) => Ok(()),
        Err(e @ BotError::Credentials(_)) => {
            eprintln!("{}", e);
            eprintln!("Aborting...");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
