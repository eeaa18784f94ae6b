//! The chat bot: handshake, read/dispatch loop and the reconnect driver.

use crate::app::event::BotEvent;
use crate::config::credentials::{CredentialError, CredentialProvider, OAuthCredentials};
use crate::config::BotConfig;
use crate::irc::commands::{parse_command, BotCommand};
use crate::irc::connection::{Dialer, Session, SessionError};
use crate::irc::protocol::{self, Grammar, MessageKind, ParsedLine, PING_LINE, PONG_LINE};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BotError {
    #[error("message was empty")]
    EmptyMessage,
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// How a pass through [`Bot::handle_chat`] ended. In both cases the
/// session has already been disconnected.
#[derive(Debug)]
pub enum ChatOutcome {
    ShutdownRequested,
    ConnectionLost(SessionError),
}

pub struct Bot<D, C> {
    config: BotConfig,
    grammar: Arc<Grammar>,
    session: Session<D>,
    credentials: C,
    event_tx: mpsc::UnboundedSender<BotEvent>,
}

impl<D: Dialer, C: CredentialProvider> Bot<D, C> {
    pub fn new(
        config: BotConfig,
        grammar: Arc<Grammar>,
        dialer: D,
        credentials: C,
        event_tx: mpsc::UnboundedSender<BotEvent>,
    ) -> Self {
        let session = Session::new(&config.server, config.port, dialer, event_tx.clone())
            .with_retry_delay(config.connect_retry_delay(), config.connect_retry_max());
        Self {
            config,
            grammar,
            session,
            credentials,
            event_tx,
        }
    }

    /// Run until the channel owner sends the shutdown command.
    ///
    /// Credentials are read once up front and any failure there aborts the
    /// run. A lost connection is followed by a short pause and a fresh
    /// connect, handshake and read loop.
    pub async fn start(&mut self) -> Result<(), BotError> {
        let credentials = self.credentials.read_credentials()?;

        loop {
            self.session.connect().await;

            let outcome = match self.join_channel(&credentials).await {
                Ok(()) => self.handle_chat().await,
                Err(err) => {
                    warn!(error = %err, "handshake failed");
                    self.drop_connection(err).await
                }
            };

            match outcome {
                ChatOutcome::ShutdownRequested => return Ok(()),
                ChatOutcome::ConnectionLost(err) => {
                    tokio::time::sleep(self.config.reconnect_delay()).await;
                    self.emit(BotEvent::ConnectionLost {
                        reason: format!(
                            "Lost connection to {}: {}. Disconnected.",
                            self.session.server(),
                            err
                        ),
                    });
                    self.emit(BotEvent::Restarting);
                }
            }
        }
    }

    /// Send `PASS`, `NICK` and `JOIN`. The server's reply is not awaited.
    pub async fn join_channel(
        &mut self,
        credentials: &OAuthCredentials,
    ) -> Result<(), SessionError> {
        self.emit(BotEvent::Joining {
            channel: self.config.channel.clone(),
        });

        self.session
            .write(protocol::pass_line(&credentials.password).as_bytes())
            .await?;
        self.session
            .write(protocol::nick_line(&self.config.name).as_bytes())
            .await?;
        self.session
            .write(protocol::join_line(&self.config.channel).as_bytes())
            .await?;

        self.emit(BotEvent::Joined {
            channel: self.config.channel.clone(),
            name: self.config.name.clone(),
        });
        Ok(())
    }

    /// Read and dispatch lines until the connection drops or the shutdown
    /// command arrives.
    pub async fn handle_chat(&mut self) -> ChatOutcome {
        self.emit(BotEvent::Watching {
            channel: self.config.channel.clone(),
        });

        loop {
            let line = match self.session.read_line().await {
                Ok(line) => line,
                Err(err) => return self.drop_connection(err).await,
            };

            self.emit(BotEvent::Received(line.clone()));

            if line == PING_LINE {
                if let Err(err) = self.session.write(PONG_LINE.as_bytes()).await {
                    return self.drop_connection(err).await;
                }
                continue;
            }

            if let Some(parsed) = self.grammar.parse_line(&line) {
                if let Some(outcome) = self.dispatch(parsed).await {
                    return outcome;
                }
            }

            tokio::time::sleep(self.config.msg_rate()).await;
        }
    }

    /// Send a chat message to the joined channel.
    pub async fn say(&mut self, message: &str) -> Result<(), BotError> {
        if message.is_empty() {
            return Err(BotError::EmptyMessage);
        }
        let line = protocol::privmsg_line(&self.config.channel, message);
        self.session.write(line.as_bytes()).await?;
        Ok(())
    }

    async fn dispatch(&mut self, parsed: ParsedLine) -> Option<ChatOutcome> {
        match parsed.kind {
            MessageKind::ChannelMessage => {
                self.emit(BotEvent::Chat {
                    channel: self.config.channel.clone(),
                    user: parsed.sender.clone(),
                    message: parsed.text().to_string(),
                });

                let command = parse_command(&self.grammar, parsed.text())?;

                // Commands are only taken from the channel owner, identified
                // by the display name in the message prefix.
                if parsed.sender != self.config.channel {
                    return None;
                }

                match command.resolve(&self.config.shutdown_command) {
                    BotCommand::Shutdown => {
                        self.emit(BotEvent::ShutdownRequested);
                        if let Err(e) = self.session.disconnect().await {
                            debug!(error = %e, "disconnect during shutdown");
                        }
                        Some(ChatOutcome::ShutdownRequested)
                    }
                    BotCommand::Other(name) => {
                        debug!(command = %name, argument = ?command.argument, "unhandled command");
                        None
                    }
                }
            }
        }
    }

    async fn drop_connection(&mut self, err: SessionError) -> ChatOutcome {
        if let Err(e) = self.session.disconnect().await {
            debug!(error = %e, "disconnect after connection loss");
        }
        ChatOutcome::ConnectionLost(err)
    }

    fn emit(&self, event: BotEvent) {
        let _ = self.event_tx.send(event);
    }
}
