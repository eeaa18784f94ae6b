//! Transport session: a single line-oriented byte stream to the chat server.
//!
//! [`Session::connect`] blocks until a stream is open, retrying failed dials
//! forever. Read and write errors after that point are not retried here;
//! they are returned to the bot, which decides whether to reconnect.

use crate::app::event::BotEvent;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

/// Any bidirectional byte stream the session can own.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Stream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type BoxedStream = Box<dyn Stream>;

/// Opens streams to `host:port` addresses.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, addr: &str) -> io::Result<BoxedStream>;
}

/// Plain TCP dialer used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, addr: &str) -> io::Result<BoxedStream> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not connected")]
    NotConnected,
    #[error("connection closed by peer")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

struct Connection {
    reader: BufReader<ReadHalf<BoxedStream>>,
    writer: WriteHalf<BoxedStream>,
    started: Instant,
}

pub struct Session<D> {
    server: String,
    address: String,
    dialer: D,
    retry_delay: Duration,
    retry_max: Duration,
    conn: Option<Connection>,
    event_tx: mpsc::UnboundedSender<BotEvent>,
}

impl<D: Dialer> Session<D> {
    pub fn new(
        server: &str,
        port: u16,
        dialer: D,
        event_tx: mpsc::UnboundedSender<BotEvent>,
    ) -> Self {
        Self {
            server: server.to_string(),
            address: format!("{}:{}", server, port),
            dialer,
            retry_delay: Duration::ZERO,
            retry_max: Duration::ZERO,
            conn: None,
            event_tx,
        }
    }

    /// Pause `initial` after the first failed dial, doubling up to `max`.
    /// A zero `initial` retries immediately.
    pub fn with_retry_delay(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_delay = initial;
        self.retry_max = max.max(initial);
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Dial until a stream is open. Never returns without a connection.
    pub async fn connect(&mut self) {
        if self.is_connected() {
            debug!(server = %self.server, "connect called while connected; closing old stream");
            let _ = self.disconnect().await;
        }

        let mut delay = self.retry_delay;
        loop {
            self.emit(BotEvent::Connecting {
                server: self.server.clone(),
            });

            match self.dialer.dial(&self.address).await {
                Ok(stream) => {
                    let (reader, writer) = tokio::io::split(stream);
                    self.conn = Some(Connection {
                        reader: BufReader::new(reader),
                        writer,
                        started: Instant::now(),
                    });
                    self.emit(BotEvent::Connected {
                        server: self.server.clone(),
                    });
                    return;
                }
                Err(e) => {
                    debug!(address = %self.address, error = %e, "dial failed");
                    self.emit(BotEvent::ConnectFailed {
                        server: self.server.clone(),
                    });
                    if delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(delay).await;
                        delay = (delay * 2).min(self.retry_max);
                    }
                }
            }
        }
    }

    /// Close the stream and report how long it was open.
    pub async fn disconnect(&mut self) -> Result<Duration, SessionError> {
        let mut conn = self.conn.take().ok_or(SessionError::NotConnected)?;
        if let Err(e) = conn.writer.shutdown().await {
            debug!(error = %e, "error while closing stream");
        }
        let uptime = conn.started.elapsed();
        self.emit(BotEvent::Disconnected {
            server: self.server.clone(),
            uptime,
        });
        Ok(uptime)
    }

    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let conn = self.conn.as_mut().ok_or(SessionError::NotConnected)?;
        conn.writer.write_all(bytes).await?;
        conn.writer.flush().await?;
        Ok(())
    }

    /// Read one line with its `\n` or `\r\n` terminator removed. End of
    /// stream is reported as [`SessionError::Closed`].
    pub async fn read_line(&mut self) -> Result<String, SessionError> {
        let conn = self.conn.as_mut().ok_or(SessionError::NotConnected)?;
        let mut buf = Vec::new();
        let n = conn.reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Err(SessionError::Closed);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn emit(&self, event: BotEvent) {
        let _ = self.event_tx.send(event);
    }
}
