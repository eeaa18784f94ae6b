//! In-memory dialer and helpers shared by the connection and bot tests.

use crate::app::event::BotEvent;
use crate::irc::connection::{BoxedStream, Dialer};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{duplex, DuplexStream};
use tokio::sync::mpsc;

#[derive(Default)]
struct Script {
    failures: usize,
    streams: VecDeque<DuplexStream>,
    dials: usize,
}

/// Fails a fixed number of dials, then hands out queued duplex streams.
/// Once the queue is empty every dial is refused.
#[derive(Clone, Default)]
pub struct ScriptedDialer {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_times(self, n: usize) -> Self {
        self.script.lock().unwrap().failures = n;
        self
    }

    /// Queue a client stream and return the server end.
    pub fn push_stream(&self) -> DuplexStream {
        let (client, server) = duplex(64 * 1024);
        self.script.lock().unwrap().streams.push_back(client);
        server
    }

    pub fn dials(&self) -> usize {
        self.script.lock().unwrap().dials
    }
}

#[async_trait]
impl Dialer for ScriptedDialer {
    async fn dial(&self, _addr: &str) -> io::Result<BoxedStream> {
        let mut script = self.script.lock().unwrap();
        script.dials += 1;
        if script.failures > 0 {
            script.failures -= 1;
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "scripted failure"));
        }
        match script.streams.pop_front() {
            Some(stream) => Ok(Box::new(stream)),
            None => Err(io::Error::new(io::ErrorKind::ConnectionRefused, "no streams left")),
        }
    }
}

pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<BotEvent>) -> Vec<BotEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
