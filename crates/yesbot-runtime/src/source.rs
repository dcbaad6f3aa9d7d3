//! Event sources.
//!
//! The runtime pulls [`RawEvent`]s from an [`EventSource`]. The platform
//! client itself lives outside this workspace; it feeds the runtime through
//! one of the sources shipped here:
//!
//! - [`ChannelSource`]: an in-process tokio channel. The client keeps the
//!   paired [`EventSender`] and pushes events as they arrive.
//! - [`ReplaySource`]: newline-delimited JSON, one [`RawEvent`] per line.
//!   Useful for replaying recorded traffic and for tests.
//!
//! ```rust,ignore
//! let (sender, source) = ChannelSource::new(256);
//! tokio::spawn(async move { client.forward_events(sender).await });
//! runtime.run(source).await?;
//! ```

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use yesbot_core::RawEvent;

use crate::error::{RuntimeError, RuntimeResult};

/// A stream of raw platform events.
#[async_trait]
pub trait EventSource: Send {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Waits for the next event. `Ok(None)` means the source is exhausted.
    ///
    /// Must be cancel-safe: the runtime polls it inside `select!`.
    async fn next_event(&mut self) -> RuntimeResult<Option<RawEvent>>;
}

// =============================================================================
// ChannelSource
// =============================================================================

/// Sending half of a [`ChannelSource`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<RawEvent>,
}

impl EventSender {
    /// Sends an event, waiting for buffer space.
    pub async fn send(&self, event: impl Into<RawEvent>) -> RuntimeResult<()> {
        self.tx
            .send(event.into())
            .await
            .map_err(|_| RuntimeError::SourceClosed)
    }

    /// Sends an event without waiting. Fails when the buffer is full or the
    /// runtime is gone.
    pub fn try_send(&self, event: impl Into<RawEvent>) -> RuntimeResult<()> {
        self.tx.try_send(event.into()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(event) => {
                warn!(event = event.name(), "Event buffer full, dropping event");
                RuntimeError::BufferFull
            }
            mpsc::error::TrySendError::Closed(_) => RuntimeError::SourceClosed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// An in-process event channel.
///
/// The source ends once every [`EventSender`] has been dropped.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<RawEvent>,
}

impl ChannelSource {
    /// Creates a bounded channel with room for `buffer` pending events.
    pub fn new(buffer: usize) -> (EventSender, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (EventSender { tx }, Self { rx })
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    fn name(&self) -> &str {
        "channel"
    }

    async fn next_event(&mut self) -> RuntimeResult<Option<RawEvent>> {
        Ok(self.rx.recv().await)
    }
}

// =============================================================================
// ReplaySource
// =============================================================================

/// Reads JSON-lines encoded events from any async reader.
///
/// Blank lines are skipped. Lines that fail to decode are logged and
/// skipped; I/O errors end the run.
pub struct ReplaySource<R> {
    lines: Lines<R>,
    line_no: usize,
    skipped: usize,
}

impl<R: AsyncBufRead + Unpin + Send> ReplaySource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl ReplaySource<BufReader<File>> {
    /// Opens a recording on disk.
    pub async fn open(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let file = File::open(path.as_ref()).await?;
        debug!(path = %path.as_ref().display(), "Opened replay file");
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for ReplaySource<R> {
    fn name(&self) -> &str {
        "replay"
    }

    async fn next_event(&mut self) -> RuntimeResult<Option<RawEvent>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawEvent>(line) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_no, error = %e, "Skipping malformed event");
                }
            }
        }
        Ok(None)
    }
}
