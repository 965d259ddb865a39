//! The status channel trait and the watch slots its implementations share.

use async_trait::async_trait;
use frames::{CodecError, StatusEvent};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid status URL: {0}")]
    InvalidUrl(String),
    #[error("websocket transport failed: {0}")]
    Transport(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("status frame decode failed: {0}")]
    Codec(#[from] CodecError),
}

impl From<tokio_tungstenite::tungstenite::Error> for ChannelError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// A duplex link that reports connectivity and the most recent event.
#[async_trait]
pub trait StatusChannel: Send + Sync {
    /// Activate the channel. Calling it on an active channel is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::InvalidUrl`] when the channel cannot target its
    /// configured endpoint.
    async fn connect(&mut self) -> Result<(), ChannelError>;

    /// Queue an arbitrary JSON payload for the backend. Never fails; returns
    /// whether the payload was accepted.
    fn send(&self, payload: &Value) -> bool;

    /// Receiver of the last event slot. Holds `None` until the first event.
    fn subscribe(&self) -> watch::Receiver<Option<StatusEvent>>;

    /// Receiver of the connectivity flag.
    fn connection(&self) -> watch::Receiver<bool>;

    /// Tear down the channel. No event is published after this returns.
    async fn close(&mut self);

    fn is_connected(&self) -> bool;

    fn last_event(&self) -> Option<StatusEvent> {
        self.subscribe().borrow().clone()
    }
}

// =============================================================================
// SHARED SLOTS
// =============================================================================

/// Connectivity flag and last-event slot, written by one background task.
#[derive(Clone, Debug)]
pub(crate) struct Slots {
    pub connected: watch::Sender<bool>,
    pub last_event: watch::Sender<Option<StatusEvent>>,
}

impl Slots {
    pub fn new() -> Self {
        let (connected, _) = watch::channel(false);
        let (last_event, _) = watch::channel(None);
        Self { connected, last_event }
    }

    pub fn publish(&self, event: StatusEvent) {
        self.last_event.send_replace(Some(event));
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.send_replace(connected);
    }
}

/// Abort a background task and wait until it has stopped.
pub(crate) async fn stop_task(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        task.abort();
        let _ = task.await;
    }
}
