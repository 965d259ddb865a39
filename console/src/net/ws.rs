//! WebSocket client for the backend status link.
//!
//! DESIGN
//! ======
//! `connect` spawns one task that owns the socket. The task dials the URL,
//! pumps inbound frames into the last-event slot, and forwards queued `send`
//! payloads as JSON text. When the socket drops it clears the connectivity
//! flag and redials after an exponential backoff (1s doubling to 10s, reset
//! after a successful dial). Frames that fail to decode are logged and
//! skipped; they never tear the link down.
//!
//! Outbound payloads wait in a bounded queue while the link is down. A
//! payload whose write fails is held and sent first on the next link.

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use std::time::Duration;

use async_trait::async_trait;
use frames::StatusEvent;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::channel::{ChannelError, Slots, StatusChannel, stop_task};

pub const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);
pub const MAX_BACKOFF: Duration = Duration::from_millis(10_000);

/// Outbound payloads queued ahead of the socket. `send` refuses beyond this.
pub const OUTBOUND_BUFFER: usize = 64;

/// Doubling reconnect delay with a ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    current: Duration,
    initial: Duration,
    max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_BACKOFF, MAX_BACKOFF)
    }
}

impl Backoff {
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { current: initial, initial, max }
    }

    /// Delay to wait now; the following call returns double, up to the max.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Decode one inbound frame.
///
/// Returns `None` for frames that carry no event (ping, pong, close).
#[must_use]
pub fn decode_frame(message: &Message) -> Option<Result<StatusEvent, ChannelError>> {
    match message {
        Message::Text(text) => Some(frames::decode_json(text.as_str()).map_err(ChannelError::from)),
        Message::Binary(bytes) => Some(frames::decode_event(bytes).map_err(ChannelError::from)),
        _ => None,
    }
}

fn validate_url(url: &str) -> Result<(), ChannelError> {
    let valid = url
        .split_once("://")
        .is_some_and(|(scheme, rest)| matches!(scheme, "ws" | "wss") && !rest.is_empty());
    if valid { Ok(()) } else { Err(ChannelError::InvalidUrl(url.to_string())) }
}

pub struct WsStatusChannel {
    url: String,
    backoff: Backoff,
    slots: Slots,
    outbound: Option<mpsc::Sender<String>>,
    task: Option<JoinHandle<()>>,
}

impl WsStatusChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), backoff: Backoff::default(), slots: Slots::new(), outbound: None, task: None }
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatusChannel for WsStatusChannel {
    async fn connect(&mut self) -> Result<(), ChannelError> {
        if self.task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Ok(());
        }
        validate_url(&self.url)?;

        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        self.outbound = Some(tx);
        self.task = Some(tokio::spawn(run_link(self.url.clone(), self.backoff, self.slots.clone(), rx)));
        Ok(())
    }

    fn send(&self, payload: &Value) -> bool {
        let Some(tx) = &self.outbound else {
            tracing::debug!(%payload, "status link not started; dropping payload");
            return false;
        };
        match tx.try_send(payload.to_string()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(url = %self.url, "status link outbound queue full; dropping payload");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<StatusEvent>> {
        self.slots.last_event.subscribe()
    }

    fn connection(&self) -> watch::Receiver<bool> {
        self.slots.connected.subscribe()
    }

    async fn close(&mut self) {
        self.outbound = None;
        stop_task(self.task.take()).await;
        self.slots.set_connected(false);
        tracing::info!(url = %self.url, "status link closed");
    }

    fn is_connected(&self) -> bool {
        *self.slots.connected.borrow()
    }
}

impl Drop for WsStatusChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// LINK TASK
// =============================================================================

enum PumpEnd {
    /// Peer closed or the socket failed; redial.
    Disconnected,
    /// The owning channel dropped its sender; stop for good.
    Shutdown,
}

async fn run_link(url: String, mut backoff: Backoff, slots: Slots, mut outbound: mpsc::Receiver<String>) {
    let mut pending = None;
    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                backoff.reset();
                slots.set_connected(true);
                tracing::info!(%url, "status link connected");

                let end = pump(stream, &slots, &mut outbound, &mut pending).await;
                slots.set_connected(false);
                match end {
                    Ok(PumpEnd::Shutdown) => return,
                    Ok(PumpEnd::Disconnected) => tracing::info!(%url, "status link disconnected"),
                    Err(e) => tracing::warn!(%url, error = %e, "status link error"),
                }
            }
            Err(e) => tracing::warn!(%url, error = %e, "status link connect failed"),
        }

        let delay = backoff.next_delay();
        tracing::debug!(?delay, "status link reconnect scheduled");
        tokio::time::sleep(delay).await;
    }
}

async fn pump<S>(
    stream: S,
    slots: &Slots,
    outbound: &mut mpsc::Receiver<String>,
    pending: &mut Option<String>,
) -> Result<PumpEnd, ChannelError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut write, mut read) = stream.split();
    if let Some(text) = pending.take() {
        send_or_keep(&mut write, pending, text).await?;
    }

    loop {
        tokio::select! {
            inbound = read.next() => {
                let Some(inbound) = inbound else { return Ok(PumpEnd::Disconnected) };
                let message = inbound?;
                if matches!(message, Message::Close(_)) {
                    return Ok(PumpEnd::Disconnected);
                }
                match decode_frame(&message) {
                    Some(Ok(event)) => {
                        tracing::debug!(kind = event.kind.as_str(), task_id = event.task_id(), "status event");
                        slots.publish(event);
                    }
                    Some(Err(e)) => tracing::warn!(error = %e, "skipping undecodable status frame"),
                    None => {}
                }
            }
            queued = outbound.recv() => {
                let Some(text) = queued else {
                    let _ = write.close().await;
                    return Ok(PumpEnd::Shutdown);
                };
                send_or_keep(&mut write, pending, text).await?;
            }
        }
    }
}

/// Write one payload. On failure the payload is parked in `pending` so the
/// next link sends it before anything else.
async fn send_or_keep<W>(write: &mut W, pending: &mut Option<String>, text: String) -> Result<(), ChannelError>
where
    W: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    if let Err(e) = write.send(Message::Text(text.clone().into())).await {
        *pending = Some(text);
        return Err(e.into());
    }
    Ok(())
}
