//! Timer-driven stand-in for the backend status link.
//!
//! `connect` flips the flag on at once and spawns a ticker that publishes the
//! next [`SyntheticFeed`] event every period, the first one a full period
//! after activation. `close` aborts the ticker and waits for it, so nothing
//! lands in the slot afterwards.

#[cfg(test)]
#[path = "mock_test.rs"]
mod mock_test;

use std::time::Duration;

use async_trait::async_trait;
use frames::StatusEvent;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::runner::MIN_TICK_PERIOD;

use super::channel::{ChannelError, Slots, StatusChannel, stop_task};
use super::synthetic::{DEMO_TASK_ID, SyntheticFeed};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);

pub struct MockStatusChannel {
    interval: Duration,
    task_id: String,
    seed: Option<u64>,
    slots: Slots,
    task: Option<JoinHandle<()>>,
}

impl Default for MockStatusChannel {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl MockStatusChannel {
    /// Intervals below [`MIN_TICK_PERIOD`] are raised to it.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let interval = interval.max(MIN_TICK_PERIOD);
        Self { interval, task_id: DEMO_TASK_ID.to_string(), seed: None, slots: Slots::new(), task: None }
    }

    #[must_use]
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = task_id.into();
        self
    }

    /// Fix the feed's random seed. Each `connect` restarts from this seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn feed(&self) -> SyntheticFeed<StdRng> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        SyntheticFeed::new(rng).with_task_id(self.task_id.clone())
    }
}

#[async_trait]
impl StatusChannel for MockStatusChannel {
    async fn connect(&mut self) -> Result<(), ChannelError> {
        if self.task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Ok(());
        }

        self.slots.set_connected(true);
        tracing::info!(interval = ?self.interval, "mock status channel connected");

        let slots = self.slots.clone();
        let period = self.interval;
        let mut feed = self.feed();
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(event) = feed.next() else { break };
                tracing::debug!(progress = event.data.progress, "mock status event");
                slots.publish(event);
            }
        }));
        Ok(())
    }

    fn send(&self, payload: &Value) -> bool {
        tracing::info!(%payload, "mock status channel send");
        true
    }

    fn subscribe(&self) -> watch::Receiver<Option<StatusEvent>> {
        self.slots.last_event.subscribe()
    }

    fn connection(&self) -> watch::Receiver<bool> {
        self.slots.connected.subscribe()
    }

    async fn close(&mut self) {
        stop_task(self.task.take()).await;
        self.slots.set_connected(false);
        tracing::info!("mock status channel closed");
    }

    fn is_connected(&self) -> bool {
        *self.slots.connected.borrow()
    }
}

impl Drop for MockStatusChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
