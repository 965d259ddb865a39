//! Feed service: paced synthetic status events for every connected client.
//!
//! DESIGN
//! ======
//! A background task wakes every `status_interval` (first tick one interval
//! after start, matching the console's mock channel), draws the next event
//! from a [`SyntheticFeed`] and broadcasts it. Ticks with no clients connected
//! still advance the feed so every client sees fresh values.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use console::net::SyntheticFeed;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::AppState;

/// Spawn the background feed task. Returns a handle for shutdown.
pub fn spawn_feed_task(state: AppState) -> JoinHandle<()> {
    spawn_seeded_feed_task(state, None)
}

/// Like [`spawn_feed_task`], with a fixed seed when one is given.
pub fn spawn_seeded_feed_task(state: AppState, seed: Option<u64>) -> JoinHandle<()> {
    let period = state.config.status_interval;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut feed = SyntheticFeed::new(rng).with_task_id(state.config.task_id.clone());

    info!(interval = ?period, task_id = %state.config.task_id, "feed task configured");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(event) = feed.next() else { break };
            let delivered = state.broadcast(&event).await;
            debug!(delivered, progress = event.data.progress, "feed: event broadcast");
        }
    })
}
