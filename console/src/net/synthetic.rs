//! Lazy, infinite source of synthetic progress events.

use frames::{ModuleTag, StatusEvent};
use rand::Rng;

pub const DEMO_TASK_ID: &str = "demo-task";
pub const DEMO_MESSAGE: &str = "Processing...";

/// Yields `progress` events with a uniform random percentage in `[0, 100)`.
///
/// The iterator never ends. Restarting the sequence means building a new
/// feed; there is no hidden position to rewind.
#[derive(Debug)]
pub struct SyntheticFeed<R> {
    rng: R,
    module: ModuleTag,
    task_id: String,
}

impl<R: Rng> SyntheticFeed<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, module: ModuleTag::Unwrap, task_id: DEMO_TASK_ID.to_string() }
    }

    #[must_use]
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = task_id.into();
        self
    }

    #[must_use]
    pub fn with_module(mut self, module: ModuleTag) -> Self {
        self.module = module;
        self
    }
}

impl<R: Rng> Iterator for SyntheticFeed<R> {
    type Item = StatusEvent;

    fn next(&mut self) -> Option<StatusEvent> {
        let progress = self.rng.random_range(0.0..100.0);
        Some(StatusEvent::progress(self.module, self.task_id.clone(), progress, DEMO_MESSAGE))
    }
}

#[cfg(test)]
#[path = "synthetic_test.rs"]
mod synthetic_test;
