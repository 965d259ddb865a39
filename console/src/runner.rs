//! Simulated pipelines as cancellable tokio tasks.
//!
//! DESIGN
//! ======
//! A run is a spawned task that sleeps through a stage list and pushes
//! reducer actions into a bounded `mpsc`. The caller owns the receiving end
//! through a [`RunHandle`] and folds actions into its panel state. Cancelling
//! (or dropping) the handle aborts the task and drops the receiver, so no
//! action from a cancelled run can reach state.
//!
//! SYSTEM CONTEXT
//! ==============
//! ```text
//! Intent::StartUnwrap ──► ConsoleState (Start reduced)
//!                           │
//!                           └─► PipelineRunner::start ──► task ──mpsc──► RunHandle
//!                                                                         │
//!                    ConsoleState::reduce(Intent::Workflow) ◄─────────────┘
//! ```

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;

use std::time::Duration;

use frames::StatusEvent;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::state::batch::{self, BatchAction};
use crate::state::workflow::{PanelKind, RunPhase, WorkflowAction, WorkflowState};

const ACTION_BUFFER: usize = 64;

/// Shortest period a ticker runs at. A zero period is raised to this.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Longest single delay a scaled timer will wait.
pub const MAX_SCALED_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Scale `base` by `scale`, bounded to `[0, MAX_SCALED_DELAY]`. Negative and
/// NaN scales give zero; overflowing products give the ceiling.
#[must_use]
pub fn scale_delay(base: Duration, scale: f64) -> Duration {
    if scale.is_nan() || scale <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(base.as_secs_f64() * scale).map_or(MAX_SCALED_DELAY, |d| d.min(MAX_SCALED_DELAY))
}

// =============================================================================
// HANDLE
// =============================================================================

/// Receiving end of a running task.
pub struct RunHandle<A> {
    task_id: Uuid,
    actions: mpsc::Receiver<A>,
    task: Option<JoinHandle<()>>,
}

impl<A> RunHandle<A> {
    /// Spawn `future` as a run whose output arrives on `actions`.
    pub fn spawn<F>(actions: mpsc::Receiver<A>, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self { task_id: Uuid::new_v4(), actions, task: Some(tokio::spawn(future)) }
    }

    #[must_use]
    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Next action, or `None` once the task has finished and drained.
    pub async fn next(&mut self) -> Option<A> {
        self.actions.recv().await
    }

    /// Abort the task and wait until it has stopped.
    pub async fn cancel(mut self) {
        self.actions.close();
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        tracing::info!(task_id = %self.task_id, "run cancelled");
    }
}

impl<A> Drop for RunHandle<A> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// STAGE PIPELINE
// =============================================================================

/// Spawns stage pipelines for the unwrap and analysis panels.
#[derive(Clone, Copy, Debug)]
pub struct PipelineRunner {
    time_scale: f64,
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

impl PipelineRunner {
    /// Multiply every stage delay by `scale` (clamped to be non-negative).
    #[must_use]
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale.max(0.0);
        self
    }

    fn tick_delay(&self, tick_ms: u64) -> Duration {
        scale_delay(Duration::from_millis(tick_ms), self.time_scale)
    }

    /// Start walking `panel`'s stages.
    #[must_use]
    pub fn start(&self, panel: PanelKind) -> RunHandle<WorkflowAction> {
        let (tx, rx) = mpsc::channel(ACTION_BUFFER);
        let runner = *self;
        let handle = RunHandle::spawn(rx, async move { runner.drive(panel, tx).await });
        tracing::info!(task_id = %handle.task_id, panel = ?panel, "pipeline started");
        handle
    }

    async fn drive(self, panel: PanelKind, tx: mpsc::Sender<WorkflowAction>) {
        for (index, spec) in panel.stages().iter().enumerate() {
            if tx.send(WorkflowAction::StageStarted(index)).await.is_err() {
                return;
            }
            tracing::debug!(stage = spec.id, "stage started");
            for tick in 1..=spec.ticks {
                tokio::time::sleep(self.tick_delay(spec.tick_ms)).await;
                let progress = f64::from(tick) * 100.0 / f64::from(spec.ticks);
                if tx.send(WorkflowAction::StageProgress { stage: index, progress }).await.is_err() {
                    return;
                }
            }
            if tx.send(WorkflowAction::StageCompleted(index)).await.is_err() {
                return;
            }
        }
        let _ = tx.send(WorkflowAction::Completed(panel.canned_result())).await;
    }
}

/// Feed a run's actions into `state` until a terminal action or the end of
/// the stream. `observe` sees every intermediate snapshot.
pub async fn fold_run(
    mut state: WorkflowState,
    handle: &mut RunHandle<WorkflowAction>,
    mut observe: impl FnMut(&WorkflowState),
) -> WorkflowState {
    while let Some(action) = handle.next().await {
        let terminal = action.is_terminal();
        state = state.reduce(action);
        observe(&state);
        if terminal {
            break;
        }
    }
    state
}

/// Describe a workflow snapshot as a status event for the link.
#[must_use]
pub fn snapshot_event(state: &WorkflowState, task_id: &str) -> StatusEvent {
    let module = state.panel.module();
    match &state.phase {
        RunPhase::Running { .. } => {
            StatusEvent::progress(module, task_id, state.overall_progress(), state.current_label.clone())
        }
        RunPhase::Completed => {
            let event = StatusEvent::result(module, task_id, state.current_label.clone());
            match state.result.as_ref().map(serde_json::to_value) {
                Some(Ok(details)) => event.with_detail("result", details),
                _ => event,
            }
        }
        RunPhase::Failed { kind, message } => {
            StatusEvent::error(module, task_id, message.clone()).with_detail("kind", kind.as_str())
        }
        RunPhase::Cancelled { at_stage } => {
            StatusEvent::log(module, task_id, "cancelled").with_detail("at_stage", *at_stage)
        }
        RunPhase::Idle => StatusEvent::log(module, task_id, "idle"),
    }
}

// =============================================================================
// BATCH TICKER
// =============================================================================

/// Spawn the batch progress ticker. Runs until cancelled. Periods below
/// [`MIN_TICK_PERIOD`] are raised to it.
#[must_use]
pub fn start_batch_ticker(period: Duration, seed: Option<u64>) -> RunHandle<BatchAction> {
    let period = period.max(MIN_TICK_PERIOD);
    let (tx, rx) = mpsc::channel(ACTION_BUFFER);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let handle = RunHandle::spawn(rx, async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.send(BatchAction::random_tick(&mut rng)).await.is_err() {
                return;
            }
        }
    });
    tracing::info!(task_id = %handle.task_id, period = ?period, "batch ticker started");
    handle
}

/// The batch ticker at its default 500 ms period.
#[must_use]
pub fn default_batch_ticker() -> RunHandle<BatchAction> {
    start_batch_ticker(Duration::from_millis(batch::TICK_MS), None)
}
