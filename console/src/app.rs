//! Whole-console state and the intent router.
//!
//! DESIGN
//! ======
//! [`ConsoleState`] composes the per-panel snapshots. [`ConsoleState::reduce`]
//! routes each [`Intent`] to the panel that owns it, then mirrors workflow
//! transitions into the status bar and the selected file's staging row. The
//! unwrap and analysis panels each keep their own staged list.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use frames::{ModuleTag, StatusEvent};

use crate::state::batch::{BatchAction, BatchState};
use crate::state::params::{AnalysisParams, BatchParams, UnwrapParams};
use crate::state::settings::{SettingsAction, SettingsState};
use crate::state::shell::{ShellAction, ShellState, TaskStatus};
use crate::state::staging::{FileStatus, StagingAction, StagingState};
use crate::state::workflow::{PanelKind, RunPhase, WorkflowAction, WorkflowState};

/// A staged workflow panel: its files, parameters, and run.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowPanel<P> {
    pub staging: StagingState,
    pub params: P,
    pub workflow: WorkflowState,
}

impl<P: Default> WorkflowPanel<P> {
    fn new(kind: PanelKind) -> Self {
        Self { staging: StagingState::default(), params: P::default(), workflow: WorkflowState::new(kind) }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchPanel {
    pub params: BatchParams,
    pub state: BatchState,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Shell(ShellAction),
    Settings(SettingsAction),
    Staging(PanelKind, StagingAction),
    SetUnwrapParams(UnwrapParams),
    SetAnalysisParams(AnalysisParams),
    SetBatchParams(BatchParams),
    /// Start a run over the panel's staged files.
    Start(PanelKind),
    /// Runner output for a panel.
    Workflow(PanelKind, WorkflowAction),
    Batch(BatchAction),
    LinkConnected(bool),
    LinkEvent(StatusEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleState {
    pub shell: ShellState,
    pub settings: SettingsState,
    pub unwrap: WorkflowPanel<UnwrapParams>,
    pub analysis: WorkflowPanel<AnalysisParams>,
    pub batch: BatchPanel,
    /// Most recent event from the status link.
    pub last_event: Option<StatusEvent>,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            shell: ShellState::default(),
            settings: SettingsState::default(),
            unwrap: WorkflowPanel::new(PanelKind::Unwrap),
            analysis: WorkflowPanel::new(PanelKind::Analysis),
            batch: BatchPanel::default(),
            last_event: None,
        }
    }
}

impl ConsoleState {
    #[must_use]
    pub fn workflow(&self, panel: PanelKind) -> &WorkflowState {
        match panel {
            PanelKind::Unwrap => &self.unwrap.workflow,
            PanelKind::Analysis => &self.analysis.workflow,
        }
    }

    #[must_use]
    pub fn staging(&self, panel: PanelKind) -> &StagingState {
        match panel {
            PanelKind::Unwrap => &self.unwrap.staging,
            PanelKind::Analysis => &self.analysis.staging,
        }
    }

    #[must_use]
    pub fn reduce(mut self, intent: Intent) -> Self {
        match intent {
            Intent::Shell(action) => self.shell = self.shell.reduce(action),
            Intent::Settings(action) => self.settings = self.settings.reduce(action),
            Intent::Staging(panel, action) => self.update_staging(panel, |s| s.reduce(action)),
            Intent::SetUnwrapParams(params) => self.unwrap.params = params,
            Intent::SetAnalysisParams(params) => self.analysis.params = params,
            Intent::SetBatchParams(params) => self.batch.params = params,
            Intent::Start(panel) => {
                let staged_files = self.staging(panel).len();
                self = self.reduce_workflow(panel, WorkflowAction::Start { staged_files });
            }
            Intent::Workflow(panel, action) => self = self.reduce_workflow(panel, action),
            Intent::Batch(action) => self = self.reduce_batch(action),
            Intent::LinkConnected(connected) => {
                self.shell = self.shell.reduce(ShellAction::BackendConnected(connected));
            }
            Intent::LinkEvent(event) => self.last_event = Some(event),
        }
        self
    }

    fn update_staging(&mut self, panel: PanelKind, f: impl FnOnce(StagingState) -> StagingState) {
        let slot = match panel {
            PanelKind::Unwrap => &mut self.unwrap.staging,
            PanelKind::Analysis => &mut self.analysis.staging,
        };
        *slot = f(std::mem::take(slot));
    }

    fn reduce_workflow(mut self, panel: PanelKind, action: WorkflowAction) -> Self {
        let before = self.workflow(panel).clone();
        let after = before.clone().reduce(action);
        if after == before {
            return self;
        }

        let selected = self.staging(panel).selected().map(|f| f.name.clone());
        if let Some(name) = selected.clone() {
            let update = file_update(&after, name);
            self.update_staging(panel, |s| s.reduce(update));
        }

        if after.phase != before.phase || after.current_label != before.current_label {
            self.shell = self.shell.reduce(status_for(&after, selected));
        }

        match panel {
            PanelKind::Unwrap => self.unwrap.workflow = after,
            PanelKind::Analysis => self.analysis.workflow = after,
        }
        self
    }

    fn reduce_batch(mut self, action: BatchAction) -> Self {
        let was_running = self.batch.state.running;
        self.batch.state = self.batch.state.reduce(action);
        let running = self.batch.state.running;

        if running != was_running {
            let task = if running {
                ShellAction::SetTask {
                    status: TaskStatus::Processing,
                    task: Some(format!("{}: {}", ModuleTag::Batch.label(), self.batch.state.current_file)),
                    message: self.batch.state.folder.clone(),
                }
            } else {
                ShellAction::SetTask { status: TaskStatus::Idle, task: Some("Batch paused".into()), message: None }
            };
            self.shell = self.shell.reduce(task);
        }
        self
    }
}

/// Staging row update mirroring the run phase of the selected file.
fn file_update(state: &WorkflowState, name: String) -> StagingAction {
    let (status, progress, error) = match &state.phase {
        RunPhase::Running { .. } => (FileStatus::Processing, Some(state.overall_progress()), None),
        RunPhase::Completed => (FileStatus::Completed, Some(100.0), None),
        RunPhase::Failed { message, .. } => (FileStatus::Error, None, Some(message.clone())),
        RunPhase::Cancelled { .. } | RunPhase::Idle => (FileStatus::Pending, Some(0.0), None),
    };
    StagingAction::UpdateStatus { name, status, progress, error }
}

fn status_for(state: &WorkflowState, file: Option<String>) -> ShellAction {
    let label = (!state.current_label.is_empty()).then(|| state.current_label.clone());
    match &state.phase {
        RunPhase::Idle => ShellAction::SetTask { status: TaskStatus::Idle, task: None, message: None },
        RunPhase::Running { .. } => ShellAction::SetTask { status: TaskStatus::Processing, task: label, message: file },
        RunPhase::Completed => ShellAction::SetTask { status: TaskStatus::Completed, task: label, message: file },
        RunPhase::Failed { kind, message } => ShellAction::SetTask {
            status: TaskStatus::Error,
            task: Some(message.clone()),
            message: Some(kind.as_str().to_string()),
        },
        RunPhase::Cancelled { .. } => {
            ShellAction::SetTask { status: TaskStatus::Idle, task: Some("Cancelled".into()), message: file }
        }
    }
}
