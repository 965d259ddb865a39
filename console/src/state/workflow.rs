//! Staged workflow panels: single-file unwrap and deep analysis.
//!
//! DESIGN
//! ======
//! Both panels share one state machine:
//!
//! ```text
//! Idle ── Start ──► Running{0} ──► Running{1} ──► … ──► Completed
//!                      │                                  │
//!                      ├── Failed{kind, message}          │
//!                      └── Cancelled{at_stage}            │
//!   ◄──────────────────────── Clear ◄─────────────────────┘
//! ```
//!
//! The reducer never sleeps. A runner (see `crate::runner`) walks the stage
//! list on a timer and feeds `StageStarted` / `StageProgress` /
//! `StageCompleted` / `Completed` actions back in. Actions that arrive out of
//! order or outside a run are ignored, which keeps overall progress
//! non-decreasing even if a stale runner leaks a late action.

#[cfg(test)]
#[path = "workflow_test.rs"]
mod workflow_test;

use frames::ModuleTag;
use serde::{Deserialize, Serialize};

use super::staging::Point3;

// =============================================================================
// STAGES
// =============================================================================

/// Static description of one pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageSpec {
    pub id: &'static str,
    pub label: &'static str,
    /// Number of progress ticks the stage takes.
    pub ticks: u32,
    /// Delay before each tick, in milliseconds.
    pub tick_ms: u64,
}

const fn stage(id: &'static str, label: &'static str, ticks: u32, tick_ms: u64) -> StageSpec {
    StageSpec { id, label, ticks, tick_ms }
}

pub const UNWRAP_STAGES: [StageSpec; 7] = [
    stage("load", "Loading data", 1, 1000),
    stage("sample", "Sampling points", 1, 1000),
    stage("fit-cylinder", "Fitting cylinder", 1, 1000),
    stage("detect-floor", "Detecting floor", 1, 1000),
    stage("transform", "Transforming coordinates", 1, 1000),
    stage("filter-outliers", "Filtering outliers", 1, 1000),
    stage("render-image", "Rendering image", 1, 1000),
];

pub const ANALYSIS_STAGES: [StageSpec; 3] = [
    stage("preprocessing", "Preprocessing", 10, 200),
    stage("feature-extraction", "Feature extraction", 10, 200),
    stage("region-segmentation", "Region segmentation", 10, 200),
];

/// Which staged workflow a panel runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Unwrap,
    Analysis,
}

impl PanelKind {
    #[must_use]
    pub fn stages(self) -> &'static [StageSpec] {
        match self {
            Self::Unwrap => &UNWRAP_STAGES,
            Self::Analysis => &ANALYSIS_STAGES,
        }
    }

    #[must_use]
    pub fn module(self) -> ModuleTag {
        match self {
            Self::Unwrap => ModuleTag::Unwrap,
            Self::Analysis => ModuleTag::Analysis,
        }
    }

    /// Label shown once the last stage has finished.
    #[must_use]
    pub fn done_label(self) -> &'static str {
        match self {
            Self::Unwrap => "Processing complete",
            Self::Analysis => "Analysis complete",
        }
    }

    /// The simulated result published at the end of a run.
    #[must_use]
    pub fn canned_result(self) -> PanelResult {
        match self {
            Self::Unwrap => PanelResult::Unwrap(UnwrapResult::canned()),
            Self::Analysis => PanelResult::Analysis(AnalysisResult::canned()),
        }
    }
}

/// Live progress of one stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageState {
    pub id: &'static str,
    pub label: &'static str,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
    pub complete: bool,
}

impl From<&StageSpec> for StageState {
    fn from(spec: &StageSpec) -> Self {
        Self { id: spec.id, label: spec.label, progress: 0.0, complete: false }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CylinderFit {
    pub center: Point3,
    /// Meters.
    pub radius: f64,
    pub fitting_error: f64,
    /// Fraction in `[0, 1]`.
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnwrapResult {
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub processing_time_secs: f64,
    pub cylinder: CylinderFit,
}

pub const UNWRAP_IMAGE_URL: &str = "https://images.pexels.com/photos/1181467/pexels-photo-1181467.jpeg";

impl UnwrapResult {
    #[must_use]
    pub fn canned() -> Self {
        Self {
            image_url: UNWRAP_IMAGE_URL.to_string(),
            width: 1520,
            height: 850,
            processing_time_secs: 7.2,
            cylinder: CylinderFit {
                center: Point3 { x: 125.34, y: 456.78, z: 12.45 },
                radius: 3.25,
                fitting_error: 0.035,
                confidence: 0.87,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub structure_surfaces: u32,
    pub anomalous_regions: u32,
    pub processing_time_secs: f64,
    pub report_generated: bool,
}

impl AnalysisResult {
    #[must_use]
    pub fn canned() -> Self {
        Self { structure_surfaces: 12, anomalous_regions: 3, processing_time_secs: 45.6, report_generated: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "panel", rename_all = "lowercase")]
pub enum PanelResult {
    Unwrap(UnwrapResult),
    Analysis(AnalysisResult),
}

impl PanelResult {
    #[must_use]
    pub fn processing_time_secs(&self) -> f64 {
        match self {
            Self::Unwrap(r) => r.processing_time_secs,
            Self::Analysis(r) => r.processing_time_secs,
        }
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Failure classes a run can end with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad input (unsupported file, parameters rejected by the backend).
    Validation,
    /// The backend could not read or write scan data.
    Io,
    /// Out of memory or worker slots.
    ResourceExhausted,
    /// The status link dropped mid-run.
    Transport,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Io => "io",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Transport => "transport",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RunPhase {
    #[default]
    Idle,
    Running {
        stage: usize,
    },
    Completed,
    Failed {
        kind: FailureKind,
        message: String,
    },
    Cancelled {
        at_stage: usize,
    },
}

/// Which visualization the unwrap panel shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultView {
    #[default]
    Original,
    Cylinder,
    Unwrapped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WorkflowAction {
    /// Begin a run over the given number of staged files.
    Start { staged_files: usize },
    StageStarted(usize),
    StageProgress { stage: usize, progress: f64 },
    StageCompleted(usize),
    Completed(PanelResult),
    Failed { kind: FailureKind, message: String },
    Cancelled,
    Clear,
    SelectView(ResultView),
}

impl WorkflowAction {
    /// Actions after which the panel no longer runs.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed { .. } | Self::Cancelled)
    }
}

/// One panel's run snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowState {
    pub panel: PanelKind,
    pub phase: RunPhase,
    pub stages: Vec<StageState>,
    /// Label of the stage in progress; empty before a run.
    pub current_label: String,
    pub result: Option<PanelResult>,
    pub view: ResultView,
}

impl WorkflowState {
    #[must_use]
    pub fn new(panel: PanelKind) -> Self {
        Self {
            panel,
            phase: RunPhase::Idle,
            stages: panel.stages().iter().map(StageState::from).collect(),
            current_label: String::new(),
            result: None,
            view: ResultView::Original,
        }
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        matches!(self.phase, RunPhase::Running { .. })
    }

    /// Whether a start request would be accepted.
    #[must_use]
    pub fn can_start(&self, staged_files: usize) -> bool {
        staged_files > 0 && !self.is_processing()
    }

    /// Arithmetic mean of per-stage progress.
    #[must_use]
    pub fn overall_progress(&self) -> f64 {
        if self.stages.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.stages.len() as f64;
        self.stages.iter().map(|s| s.progress).sum::<f64>() / count
    }

    #[must_use]
    pub fn current_stage(&self) -> Option<usize> {
        match self.phase {
            RunPhase::Running { stage } => Some(stage),
            _ => None,
        }
    }

    #[must_use]
    pub fn reduce(mut self, action: WorkflowAction) -> Self {
        match action {
            WorkflowAction::Start { staged_files } => {
                if !self.can_start(staged_files) {
                    return self;
                }
                self = Self::new(self.panel);
                self.phase = RunPhase::Running { stage: 0 };
                if let Some(first) = self.stages.first() {
                    self.current_label = first.label.to_string();
                }
            }
            WorkflowAction::StageStarted(index) => {
                let Some(current) = self.current_stage() else { return self };
                if index < current || index >= self.stages.len() {
                    return self;
                }
                for earlier in &mut self.stages[..index] {
                    earlier.progress = 100.0;
                    earlier.complete = true;
                }
                self.phase = RunPhase::Running { stage: index };
                self.current_label = self.stages[index].label.to_string();
            }
            WorkflowAction::StageProgress { stage, progress } => {
                if self.current_stage() != Some(stage) {
                    return self;
                }
                let entry = &mut self.stages[stage];
                entry.progress = entry.progress.max(progress.clamp(0.0, 100.0));
            }
            WorkflowAction::StageCompleted(index) => {
                if self.current_stage() != Some(index) {
                    return self;
                }
                let entry = &mut self.stages[index];
                entry.progress = 100.0;
                entry.complete = true;
            }
            WorkflowAction::Completed(result) => {
                if !self.is_processing() {
                    return self;
                }
                for stage in &mut self.stages {
                    stage.progress = 100.0;
                    stage.complete = true;
                }
                self.phase = RunPhase::Completed;
                self.current_label = self.panel.done_label().to_string();
                self.result = Some(result);
                if self.panel == PanelKind::Unwrap {
                    self.view = ResultView::Unwrapped;
                }
            }
            WorkflowAction::Failed { kind, message } => {
                if !self.is_processing() {
                    return self;
                }
                self.current_label.clone_from(&message);
                self.phase = RunPhase::Failed { kind, message };
            }
            WorkflowAction::Cancelled => {
                if let Some(at_stage) = self.current_stage() {
                    self.phase = RunPhase::Cancelled { at_stage };
                }
            }
            WorkflowAction::Clear => {
                if !self.is_processing() {
                    self = Self::new(self.panel);
                }
            }
            WorkflowAction::SelectView(view) => self.view = view,
        }
        self
    }
}
