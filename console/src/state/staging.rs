//! Upload staging: validated LAS/LAZ files with synthesized metadata.
//!
//! DESIGN
//! ======
//! The staged list is an immutable snapshot advanced by
//! [`StagingState::reduce`]. Randomness stays outside the reducer:
//! [`synthesize`] draws the point count and bounds before the `Add` action is
//! built, so reducing the same action twice yields the same state.
//!
//! File contents are never read. A candidate is only a name and a byte size.

#[cfg(test)]
#[path = "staging_test.rs"]
mod staging_test;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Accepted file name suffixes, compared against the lowercased name.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".las", ".laz"];

/// Inclusive lower bound of the synthetic point count.
pub const POINT_COUNT_MIN: u64 = 1_000_000;

/// Exclusive upper bound of the synthetic point count.
pub const POINT_COUNT_MAX: u64 = 11_000_000;

/// A file offered by a picker or a drop, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self { name: name.into(), size }
    }
}

/// A corner in scan coordinates (meters).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Axis-aligned bounding box of a scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point3,
    pub max: Point3,
}

impl Bounds {
    /// Per-axis extent (`max - min`).
    #[must_use]
    pub fn extent(&self) -> Point3 {
        Point3 { x: self.max.x - self.min.x, y: self.max.y - self.min.y, z: self.max.z - self.min.z }
    }
}

/// Processing status of a staged file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl FileStatus {
    /// Badge label shown next to a file row.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Waiting",
            Self::Processing => "Processing",
            Self::Completed => "Done",
            Self::Error => "Error",
        }
    }
}

/// A file accepted into the working set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StagedFile {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub point_count: u64,
    pub bounds: Bounds,
    pub status: FileStatus,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
    pub error: Option<String>,
}

/// Whether a file name carries a LAS/LAZ extension (case-insensitive).
#[must_use]
pub fn is_point_cloud_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Build a staged record with synthetic point count and bounds.
pub fn synthesize(candidate: CandidateFile, rng: &mut impl Rng) -> StagedFile {
    let point_count = rng.random_range(POINT_COUNT_MIN..POINT_COUNT_MAX);
    let min = Point3 { x: rng.random_range(0.0..100.0), y: rng.random_range(0.0..100.0), z: 0.0 };
    let max = Point3 {
        x: rng.random_range(100.0..200.0),
        y: rng.random_range(100.0..200.0),
        z: rng.random_range(10.0..60.0),
    };

    StagedFile {
        name: candidate.name,
        size: candidate.size,
        point_count,
        bounds: Bounds { min, max },
        status: FileStatus::Pending,
        progress: 0.0,
        error: None,
    }
}

/// Validate candidates and synthesize records for the accepted ones.
///
/// Rejected names are dropped silently. Accepted files keep their order.
pub fn stage_candidates(candidates: impl IntoIterator<Item = CandidateFile>, rng: &mut impl Rng) -> Vec<StagedFile> {
    candidates
        .into_iter()
        .filter(|c| is_point_cloud_name(&c.name))
        .map(|c| synthesize(c, rng))
        .collect()
}

// =============================================================================
// REDUCER
// =============================================================================

/// Transitions of the staged list and the drag indicator.
#[derive(Clone, Debug, PartialEq)]
pub enum StagingAction {
    /// Append already-synthesized records.
    Add(Vec<StagedFile>),
    /// Remove every record with this name.
    Remove(String),
    /// Replace status and error in place; progress only when given.
    UpdateStatus { name: String, status: FileStatus, progress: Option<f64>, error: Option<String> },
    DragOver,
    DragLeave,
    /// End of a drag: clear the indicator and append the dropped records.
    Drop(Vec<StagedFile>),
}

/// Ordered staged files plus the "is dragging" indicator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StagingState {
    pub files: Vec<StagedFile>,
    pub dragging: bool,
}

impl StagingState {
    #[must_use]
    pub fn reduce(mut self, action: StagingAction) -> Self {
        match action {
            StagingAction::Add(files) => self.append(files),
            StagingAction::Remove(name) => self.files.retain(|f| f.name != name),
            StagingAction::UpdateStatus { name, status, progress, error } => {
                for file in self.files.iter_mut().filter(|f| f.name == name) {
                    file.status = status;
                    if let Some(p) = progress {
                        file.progress = p.clamp(0.0, 100.0);
                    }
                    file.error.clone_from(&error);
                }
            }
            StagingAction::DragOver => self.dragging = true,
            StagingAction::DragLeave => self.dragging = false,
            StagingAction::Drop(files) => {
                self.dragging = false;
                self.append(files);
            }
        }
        self
    }

    /// Records that bypassed [`stage_candidates`] are still held to the
    /// extension rule.
    fn append(&mut self, files: Vec<StagedFile>) {
        self.files
            .extend(files.into_iter().filter(|f| is_point_cloud_name(&f.name)));
    }

    /// The file a single-file panel operates on.
    #[must_use]
    pub fn selected(&self) -> Option<&StagedFile> {
        self.files.first()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }
}

// =============================================================================
// EVENT HANDLERS
// =============================================================================

/// A platform drag/drop event as seen by the staging handlers.
pub trait DropEvent {
    /// Suppress the platform's default file-open navigation.
    fn prevent_default(&mut self);

    /// Files carried by the event (empty for drag-over / drag-leave).
    fn files(&self) -> Vec<CandidateFile>;
}

/// Validate and append picker-selected files.
#[must_use]
pub fn add_files(state: StagingState, candidates: Vec<CandidateFile>, rng: &mut impl Rng) -> StagingState {
    let staged = stage_candidates(candidates, rng);
    state.reduce(StagingAction::Add(staged))
}

#[must_use]
pub fn handle_drag_over(state: StagingState, event: &mut impl DropEvent) -> StagingState {
    event.prevent_default();
    state.reduce(StagingAction::DragOver)
}

#[must_use]
pub fn handle_drag_leave(state: StagingState, event: &mut impl DropEvent) -> StagingState {
    event.prevent_default();
    state.reduce(StagingAction::DragLeave)
}

#[must_use]
pub fn handle_drop(state: StagingState, event: &mut impl DropEvent, rng: &mut impl Rng) -> StagingState {
    event.prevent_default();
    let staged = stage_candidates(event.files(), rng);
    state.reduce(StagingAction::Drop(staged))
}
