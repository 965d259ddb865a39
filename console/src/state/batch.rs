//! Folder-level batch panel.
//!
//! The file table is seeded with eight demo rows. Processing is a ticker that
//! nudges the current-file and overall progress upward; no row ever changes
//! status on its own.

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::staging::FileStatus;
use super::workflow::FailureKind;

/// Folder path recorded by the folder picker.
pub const DEFAULT_FOLDER: &str = "/path/to/tunnel/data";

/// File the first start resumes from, with its seeded progress.
pub const RESUME_FILE: &str = "tunnel_002.las";
pub const RESUME_FILE_PROGRESS: f64 = 65.0;
pub const RESUME_OVERALL_PROGRESS: f64 = 35.0;

/// Overall progress never passes this while ticking.
pub const OVERALL_CAP: f64 = 85.0;

/// Ticker period in milliseconds.
pub const TICK_MS: u64 = 500;

const INSUFFICIENT_MEMORY: &str = "insufficient memory";

/// One row of the batch file table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub name: String,
    pub size: u64,
    pub status: FileStatus,
    pub progress: f64,
    pub error: Option<String>,
}

impl BatchRow {
    fn new(name: &str, size: u64, status: FileStatus, progress: f64) -> Self {
        Self { name: name.to_string(), size, status, progress, error: None }
    }

    /// Failure class of an errored row.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        if self.status != FileStatus::Error {
            return None;
        }
        match self.error.as_deref() {
            Some(INSUFFICIENT_MEMORY) => Some(FailureKind::ResourceExhausted),
            _ => Some(FailureKind::Io),
        }
    }
}

/// A completed output available for preview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchPreview {
    pub name: String,
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub processing_time_secs: f64,
}

impl BatchPreview {
    fn new(name: &str, photo: u32, width: u32, height: u32, processing_time_secs: f64) -> Self {
        Self {
            name: name.to_string(),
            image_url: format!("https://images.pexels.com/photos/{photo}/pexels-photo-{photo}.jpeg"),
            width,
            height,
            processing_time_secs,
        }
    }
}

#[must_use]
pub fn seeded_rows() -> Vec<BatchRow> {
    vec![
        BatchRow::new("tunnel_001.las", 125_000_000, FileStatus::Completed, 100.0),
        BatchRow::new("tunnel_002.las", 98_000_000, FileStatus::Processing, 65.0),
        BatchRow::new("tunnel_003.las", 156_000_000, FileStatus::Pending, 0.0),
        BatchRow {
            error: Some(INSUFFICIENT_MEMORY.to_string()),
            ..BatchRow::new("tunnel_004.las", 87_000_000, FileStatus::Error, 0.0)
        },
        BatchRow::new("tunnel_005.las", 234_000_000, FileStatus::Pending, 0.0),
        BatchRow::new("tunnel_006.las", 178_000_000, FileStatus::Completed, 100.0),
        BatchRow::new("tunnel_007.las", 203_000_000, FileStatus::Completed, 100.0),
        BatchRow::new("tunnel_008.las", 145_000_000, FileStatus::Pending, 0.0),
    ]
}

#[must_use]
pub fn seeded_previews() -> Vec<BatchPreview> {
    vec![
        BatchPreview::new("tunnel_001.las", 1_181_467, 1520, 850, 7.2),
        BatchPreview::new("tunnel_006.las", 1_181_263, 1480, 820, 6.8),
        BatchPreview::new("tunnel_007.las", 1_181_298, 1600, 900, 8.1),
    ]
}

// =============================================================================
// REDUCER
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum BatchAction {
    SelectFolder(String),
    Start,
    Pause,
    /// One ticker step. Deltas are drawn by the caller.
    Tick { file_delta: f64, overall_delta: f64 },
    SelectPreview(String),
    ClearPreview,
}

impl BatchAction {
    /// Draw a tick with file delta in `[0, 5)` and overall delta in `[0, 2)`.
    pub fn random_tick(rng: &mut impl Rng) -> Self {
        Self::Tick { file_delta: rng.random_range(0.0..5.0), overall_delta: rng.random_range(0.0..2.0) }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchState {
    pub folder: Option<String>,
    pub running: bool,
    /// Set once the first start has seeded the resume point.
    pub started: bool,
    pub current_file: String,
    pub file_progress: f64,
    pub overall_progress: f64,
    pub rows: Vec<BatchRow>,
    pub previews: Vec<BatchPreview>,
    pub selected_preview: Option<String>,
}

impl Default for BatchState {
    fn default() -> Self {
        Self {
            folder: None,
            running: false,
            started: false,
            current_file: String::new(),
            file_progress: 0.0,
            overall_progress: 0.0,
            rows: seeded_rows(),
            previews: seeded_previews(),
            selected_preview: None,
        }
    }
}

impl BatchState {
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.folder.is_some() && !self.running
    }

    #[must_use]
    pub fn reduce(mut self, action: BatchAction) -> Self {
        match action {
            BatchAction::SelectFolder(path) => self.folder = Some(path),
            BatchAction::Start => {
                if !self.can_start() {
                    return self;
                }
                if !self.started {
                    self.started = true;
                    self.current_file = RESUME_FILE.to_string();
                    self.file_progress = RESUME_FILE_PROGRESS;
                    self.overall_progress = RESUME_OVERALL_PROGRESS;
                }
                self.running = true;
            }
            BatchAction::Pause => self.running = false,
            BatchAction::Tick { file_delta, overall_delta } => {
                if !self.running {
                    return self;
                }
                self.file_progress = (self.file_progress + file_delta.max(0.0)).min(100.0);
                self.overall_progress = (self.overall_progress + overall_delta.max(0.0)).min(OVERALL_CAP);
            }
            BatchAction::SelectPreview(name) => {
                if self.preview(&name).is_some() {
                    self.selected_preview = Some(name);
                }
            }
            BatchAction::ClearPreview => self.selected_preview = None,
        }
        self
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(FileStatus::Completed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(FileStatus::Error)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    fn count(&self, status: FileStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    #[must_use]
    pub fn preview(&self, name: &str) -> Option<&BatchPreview> {
        self.previews.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn selected_preview(&self) -> Option<&BatchPreview> {
        self.selected_preview.as_deref().and_then(|name| self.preview(name))
    }
}
