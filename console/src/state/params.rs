//! Per-panel workflow parameters.
//!
//! Each record is plain data with the console defaults. Setters clamp to the
//! range the input controls allow, so an out-of-range value never reaches a
//! run.

#[cfg(test)]
#[path = "params_test.rs"]
mod params_test;

use serde::{Deserialize, Serialize};

pub const SAMPLE_RATIO_RANGE: (f64, f64) = (0.01, 1.0);
pub const RESOLUTION_RANGE: (u32, u32) = (50, 500);
pub const DEVIATION_RANGE: (f64, f64) = (0.1, 2.0);
pub const WORKER_RANGE: (u32, u32) = (1, 16);

// =============================================================================
// UNWRAP
// =============================================================================

/// Parameters of a single-file cylindrical unwrap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnwrapParams {
    /// Fraction of points sampled for the cylinder fit.
    pub sample_ratio: f64,
    /// Output image resolution in pixels per meter.
    pub resolution: u32,
    /// Outlier deviation threshold in meters.
    pub deviation_threshold: f64,
    pub save_diagnostic_images: bool,
}

impl Default for UnwrapParams {
    fn default() -> Self {
        Self { sample_ratio: 0.05, resolution: 100, deviation_threshold: 0.5, save_diagnostic_images: true }
    }
}

impl UnwrapParams {
    #[must_use]
    pub fn with_sample_ratio(mut self, value: f64) -> Self {
        self.sample_ratio = value.clamp(SAMPLE_RATIO_RANGE.0, SAMPLE_RATIO_RANGE.1);
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, value: u32) -> Self {
        self.resolution = clamp_resolution(value);
        self
    }

    #[must_use]
    pub fn with_deviation_threshold(mut self, value: f64) -> Self {
        self.deviation_threshold = value.clamp(DEVIATION_RANGE.0, DEVIATION_RANGE.1);
        self
    }

    #[must_use]
    pub fn with_diagnostic_images(mut self, save: bool) -> Self {
        self.save_diagnostic_images = save;
        self
    }
}

// =============================================================================
// BATCH
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeMode {
    #[default]
    Cpu,
    Gpu,
}

impl ComputeMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
        }
    }
}

/// Parameters of a folder-level batch run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchParams {
    pub mode: ComputeMode,
    pub worker_count: u32,
    pub resolution: u32,
    /// Skip files that already have an output.
    pub skip_existing: bool,
}

impl Default for BatchParams {
    fn default() -> Self {
        Self { mode: ComputeMode::Cpu, worker_count: 4, resolution: 100, skip_existing: true }
    }
}

impl BatchParams {
    #[must_use]
    pub fn with_mode(mut self, mode: ComputeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_worker_count(mut self, value: u32) -> Self {
        self.worker_count = value.clamp(WORKER_RANGE.0, WORKER_RANGE.1);
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, value: u32) -> Self {
        self.resolution = clamp_resolution(value);
        self
    }

    #[must_use]
    pub fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }
}

// =============================================================================
// ANALYSIS
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Quick,
    #[default]
    Standard,
    Deep,
}

impl AnalysisMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Quick => "Quick",
            Self::Standard => "Standard",
            Self::Deep => "Deep",
        }
    }
}

/// Feature families extracted during analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureToggles {
    pub geometric: bool,
    pub color: bool,
    pub structure: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self { geometric: true, color: true, structure: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub mode: AnalysisMode,
    pub features: FeatureToggles,
    pub gpu_acceleration: bool,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self { mode: AnalysisMode::Standard, features: FeatureToggles::default(), gpu_acceleration: true }
    }
}

impl AnalysisParams {
    #[must_use]
    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: FeatureToggles) -> Self {
        self.features = features;
        self
    }

    #[must_use]
    pub fn with_gpu_acceleration(mut self, enabled: bool) -> Self {
        self.gpu_acceleration = enabled;
        self
    }
}

pub(crate) fn clamp_resolution(value: u32) -> u32 {
    value.clamp(RESOLUTION_RANGE.0, RESOLUTION_RANGE.1)
}
