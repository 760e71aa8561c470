//! Pipeline configuration.
//!
//! All the knobs the original ambient globals covered, constructed once at
//! startup and threaded explicitly into the pipeline.

use std::path::PathBuf;

use crate::audio::TARGET_SAMPLE_RATE;

/// Configuration for the screening pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sample rate every clip is resampled to before analysis (Hz)
    pub target_sample_rate: u32,

    /// Path to the classifier artifact (JSON). `None` runs heuristic-only.
    pub model_path: Option<PathBuf>,

    /// When false the extractor is skipped entirely and every request is
    /// scored on simulated features
    pub extraction_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: TARGET_SAMPLE_RATE,
            model_path: None,
            extraction_enabled: true,
        }
    }
}

impl PipelineConfig {
    /// Create a config with the specified model artifact path
    pub fn with_model_path(model_path: PathBuf) -> Self {
        Self {
            model_path: Some(model_path),
            ..Default::default()
        }
    }
}
