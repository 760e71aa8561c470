//! Audio ingest: WAV decode, mono downmix, and resampling to the analysis rate.
//!
//! The loader produces a [`Waveform`] ready for feature extraction, or a typed
//! [`AudioError`] so the pipeline can decide to fall back to simulated
//! features. Nothing in this module panics on malformed input.

mod loader;
mod resampler;

pub use loader::{load_waveform, TARGET_SAMPLE_RATE};
pub use resampler::resample_clip;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning a file into a [`Waveform`]
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio file not found: {0}")]
    FileMissing(PathBuf),

    #[error("audio file is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("failed to decode audio: {0}")]
    Decode(String),
}

/// A mono waveform at a known sample rate.
///
/// Constructed by the loader, consumed once by the feature extractor.
/// Invariant: `samples` is non-empty.
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    /// Clip duration in seconds
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_duration() {
        let wave = Waveform {
            samples: vec![0.0; 22050],
            sample_rate: 22050,
        };
        assert!((wave.duration_secs() - 1.0).abs() < 1e-6);
    }
}
