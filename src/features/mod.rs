//! Acoustic feature schema shared by the extractor and the simulator.
//!
//! The [`FeatureVector`] field set is a versioned contract: both producers
//! emit exactly these fields, in this order, with these wire names, so the
//! risk scorer never needs to know which producer ran. Downstream consumers
//! key off the serialized names; do not rename fields without bumping
//! [`FEATURE_SCHEMA_VERSION`].

pub mod cepstral;
pub mod extractor;
pub mod perturbation;
pub mod pitch;
pub mod simulator;
pub mod spectral;

pub use extractor::extract_features;
pub use simulator::simulate_features;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version of the feature schema below. Model artifacts must match.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Number of cepstral coefficients carried in the schema.
///
/// The serving schema always used 5; the 13-wide training generator was
/// never part of the scoring path, so 5 is the canonical width.
pub const CEPSTRAL_COEFFS: usize = 5;

/// Canonical field order. This is also the order model artifacts index by.
pub const FEATURE_NAMES: [&str; 20] = [
    "mean_f0",
    "std_f0",
    "f0_range",
    "jitter_relative",
    "shimmer_relative",
    "hnr",
    "rms_energy",
    "max_amplitude",
    "spectral_centroid_mean",
    "zcr_mean",
    "mfcc_1_mean",
    "mfcc_2_mean",
    "mfcc_3_mean",
    "mfcc_4_mean",
    "mfcc_5_mean",
    "mfcc_1_std",
    "mfcc_2_std",
    "mfcc_3_std",
    "mfcc_4_std",
    "mfcc_5_std",
];

/// Errors that abort feature extraction entirely.
///
/// Partial failures (a single descriptor misbehaving) never surface here;
/// those substitute their documented defaults locally.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("clip too short to frame: {samples} samples, need at least {required}")]
    TooShort { samples: usize, required: usize },
}

/// Fixed-schema acoustic descriptor set for one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mean fundamental frequency over voiced frames (Hz)
    pub mean_f0: f64,
    /// Standard deviation of F0 over voiced frames (Hz)
    pub std_f0: f64,
    /// Max minus min F0 over voiced frames (Hz)
    pub f0_range: f64,
    /// Cycle-to-cycle pitch period variation, relative to the mean period
    pub jitter_relative: f64,
    /// Cycle-to-cycle amplitude variation, relative to the mean amplitude
    pub shimmer_relative: f64,
    /// Harmonics-to-noise ratio (dB)
    pub hnr: f64,
    /// Root-mean-square energy of the whole clip
    pub rms_energy: f64,
    /// Maximum absolute sample value
    pub max_amplitude: f64,
    /// Mean per-frame spectral centroid (Hz)
    pub spectral_centroid_mean: f64,
    /// Mean per-frame zero-crossing rate
    pub zcr_mean: f64,
    pub mfcc_1_mean: f64,
    pub mfcc_2_mean: f64,
    pub mfcc_3_mean: f64,
    pub mfcc_4_mean: f64,
    pub mfcc_5_mean: f64,
    pub mfcc_1_std: f64,
    pub mfcc_2_std: f64,
    pub mfcc_3_std: f64,
    pub mfcc_4_std: f64,
    pub mfcc_5_std: f64,
}

impl FeatureVector {
    /// Look up a field by its wire name. Returns `None` for unknown names.
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "mean_f0" => self.mean_f0,
            "std_f0" => self.std_f0,
            "f0_range" => self.f0_range,
            "jitter_relative" => self.jitter_relative,
            "shimmer_relative" => self.shimmer_relative,
            "hnr" => self.hnr,
            "rms_energy" => self.rms_energy,
            "max_amplitude" => self.max_amplitude,
            "spectral_centroid_mean" => self.spectral_centroid_mean,
            "zcr_mean" => self.zcr_mean,
            "mfcc_1_mean" => self.mfcc_1_mean,
            "mfcc_2_mean" => self.mfcc_2_mean,
            "mfcc_3_mean" => self.mfcc_3_mean,
            "mfcc_4_mean" => self.mfcc_4_mean,
            "mfcc_5_mean" => self.mfcc_5_mean,
            "mfcc_1_std" => self.mfcc_1_std,
            "mfcc_2_std" => self.mfcc_2_std,
            "mfcc_3_std" => self.mfcc_3_std,
            "mfcc_4_std" => self.mfcc_4_std,
            "mfcc_5_std" => self.mfcc_5_std,
            _ => return None,
        };
        Some(value)
    }

    /// All fields in canonical order, paired with their wire names.
    pub fn fields(&self) -> [(&'static str, f64); 20] {
        [
            ("mean_f0", self.mean_f0),
            ("std_f0", self.std_f0),
            ("f0_range", self.f0_range),
            ("jitter_relative", self.jitter_relative),
            ("shimmer_relative", self.shimmer_relative),
            ("hnr", self.hnr),
            ("rms_energy", self.rms_energy),
            ("max_amplitude", self.max_amplitude),
            ("spectral_centroid_mean", self.spectral_centroid_mean),
            ("zcr_mean", self.zcr_mean),
            ("mfcc_1_mean", self.mfcc_1_mean),
            ("mfcc_2_mean", self.mfcc_2_mean),
            ("mfcc_3_mean", self.mfcc_3_mean),
            ("mfcc_4_mean", self.mfcc_4_mean),
            ("mfcc_5_mean", self.mfcc_5_mean),
            ("mfcc_1_std", self.mfcc_1_std),
            ("mfcc_2_std", self.mfcc_2_std),
            ("mfcc_3_std", self.mfcc_3_std),
            ("mfcc_4_std", self.mfcc_4_std),
            ("mfcc_5_std", self.mfcc_5_std),
        ]
    }

    /// True when every field holds a finite value
    pub fn is_finite(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_finite())
    }
}

/// Which execution path produced a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeatureOrigin {
    /// Extracted from the decoded waveform
    Measured,
    /// Drawn from the calibration distributions
    Simulated,
}

/// Where each part of a feature vector came from.
///
/// Lets callers distinguish measured values from proxy values without
/// changing the vector schema itself.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureProvenance {
    /// Producer of the vector as a whole
    pub origin: FeatureOrigin,
    /// False when jitter/shimmer/HNR fell back to the calibration
    /// distributions (too few usable glottal cycles)
    pub perturbation_measured: bool,
    /// True when the pitch statistics are the documented defaults
    /// (no voiced frames found)
    pub pitch_defaulted: bool,
}

impl FeatureProvenance {
    /// Provenance for a fully simulated vector
    pub fn simulated() -> Self {
        Self {
            origin: FeatureOrigin::Simulated,
            perturbation_measured: false,
            pitch_defaulted: false,
        }
    }
}
