//! Screening pipeline orchestration.
//!
//! ## Flow
//!
//! ```text
//! file path
//!     |
//!     v
//! Audio Loader ──failure──┐
//!     |                   |
//!     v                   v
//! Feature Extractor ──> Feature Simulator
//!     |                   |
//!     v                   v
//! Risk Scorer (model ──failure──> heuristic)
//!     |
//!     v
//! ScreeningReport
//! ```
//!
//! Every degraded path still produces a complete, well-formed report; the
//! caller never sees a loader or extractor failure. Mode transitions are
//! logged, and the report carries a provenance flag distinguishing measured
//! from simulated features.

use std::path::Path;

use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::audio::load_waveform;
use crate::config::PipelineConfig;
use crate::features::{
    extract_features, simulate_features, FeatureOrigin, FeatureProvenance, FeatureVector,
};
use crate::scoring::{heuristic, RiskAssessment, ScorerModel};

/// Wire-stable screening result.
///
/// The serialized field names are a published contract; downstream
/// consumers key off them.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    /// Risk estimate in [0, 100]
    pub risk_score: u8,
    /// Binary classification: 0 negative, 1 positive
    pub prediction: u8,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// The feature vector the score was derived from
    pub features: FeatureVector,
    /// True when the features came from the simulator rather than the clip
    pub simulated: bool,
    /// Detailed provenance for in-process callers; not part of the wire shape
    #[serde(skip)]
    pub provenance: FeatureProvenance,
}

/// Startup readiness snapshot
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelineStatus {
    pub extraction_enabled: bool,
    pub model_loaded: bool,
}

/// The assembled screening pipeline.
///
/// Holds the configuration and the optionally loaded classifier. All state
/// is read-only after construction, so one instance can serve concurrent
/// requests; each call owns its waveform, features, and report.
pub struct Pipeline {
    config: PipelineConfig,
    model: Option<ScorerModel>,
}

impl Pipeline {
    /// Build a pipeline, loading the classifier artifact at most once.
    ///
    /// A missing or invalid artifact is a normal, handled state: the cause
    /// is logged here and never again, and scoring runs heuristic-only.
    pub fn new(config: PipelineConfig) -> Self {
        let model = match &config.model_path {
            Some(path) => match ScorerModel::load(path) {
                Ok(model) => {
                    info!("scorer model loaded from {:?}", path);
                    Some(model)
                }
                Err(e) => {
                    warn!("scorer model unavailable ({e}); scoring heuristically");
                    None
                }
            },
            None => {
                info!("no scorer model configured; scoring heuristically");
                None
            }
        };

        Self { config, model }
    }

    /// Readiness snapshot for callers that surface health information
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            extraction_enabled: self.config.extraction_enabled,
            model_loaded: self.model.is_some(),
        }
    }

    /// Run the full pipeline on one recording.
    ///
    /// Infallible by construction: any loader or extractor failure degrades
    /// to simulated features, any model failure degrades to the heuristic,
    /// and neither fallback has a failure path of its own.
    pub fn analyze(&self, path: &Path) -> ScreeningReport {
        let mut rng = rand::thread_rng();

        let (features, provenance) = self.acquire_features(path, &mut rng);
        let assessment = self.score(&features, &mut rng);

        ScreeningReport {
            risk_score: assessment.risk_percentage,
            prediction: assessment.label.as_int(),
            confidence: assessment.confidence,
            simulated: provenance.origin == FeatureOrigin::Simulated,
            features,
            provenance,
        }
    }

    fn acquire_features<R: Rng>(
        &self,
        path: &Path,
        rng: &mut R,
    ) -> (FeatureVector, FeatureProvenance) {
        if !self.config.extraction_enabled {
            info!("extraction disabled; simulating features");
            return (simulate_features(rng), FeatureProvenance::simulated());
        }

        let waveform = match load_waveform(path, self.config.target_sample_rate) {
            Ok(waveform) => waveform,
            Err(e) => {
                warn!("audio load failed ({e}); falling back to simulated features");
                return (simulate_features(rng), FeatureProvenance::simulated());
            }
        };

        match extract_features(&waveform, rng) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!("feature extraction failed ({e}); falling back to simulated features");
                (simulate_features(rng), FeatureProvenance::simulated())
            }
        }
    }

    fn score<R: Rng>(&self, features: &FeatureVector, rng: &mut R) -> RiskAssessment {
        if let Some(model) = &self.model {
            match model.score(features) {
                Ok(assessment) => return assessment,
                Err(e) => {
                    warn!("model scoring failed ({e}); falling back to heuristic");
                }
            }
        }
        heuristic::score(features, rng)
    }
}
