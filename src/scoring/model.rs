//! Trained classifier loading and inference.
//!
//! The artifact is a JSON file holding a standard scaler and logistic
//! regression weights over the canonical feature schema. It is validated
//! once at load time — schema version, feature names, shape, finite and
//! non-degenerate scales — so per-request scoring has nothing left to
//! check. Inference is deterministic: the same vector and artifact always
//! produce the same assessment.

use std::path::{Path, PathBuf};

use ndarray::Array1;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::features::{FeatureVector, FEATURE_NAMES, FEATURE_SCHEMA_VERSION};

use super::RiskAssessment;

/// Errors from loading or applying the classifier artifact
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read model artifact: {0}")]
    Read(String),

    #[error("failed to parse model artifact: {0}")]
    Parse(String),

    #[error("model schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("model inference failed: {0}")]
    Inference(String),
}

/// On-disk artifact layout
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    schema_version: u32,
    feature_order: Vec<String>,
    scaler: ScalerArtifact,
    coefficients: Vec<f64>,
    intercept: f64,
}

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// A loaded classifier: feature projection order, standard scaler, and
/// logistic weights. Immutable after load; safe to share across requests.
#[derive(Debug)]
pub struct ScorerModel {
    feature_order: Vec<String>,
    scaler_mean: Array1<f64>,
    scaler_scale: Array1<f64>,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl ScorerModel {
    /// Load and validate an artifact. Every way the artifact can disagree
    /// with the canonical schema is rejected here, not at scoring time.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ModelError::Read(e.to_string()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&content).map_err(|e| ModelError::Parse(e.to_string()))?;

        if artifact.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(ModelError::SchemaMismatch(format!(
                "artifact schema version {} does not match feature schema version {}",
                artifact.schema_version, FEATURE_SCHEMA_VERSION
            )));
        }

        if artifact.feature_order.is_empty() {
            return Err(ModelError::SchemaMismatch(
                "artifact has an empty feature order".to_string(),
            ));
        }
        for name in &artifact.feature_order {
            if !FEATURE_NAMES.contains(&name.as_str()) {
                return Err(ModelError::SchemaMismatch(format!(
                    "artifact references unknown feature '{name}'"
                )));
            }
        }

        let n = artifact.feature_order.len();
        if artifact.scaler.mean.len() != n
            || artifact.scaler.scale.len() != n
            || artifact.coefficients.len() != n
        {
            return Err(ModelError::SchemaMismatch(format!(
                "artifact shapes disagree: {} features, {} scaler means, {} scaler scales, {} coefficients",
                n,
                artifact.scaler.mean.len(),
                artifact.scaler.scale.len(),
                artifact.coefficients.len()
            )));
        }

        let finite = artifact.scaler.mean.iter().all(|v| v.is_finite())
            && artifact.scaler.scale.iter().all(|v| v.is_finite() && *v != 0.0)
            && artifact.coefficients.iter().all(|v| v.is_finite())
            && artifact.intercept.is_finite();
        if !finite {
            return Err(ModelError::SchemaMismatch(
                "artifact contains non-finite or zero-scale values".to_string(),
            ));
        }

        debug!(
            "scorer model validated: {} features, schema version {}",
            n, artifact.schema_version
        );

        Ok(Self {
            feature_order: artifact.feature_order,
            scaler_mean: Array1::from(artifact.scaler.mean),
            scaler_scale: Array1::from(artifact.scaler.scale),
            coefficients: Array1::from(artifact.coefficients),
            intercept: artifact.intercept,
        })
    }

    /// Score a feature vector. Fields the artifact orders by are looked up
    /// by name; a projection miss defaults to 0.
    pub fn score(&self, features: &FeatureVector) -> Result<RiskAssessment, ModelError> {
        let projected = Array1::from_iter(
            self.feature_order
                .iter()
                .map(|name| features.get(name).unwrap_or(0.0)),
        );

        let scaled = (&projected - &self.scaler_mean) / &self.scaler_scale;
        let logit = self.coefficients.dot(&scaled) + self.intercept;
        let probability = 1.0 / (1.0 + (-logit).exp());

        if !probability.is_finite() {
            return Err(ModelError::Inference(format!(
                "non-finite class probability (logit {logit})"
            )));
        }

        let risk = (probability * 100.0).round().clamp(0.0, 100.0) as u8;
        Ok(RiskAssessment::from_risk(risk))
    }
}
