//! Risk scoring: feature vector in, bounded risk assessment out.
//!
//! Two interchangeable modes produce the same output shape:
//! - **Model mode**: a trained classifier artifact (scaler + logistic
//!   weights) loaded once at startup
//! - **Heuristic mode**: additive threshold rules, used when no artifact is
//!   available or model scoring fails
//!
//! Both modes share the decision threshold and the confidence rule so the
//! caller cannot tell them apart structurally.

pub mod heuristic;
pub mod model;

pub use model::{ModelError, ScorerModel};

use serde::Serialize;

/// Risk percentage at or above which the classification flips positive.
/// Shared by both scoring modes.
pub const DECISION_THRESHOLD: u8 = 50;

/// Confidence ceiling; a screening heuristic never claims more than this
pub const MAX_CONFIDENCE: f32 = 0.95;

/// Binary screening classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLabel {
    Negative,
    Positive,
}

impl RiskLabel {
    /// Classify a risk percentage against [`DECISION_THRESHOLD`]
    pub fn from_risk(risk_percentage: u8) -> Self {
        if risk_percentage >= DECISION_THRESHOLD {
            RiskLabel::Positive
        } else {
            RiskLabel::Negative
        }
    }

    /// Wire encoding: 0 for negative, 1 for positive
    pub fn as_int(self) -> u8 {
        match self {
            RiskLabel::Negative => 0,
            RiskLabel::Positive => 1,
        }
    }
}

/// One screening outcome: classification, bounded risk, bounded confidence
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    /// Risk estimate in [0, 100]
    pub risk_percentage: u8,
    /// Confidence in [0, 1], capped at [`MAX_CONFIDENCE`]
    pub confidence: f32,
}

impl RiskAssessment {
    /// Build an assessment from a risk percentage, deriving the label and
    /// confidence with the shared rules.
    pub fn from_risk(risk_percentage: u8) -> Self {
        Self {
            label: RiskLabel::from_risk(risk_percentage),
            risk_percentage,
            confidence: confidence_for(risk_percentage),
        }
    }
}

/// Shared confidence rule: `min(0.95, risk/100 + 0.1)`
pub fn confidence_for(risk_percentage: u8) -> f32 {
    (risk_percentage as f32 / 100.0 + 0.1).min(MAX_CONFIDENCE)
}
