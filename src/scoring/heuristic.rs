//! Rule-based risk scoring.
//!
//! Additive adjustments over a neutral base, keyed on clinically motivated
//! thresholds: elevated jitter and shimmer, depressed HNR, and high pitch
//! variability all correlate with voice instability. A small bounded random
//! term keeps repeated screenings from looking artificially identical, and
//! the final score is clamped away from both extremes so a heuristic never
//! claims certainty.

use rand::Rng;

use crate::features::FeatureVector;

use super::RiskAssessment;

/// Neutral starting risk
const BASE_RISK: i32 = 50;

/// Jitter above this adds 25 points; above [`JITTER_ELEVATED`], 15
const JITTER_HIGH: f64 = 0.005;
const JITTER_ELEVATED: f64 = 0.004;

/// Shimmer above this adds 20 points; above [`SHIMMER_ELEVATED`], 10
const SHIMMER_HIGH: f64 = 0.045;
const SHIMMER_ELEVATED: f64 = 0.035;

/// HNR below this adds 20 points; below [`HNR_REDUCED`], 10
const HNR_LOW: f64 = 15.0;
const HNR_REDUCED: f64 = 18.0;

/// F0 standard deviation above this adds 10 points
const F0_STD_HIGH: f64 = 20.0;

/// Clamp bounds: a heuristic never reports full certainty either way
const MIN_RISK: i32 = 5;
const MAX_RISK: i32 = 95;

/// Score a feature vector with the threshold rules.
pub fn score<R: Rng>(features: &FeatureVector, rng: &mut R) -> RiskAssessment {
    let mut risk = BASE_RISK;

    if features.jitter_relative > JITTER_HIGH {
        risk += 25;
    } else if features.jitter_relative > JITTER_ELEVATED {
        risk += 15;
    }

    if features.shimmer_relative > SHIMMER_HIGH {
        risk += 20;
    } else if features.shimmer_relative > SHIMMER_ELEVATED {
        risk += 10;
    }

    if features.hnr < HNR_LOW {
        risk += 20;
    } else if features.hnr < HNR_REDUCED {
        risk += 10;
    }

    if features.std_f0 > F0_STD_HIGH {
        risk += 10;
    }

    risk += rng.gen_range(-10..15);

    RiskAssessment::from_risk(risk.clamp(MIN_RISK, MAX_RISK) as u8)
}
