//! Simulated feature generation for the fallback path.
//!
//! Every field is drawn independently from a fixed normal distribution
//! calibrated to typical human-voice statistics, so a simulated vector is
//! interchangeable with a measured one at the schema level. Physically
//! non-negative fields are floored so any seed stays inside the schema's
//! valid ranges. Pure function of the random source; no I/O.

use rand::Rng;
use rand_distr::StandardNormal;

use super::FeatureVector;

fn normal<R: Rng>(rng: &mut R, mean: f64, std: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + std * z
}

/// Generate a schema-complete feature vector from calibrated distributions.
///
/// Distributions per field:
/// - `mean_f0 ~ N(120, 20)`, `std_f0 ~ N(15, 5)`, `f0_range ~ N(50, 15)`
/// - `jitter_relative ~ N(0.004, 0.001)`, `shimmer_relative ~ N(0.035, 0.01)`,
///   `hnr ~ N(18, 3)`
/// - `rms_energy ~ N(0.1, 0.03)`, `max_amplitude ~ N(0.3, 0.1)`,
///   `spectral_centroid_mean ~ N(1500, 500)`, `zcr_mean ~ N(0.1, 0.03)`
/// - `mfcc_i_mean ~ N(0, 1)`, `mfcc_i_std ~ N(1, 0.2)`
pub fn simulate_features<R: Rng>(rng: &mut R) -> FeatureVector {
    FeatureVector {
        mean_f0: normal(rng, 120.0, 20.0).max(60.0),
        std_f0: normal(rng, 15.0, 5.0).max(0.5),
        f0_range: normal(rng, 50.0, 15.0).max(1.0),
        jitter_relative: normal(rng, 0.004, 0.001).max(0.0005),
        shimmer_relative: normal(rng, 0.035, 0.01).max(0.005),
        hnr: normal(rng, 18.0, 3.0).max(1.0),
        rms_energy: normal(rng, 0.1, 0.03).max(0.001),
        max_amplitude: normal(rng, 0.3, 0.1).max(0.01),
        spectral_centroid_mean: normal(rng, 1500.0, 500.0).max(200.0),
        zcr_mean: normal(rng, 0.1, 0.03).max(0.005),
        mfcc_1_mean: normal(rng, 0.0, 1.0),
        mfcc_2_mean: normal(rng, 0.0, 1.0),
        mfcc_3_mean: normal(rng, 0.0, 1.0),
        mfcc_4_mean: normal(rng, 0.0, 1.0),
        mfcc_5_mean: normal(rng, 0.0, 1.0),
        mfcc_1_std: normal(rng, 1.0, 0.2).max(0.01),
        mfcc_2_std: normal(rng, 1.0, 0.2).max(0.01),
        mfcc_3_std: normal(rng, 1.0, 0.2).max(0.01),
        mfcc_4_std: normal(rng, 1.0, 0.2).max(0.01),
        mfcc_5_std: normal(rng, 1.0, 0.2).max(0.01),
    }
}
