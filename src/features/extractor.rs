//! Field-by-field acoustic feature extraction.
//!
//! Each descriptor is computed independently; one misbehaving descriptor
//! substitutes its documented default locally instead of aborting the whole
//! extraction. Only a clip too short to frame at all is a total failure,
//! which the pipeline maps to the simulation fallback.

use rand::Rng;
use tracing::debug;

use crate::audio::Waveform;

use super::{
    cepstral, perturbation, pitch, spectral, ExtractionError, FeatureOrigin, FeatureProvenance,
    FeatureVector,
};

/// Extract the canonical feature set from a waveform.
///
/// The random source is only consulted when the voice-quality trio falls
/// back to its calibration distributions; the provenance records when that
/// happened.
pub fn extract_features<R: Rng>(
    waveform: &Waveform,
    rng: &mut R,
) -> Result<(FeatureVector, FeatureProvenance), ExtractionError> {
    let samples = &waveform.samples;
    let sample_rate = waveform.sample_rate;

    if samples.len() < spectral::N_FFT {
        return Err(ExtractionError::TooShort {
            samples: samples.len(),
            required: spectral::N_FFT,
        });
    }

    // Amplitude descriptors over the whole clip
    let rms_energy = (samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>()
        / samples.len() as f64)
        .sqrt();
    let max_amplitude = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max) as f64;

    let track = pitch::track_pitch(samples, sample_rate);
    let pitch_stats = pitch::pitch_statistics(&track);
    debug!(
        "pitch track: {}/{} voiced frames{}",
        track.voiced.len(),
        track.total_frames,
        if pitch_stats.defaulted { " (defaults substituted)" } else { "" }
    );

    let spectral_stats = spectral::spectral_statistics(samples, sample_rate);
    let cepstral_stats = cepstral::cepstral_summary(samples, sample_rate);

    let (measures, perturbation_measured) =
        match perturbation::measure_perturbation(samples, sample_rate, &track) {
            Some(measures) => (measures, true),
            None => {
                debug!("too few usable glottal cycles; substituting calibration values");
                (perturbation::default_perturbation(rng), false)
            }
        };

    let features = FeatureVector {
        mean_f0: finite_or(pitch_stats.mean_f0, pitch::DEFAULT_MEAN_F0),
        std_f0: finite_or(pitch_stats.std_f0, pitch::DEFAULT_STD_F0),
        f0_range: finite_or(pitch_stats.f0_range, pitch::DEFAULT_F0_RANGE),
        jitter_relative: finite_or(measures.jitter_relative, perturbation::DEFAULT_JITTER_MEAN),
        shimmer_relative: finite_or(
            measures.shimmer_relative,
            perturbation::DEFAULT_SHIMMER_MEAN,
        ),
        hnr: finite_or(measures.hnr, perturbation::DEFAULT_HNR_MEAN),
        rms_energy: finite_or(rms_energy, 0.0),
        max_amplitude: finite_or(max_amplitude, 0.0),
        spectral_centroid_mean: finite_or(spectral_stats.centroid_mean, 0.0),
        zcr_mean: finite_or(spectral_stats.zcr_mean, 0.0),
        mfcc_1_mean: finite_or(cepstral_stats.means[0], 0.0),
        mfcc_2_mean: finite_or(cepstral_stats.means[1], 0.0),
        mfcc_3_mean: finite_or(cepstral_stats.means[2], 0.0),
        mfcc_4_mean: finite_or(cepstral_stats.means[3], 0.0),
        mfcc_5_mean: finite_or(cepstral_stats.means[4], 0.0),
        mfcc_1_std: finite_or(cepstral_stats.stds[0], 1.0),
        mfcc_2_std: finite_or(cepstral_stats.stds[1], 1.0),
        mfcc_3_std: finite_or(cepstral_stats.stds[2], 1.0),
        mfcc_4_std: finite_or(cepstral_stats.stds[3], 1.0),
        mfcc_5_std: finite_or(cepstral_stats.stds[4], 1.0),
    };

    let provenance = FeatureProvenance {
        origin: FeatureOrigin::Measured,
        perturbation_measured,
        pitch_defaulted: pitch_stats.defaulted,
    };

    Ok((features, provenance))
}

/// A finite value, or the documented default for that descriptor.
fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Waveform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 22050;

    fn waveform_from(samples: Vec<f32>) -> Waveform {
        Waveform {
            samples,
            sample_rate: SAMPLE_RATE,
        }
    }

    fn generate_voice_like(duration_ms: u32) -> Vec<f32> {
        let num_samples = (SAMPLE_RATE * duration_ms / 1000) as usize;
        let fundamental = 150.0;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                (2.0 * PI * fundamental * t).sin() * 0.5
                    + (2.0 * PI * fundamental * 2.0 * t).sin() * 0.25
                    + (2.0 * PI * fundamental * 3.0 * t).sin() * 0.125
            })
            .collect()
    }

    #[test]
    fn test_silent_clip_extracts_without_dividing_by_zero() {
        let waveform = waveform_from(vec![0.0; SAMPLE_RATE as usize]);
        let mut rng = StdRng::seed_from_u64(7);

        let (features, provenance) =
            extract_features(&waveform, &mut rng).expect("extraction failed");

        assert_eq!(features.rms_energy, 0.0);
        assert_eq!(features.max_amplitude, 0.0);
        assert_eq!(features.mean_f0, pitch::DEFAULT_MEAN_F0);
        assert_eq!(features.std_f0, pitch::DEFAULT_STD_F0);
        assert_eq!(features.f0_range, pitch::DEFAULT_F0_RANGE);
        assert!(features.is_finite());
        assert!(provenance.pitch_defaulted);
        assert!(!provenance.perturbation_measured);
        assert_eq!(provenance.origin, FeatureOrigin::Measured);
    }

    #[test]
    fn test_voice_like_clip_yields_measured_fields() {
        let waveform = waveform_from(generate_voice_like(1000));
        let mut rng = StdRng::seed_from_u64(7);

        let (features, provenance) =
            extract_features(&waveform, &mut rng).expect("extraction failed");

        assert!(features.is_finite());
        assert!(!provenance.pitch_defaulted);
        assert!(provenance.perturbation_measured);
        assert!(
            (features.mean_f0 - 150.0).abs() < 20.0,
            "expected F0 near 150 Hz, got {}",
            features.mean_f0
        );
        assert!(features.rms_energy > 0.1);
        assert!(features.max_amplitude > 0.5);
        assert!(features.spectral_centroid_mean > 100.0);
    }

    #[test]
    fn test_too_short_clip_is_total_failure() {
        let waveform = waveform_from(vec![0.2; 1000]);
        let mut rng = StdRng::seed_from_u64(7);

        let result = extract_features(&waveform, &mut rng);
        assert!(matches!(
            result,
            Err(ExtractionError::TooShort { samples: 1000, .. })
        ));
    }

    #[test]
    fn test_schema_completeness_no_nan_for_noise() {
        // Deterministic pseudo-noise
        let mut seed = 12345u32;
        let samples: Vec<f32> = (0..SAMPLE_RATE as usize)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                ((seed >> 16) as f32 / 32768.0 - 1.0) * 0.3
            })
            .collect();

        let waveform = waveform_from(samples);
        let mut rng = StdRng::seed_from_u64(99);

        let (features, _) = extract_features(&waveform, &mut rng).expect("extraction failed");
        assert!(features.is_finite());
    }
}
