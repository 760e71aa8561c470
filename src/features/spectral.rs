//! Framed spectral descriptors: spectral centroid and zero-crossing rate.

use realfft::RealFftPlanner;
use std::f32::consts::PI;

/// FFT size for spectral analysis
pub const N_FFT: usize = 2048;

/// Hop length between analysis frames
pub const HOP_LENGTH: usize = 512;

/// Per-clip spectral summary
#[derive(Debug, Clone, Copy)]
pub struct SpectralStats {
    /// Mean per-frame spectral centroid (Hz)
    pub centroid_mean: f64,
    /// Mean per-frame zero-crossing rate (fraction of sample pairs)
    pub zcr_mean: f64,
}

/// Compute mean spectral centroid and mean zero-crossing rate.
///
/// The clip must be at least one frame long; the extractor guarantees this.
/// Silent frames contribute a centroid of 0 rather than dividing by zero.
pub fn spectral_statistics(samples: &[f32], sample_rate: u32) -> SpectralStats {
    if samples.len() < N_FFT {
        return SpectralStats {
            centroid_mean: 0.0,
            zcr_mean: 0.0,
        };
    }

    let window: Vec<f32> = (0..N_FFT)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (N_FFT - 1) as f32).cos()))
        .collect();

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(N_FFT);
    let mut fft_input = vec![0.0f32; N_FFT];
    let mut fft_output = fft.make_output_vec();

    let bin_hz = sample_rate as f64 / N_FFT as f64;
    let n_frames = 1 + (samples.len() - N_FFT) / HOP_LENGTH;

    let mut centroid_sum = 0.0f64;
    let mut zcr_sum = 0.0f64;

    for frame_idx in 0..n_frames {
        let start = frame_idx * HOP_LENGTH;
        let frame = &samples[start..start + N_FFT];

        // Zero-crossing rate on the raw frame
        let crossings = frame
            .windows(2)
            .filter(|pair| pair[0] * pair[1] < 0.0)
            .count();
        zcr_sum += crossings as f64 / N_FFT as f64;

        // Centroid on the windowed magnitude spectrum
        for (i, (&s, &w)) in frame.iter().zip(window.iter()).enumerate() {
            fft_input[i] = s * w;
        }
        if fft.process(&mut fft_input, &mut fft_output).is_err() {
            continue;
        }

        let mut weighted = 0.0f64;
        let mut total = 0.0f64;
        for (bin, value) in fft_output.iter().enumerate() {
            let magnitude = value.norm() as f64;
            weighted += bin as f64 * bin_hz * magnitude;
            total += magnitude;
        }
        if total > 1e-12 {
            centroid_sum += weighted / total;
        }
    }

    SpectralStats {
        centroid_mean: centroid_sum / n_frames as f64,
        zcr_mean: zcr_sum / n_frames as f64,
    }
}
