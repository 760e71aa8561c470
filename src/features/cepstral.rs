//! Cepstral coefficients summarized over analysis frames.
//!
//! ## Algorithm
//! 1. Hann-windowed FFT per frame, power spectrum
//! 2. Triangular mel filterbank, log energies
//! 3. Orthonormal DCT-II over the log energies
//! 4. Keep the first [`CEPSTRAL_COEFFS`] coefficients, summarize each by
//!    mean and standard deviation across frames

use realfft::RealFftPlanner;
use std::f32::consts::PI;

use super::spectral::{HOP_LENGTH, N_FFT};
use super::CEPSTRAL_COEFFS;

/// Number of mel bands feeding the DCT
const N_MELS: usize = 40;

/// Lower edge of the mel filterbank (Hz)
const FMIN: f32 = 20.0;

/// Floor added before taking the log of a band energy
const LOG_OFFSET: f32 = 1e-10;

/// Per-coefficient mean and standard deviation across frames
#[derive(Debug, Clone, Copy)]
pub struct CepstralSummary {
    pub means: [f64; CEPSTRAL_COEFFS],
    pub stds: [f64; CEPSTRAL_COEFFS],
}

impl CepstralSummary {
    fn zeroed() -> Self {
        Self {
            means: [0.0; CEPSTRAL_COEFFS],
            stds: [0.0; CEPSTRAL_COEFFS],
        }
    }
}

/// Compute the first [`CEPSTRAL_COEFFS`] cepstral coefficients per frame and
/// summarize them. A clip shorter than one frame yields the zero summary.
pub fn cepstral_summary(samples: &[f32], sample_rate: u32) -> CepstralSummary {
    if samples.len() < N_FFT {
        return CepstralSummary::zeroed();
    }

    let window: Vec<f32> = (0..N_FFT)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (N_FFT - 1) as f32).cos()))
        .collect();
    let filterbank = create_mel_filterbank(
        N_MELS,
        N_FFT / 2 + 1,
        sample_rate as f32,
        FMIN,
        sample_rate as f32 / 2.0,
    );

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(N_FFT);
    let mut fft_input = vec![0.0f32; N_FFT];
    let mut fft_output = fft.make_output_vec();

    let n_frames = 1 + (samples.len() - N_FFT) / HOP_LENGTH;
    let mut sums = [0.0f64; CEPSTRAL_COEFFS];
    let mut sq_sums = [0.0f64; CEPSTRAL_COEFFS];
    let mut used_frames = 0usize;

    for frame_idx in 0..n_frames {
        let start = frame_idx * HOP_LENGTH;
        let frame = &samples[start..start + N_FFT];

        for (i, (&s, &w)) in frame.iter().zip(window.iter()).enumerate() {
            fft_input[i] = s * w;
        }
        if fft.process(&mut fft_input, &mut fft_output).is_err() {
            continue;
        }

        let power_spec: Vec<f32> = fft_output.iter().map(|c| c.norm_sqr()).collect();

        let log_mel: Vec<f64> = filterbank
            .iter()
            .map(|filter| {
                let energy: f32 = filter
                    .iter()
                    .zip(power_spec.iter())
                    .map(|(f, p)| f * p)
                    .sum();
                (energy + LOG_OFFSET).ln() as f64
            })
            .collect();

        let coeffs = dct_ii(&log_mel);
        if coeffs.iter().any(|c| !c.is_finite()) {
            continue;
        }

        for k in 0..CEPSTRAL_COEFFS {
            sums[k] += coeffs[k];
            sq_sums[k] += coeffs[k] * coeffs[k];
        }
        used_frames += 1;
    }

    if used_frames == 0 {
        return CepstralSummary::zeroed();
    }

    let n = used_frames as f64;
    let mut summary = CepstralSummary::zeroed();
    for k in 0..CEPSTRAL_COEFFS {
        let mean = sums[k] / n;
        let variance = (sq_sums[k] / n - mean * mean).max(0.0);
        summary.means[k] = mean;
        summary.stds[k] = variance.sqrt();
    }
    summary
}

/// Orthonormal DCT-II of the log mel energies, truncated to the first
/// [`CEPSTRAL_COEFFS`] coefficients.
fn dct_ii(input: &[f64]) -> [f64; CEPSTRAL_COEFFS] {
    let n = input.len() as f64;
    let mut output = [0.0f64; CEPSTRAL_COEFFS];

    for (k, out) in output.iter_mut().enumerate() {
        let mut sum = 0.0f64;
        for (i, &value) in input.iter().enumerate() {
            sum += value * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos();
        }
        let norm = if k == 0 {
            (1.0 / n).sqrt()
        } else {
            (2.0 / n).sqrt()
        };
        *out = sum * norm;
    }

    output
}

/// Convert frequency to mel scale
fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel scale to frequency
fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Create a triangular mel filterbank matrix
fn create_mel_filterbank(
    n_mels: usize,
    n_fft_bins: usize,
    sample_rate: f32,
    fmin: f32,
    fmax: f32,
) -> Vec<Vec<f32>> {
    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);

    // n_mels + 2 equally spaced points in mel scale
    let mel_points: Vec<f32> = (0..=n_mels + 1)
        .map(|i| mel_min + (mel_max - mel_min) * (i as f32) / ((n_mels + 1) as f32))
        .collect();

    let hz_points: Vec<f32> = mel_points.iter().map(|&m| mel_to_hz(m)).collect();

    let fft_bin_points: Vec<f32> = hz_points
        .iter()
        .map(|&hz| (n_fft_bins as f32 - 1.0) * hz / (sample_rate / 2.0))
        .collect();

    let mut filterbank = Vec::with_capacity(n_mels);

    for i in 0..n_mels {
        let mut filter = vec![0.0f32; n_fft_bins];

        let left = fft_bin_points[i];
        let center = fft_bin_points[i + 1];
        let right = fft_bin_points[i + 2];

        for (bin, weight) in filter.iter_mut().enumerate() {
            let bin_f = bin as f32;

            if bin_f >= left && bin_f < center {
                *weight = (bin_f - left) / (center - left);
            } else if bin_f >= center && bin_f <= right {
                *weight = (right - bin_f) / (right - center);
            }
        }

        filterbank.push(filter);
    }

    filterbank
}
