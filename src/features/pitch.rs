//! Fundamental frequency track and voiced-frame statistics.
//!
//! ## Algorithm
//! 1. Segment the clip into overlapping frames
//! 2. Run the McLeod pitch algorithm on each frame
//! 3. Keep frames whose estimate falls in the plausible speaking range
//! 4. Summarize mean / standard deviation / range over voiced frames only
//!
//! Pitch absence is common in short or noisy clips, so an empty track is not
//! an error: the statistics fall back to domain-typical defaults instead.

use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;

/// Frame size for pitch detection (~93ms at 22.05kHz)
pub const PITCH_FRAME_SIZE: usize = 2048;

/// Hop size between pitch frames
pub const PITCH_HOP_SIZE: usize = 512;

/// Lower bound of the plausible speaking range (Hz)
pub const MIN_PITCH_HZ: f32 = 80.0;

/// Upper bound of the plausible speaking range (Hz)
pub const MAX_PITCH_HZ: f32 = 300.0;

/// Power threshold for pitch detection
const POWER_THRESHOLD: f32 = 0.8;

/// Clarity threshold for pitch detection
const CLARITY_THRESHOLD: f32 = 0.5;

/// Default mean F0 when no voiced frames are found (Hz)
pub const DEFAULT_MEAN_F0: f64 = 120.0;

/// Default F0 standard deviation when no voiced frames are found (Hz)
pub const DEFAULT_STD_F0: f64 = 10.0;

/// Default F0 range when no voiced frames are found (Hz)
pub const DEFAULT_F0_RANGE: f64 = 50.0;

/// One frame with a pitch estimate inside the plausible range
#[derive(Debug, Clone, Copy)]
pub struct VoicedFrame {
    /// Sample offset of the frame start within the clip
    pub offset: usize,
    /// Estimated fundamental frequency (Hz)
    pub frequency: f32,
}

/// Pitch track over a whole clip
#[derive(Debug, Clone, Default)]
pub struct PitchTrack {
    pub voiced: Vec<VoicedFrame>,
    pub total_frames: usize,
}

impl PitchTrack {
    /// Fraction of frames with a valid pitch estimate (0.0-1.0)
    pub fn voiced_ratio(&self) -> f32 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.voiced.len() as f32 / self.total_frames as f32
        }
    }
}

/// Summary statistics over the voiced frames of a track
#[derive(Debug, Clone, Copy)]
pub struct PitchStats {
    pub mean_f0: f64,
    pub std_f0: f64,
    pub f0_range: f64,
    /// True when the values above are the documented defaults
    pub defaulted: bool,
}

/// Run the McLeod detector over the clip and keep in-range estimates.
pub fn track_pitch(samples: &[f32], sample_rate: u32) -> PitchTrack {
    if samples.len() < PITCH_FRAME_SIZE {
        return PitchTrack::default();
    }

    let mut detector = McLeodDetector::new(PITCH_FRAME_SIZE, PITCH_FRAME_SIZE / 2);
    let mut track = PitchTrack::default();

    let mut start = 0;
    while start + PITCH_FRAME_SIZE <= samples.len() {
        let frame = &samples[start..start + PITCH_FRAME_SIZE];
        track.total_frames += 1;

        if let Some(pitch) = detector.get_pitch(
            frame,
            sample_rate as usize,
            POWER_THRESHOLD,
            CLARITY_THRESHOLD,
        ) {
            if pitch.frequency.is_finite()
                && pitch.frequency >= MIN_PITCH_HZ
                && pitch.frequency <= MAX_PITCH_HZ
            {
                track.voiced.push(VoicedFrame {
                    offset: start,
                    frequency: pitch.frequency,
                });
            }
        }

        start += PITCH_HOP_SIZE;
    }

    track
}

/// Mean / std / range over voiced frames, or the documented defaults when
/// the track has none.
pub fn pitch_statistics(track: &PitchTrack) -> PitchStats {
    if track.voiced.is_empty() {
        return PitchStats {
            mean_f0: DEFAULT_MEAN_F0,
            std_f0: DEFAULT_STD_F0,
            f0_range: DEFAULT_F0_RANGE,
            defaulted: true,
        };
    }

    let frequencies: Vec<f64> = track.voiced.iter().map(|f| f.frequency as f64).collect();
    let n = frequencies.len() as f64;

    let mean = frequencies.iter().sum::<f64>() / n;
    let variance = frequencies.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &f in &frequencies {
        min = min.min(f);
        max = max.max(f);
    }
    let range = max - min;

    if !mean.is_finite() || !std.is_finite() || !range.is_finite() {
        return PitchStats {
            mean_f0: DEFAULT_MEAN_F0,
            std_f0: DEFAULT_STD_F0,
            f0_range: DEFAULT_F0_RANGE,
            defaulted: true,
        };
    }

    PitchStats {
        mean_f0: mean,
        std_f0: std,
        f0_range: range,
        defaulted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 22050;

    fn generate_sine(freq: f32, duration_ms: u32) -> Vec<f32> {
        let num_samples = (SAMPLE_RATE * duration_ms / 1000) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                (2.0 * PI * freq * t).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn test_track_pitch_steady_tone() {
        let samples = generate_sine(200.0, 1000);
        let track = track_pitch(&samples, SAMPLE_RATE);

        assert!(
            track.voiced_ratio() > 0.5,
            "expected mostly voiced frames, got ratio {}",
            track.voiced_ratio()
        );

        let stats = pitch_statistics(&track);
        assert!(!stats.defaulted);
        assert!(
            (stats.mean_f0 - 200.0).abs() < 20.0,
            "expected mean ~200 Hz, got {}",
            stats.mean_f0
        );
        assert!(stats.std_f0 < 10.0, "steady tone, got std {}", stats.std_f0);
    }

    #[test]
    fn test_track_pitch_silence_has_no_voiced_frames() {
        let samples = vec![0.0; SAMPLE_RATE as usize];
        let track = track_pitch(&samples, SAMPLE_RATE);
        assert!(track.voiced.is_empty());
        assert!(track.total_frames > 0);
    }

    #[test]
    fn test_track_pitch_rejects_out_of_range() {
        // 1 kHz is outside the 80-300 Hz speaking range
        let samples = generate_sine(1000.0, 500);
        let track = track_pitch(&samples, SAMPLE_RATE);
        assert!(track.voiced.is_empty());
    }

    #[test]
    fn test_track_pitch_too_short_clip() {
        let samples = vec![0.1; PITCH_FRAME_SIZE / 2];
        let track = track_pitch(&samples, SAMPLE_RATE);
        assert_eq!(track.total_frames, 0);
    }

    #[test]
    fn test_statistics_default_on_empty_track() {
        let stats = pitch_statistics(&PitchTrack::default());
        assert!(stats.defaulted);
        assert_eq!(stats.mean_f0, DEFAULT_MEAN_F0);
        assert_eq!(stats.std_f0, DEFAULT_STD_F0);
        assert_eq!(stats.f0_range, DEFAULT_F0_RANGE);
    }

    #[test]
    fn test_statistics_varying_pitch_widens_range() {
        let mut samples = generate_sine(150.0, 500);
        samples.extend(generate_sine(250.0, 500));

        let track = track_pitch(&samples, SAMPLE_RATE);
        let stats = pitch_statistics(&track);

        assert!(!stats.defaulted);
        assert!(
            stats.f0_range > 50.0,
            "two tones 100 Hz apart, got range {}",
            stats.f0_range
        );
        assert!(stats.mean_f0 > 130.0 && stats.mean_f0 < 270.0);
    }
}
