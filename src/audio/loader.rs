//! WAV file loading with typed failures.
//!
//! Cheap precondition checks (missing file, zero-length file) run before any
//! decode work. Decode failures of every kind are folded into
//! [`AudioError::Decode`] so the caller can treat them uniformly.

use std::path::Path;

use hound::SampleFormat;
use tracing::debug;

use super::{resample_clip, AudioError, Waveform};

/// Analysis sample rate all clips are resampled to
pub const TARGET_SAMPLE_RATE: u32 = 22050;

/// Load an audio file as a mono waveform at `target_rate`.
///
/// Integer PCM (8/16/24/32-bit) is normalized to [-1, 1]; multi-channel
/// input is downmixed by averaging across channels.
pub fn load_waveform(path: &Path, target_rate: u32) -> Result<Waveform, AudioError> {
    let metadata =
        std::fs::metadata(path).map_err(|_| AudioError::FileMissing(path.to_path_buf()))?;
    if metadata.len() == 0 {
        return Err(AudioError::EmptyFile(path.to_path_buf()));
    }

    let mut reader =
        hound::WavReader::open(path).map_err(|e| AudioError::Decode(e.to_string()))?;
    let spec = reader.spec();
    debug!(
        "decoding {:?}: {} Hz, {} channel(s), {}-bit {:?}",
        path, spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    );

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::Decode(e.to_string()))?,
        (SampleFormat::Int, bits @ 1..=32) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Decode(e.to_string()))?
        }
        (format, bits) => {
            return Err(AudioError::Decode(format!(
                "unsupported encoding: {bits}-bit {format:?}"
            )))
        }
    };

    if interleaved.is_empty() {
        return Err(AudioError::Decode("no samples in data chunk".to_string()));
    }

    let channels = spec.channels.max(1) as usize;
    let mono: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    if mono.is_empty() {
        return Err(AudioError::Decode(
            "no complete frames in data chunk".to_string(),
        ));
    }

    let samples = resample_clip(&mono, spec.sample_rate, target_rate)?;

    Ok(Waveform {
        samples,
        sample_rate: target_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::io::Write;

    fn write_wav(
        path: &Path,
        samples: &[f32],
        sample_rate: u32,
        channels: u16,
    ) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for &s in samples {
            writer
                .write_sample((s * i16::MAX as f32) as i16)
                .expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn test_missing_file() {
        let result = load_waveform(Path::new("/nonexistent/clip.wav"), TARGET_SAMPLE_RATE);
        assert!(matches!(result, Err(AudioError::FileMissing(_))));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.wav");
        std::fs::File::create(&path).expect("create file");

        let result = load_waveform(&path, TARGET_SAMPLE_RATE);
        assert!(matches!(result, Err(AudioError::EmptyFile(_))));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("garbage.wav");
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(b"this is not a wav file at all")
            .expect("write");

        let result = load_waveform(&path, TARGET_SAMPLE_RATE);
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }

    #[test]
    fn test_mono_wav_at_target_rate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tone.wav");
        let samples: Vec<f32> = (0..22050)
            .map(|i| (2.0 * PI * 220.0 * i as f32 / 22050.0).sin() * 0.5)
            .collect();
        write_wav(&path, &samples, 22050, 1);

        let wave = load_waveform(&path, TARGET_SAMPLE_RATE).expect("load failed");
        assert_eq!(wave.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(wave.samples.len(), 22050);
    }

    #[test]
    fn test_stereo_44100_downmixed_and_resampled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stereo.wav");

        // Half a second of interleaved stereo at 44.1 kHz
        let frames = 22050;
        let mut interleaved = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let s = (2.0 * PI * 220.0 * i as f32 / 44100.0).sin() * 0.5;
            interleaved.push(s);
            interleaved.push(s);
        }
        write_wav(&path, &interleaved, 44100, 2);

        let wave = load_waveform(&path, TARGET_SAMPLE_RATE).expect("load failed");
        assert_eq!(wave.sample_rate, TARGET_SAMPLE_RATE);

        // 0.5 s at 22050 Hz, within 2%
        let expected = 11025.0;
        let error = (wave.samples.len() as f64 - expected).abs() / expected;
        assert!(
            error < 0.02,
            "expected ~{} samples, got {}",
            expected,
            wave.samples.len()
        );
    }
}
