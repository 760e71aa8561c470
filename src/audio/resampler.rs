//! Whole-clip resampling to the analysis sample rate.

use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use super::AudioError;

/// Input chunk size fed to the FFT resampler
const CHUNK_FRAMES: usize = 1024;

/// Extra zero chunks fed after the input to flush the resampler's latency
const MAX_FLUSH_CHUNKS: usize = 8;

/// Resample a mono clip from `source_rate` to `target_rate`.
///
/// The clip is processed in fixed-size chunks with a zero-padded tail, then
/// trimmed to the rate-scaled length. Returns the input unchanged when the
/// rates already match.
pub fn resample_clip(
    input: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    if source_rate == target_rate {
        return Ok(input.to_vec());
    }

    debug!(
        "resampling clip: {} Hz -> {} Hz ({} samples)",
        source_rate,
        target_rate,
        input.len()
    );

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_FRAMES,
        2, // sub_chunks for quality
        1, // mono
    )
    .map_err(|e| AudioError::Decode(format!("failed to create resampler: {e}")))?;

    let expected_len =
        (input.len() as u64 * target_rate as u64 / source_rate as u64) as usize;

    let mut input_buffer = vec![vec![0.0f32; CHUNK_FRAMES]; 1];
    let mut output_buffer = resampler.output_buffer_allocate(true);
    let mut output = Vec::with_capacity(expected_len + CHUNK_FRAMES);

    let mut chunks = input.chunks(CHUNK_FRAMES);
    let mut flush_remaining = MAX_FLUSH_CHUNKS;

    loop {
        match chunks.next() {
            Some(chunk) => {
                input_buffer[0][..chunk.len()].copy_from_slice(chunk);
                input_buffer[0][chunk.len()..].fill(0.0);
            }
            None => {
                // Keep feeding silence until the delayed tail has drained
                if output.len() >= expected_len || flush_remaining == 0 {
                    break;
                }
                input_buffer[0].fill(0.0);
                flush_remaining -= 1;
            }
        }

        let (_, frames_out) = resampler
            .process_into_buffer(&input_buffer, &mut output_buffer, None)
            .map_err(|e| AudioError::Decode(format!("resampling failed: {e}")))?;
        output.extend_from_slice(&output_buffer[0][..frames_out]);
    }

    output.truncate(expected_len);
    if output.is_empty() {
        return Err(AudioError::Decode(
            "resampler produced no output".to_string(),
        ));
    }

    Ok(output)
}
