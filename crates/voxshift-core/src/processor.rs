//! Effect application: nearest-neighbor resample, fixed gain, single echo tap

use crate::buffer::SampleBuffer;
use crate::error::{Result, VoxError};
use crate::preset::EffectPreset;

/// Gain applied to every resampled sample
pub const OUTPUT_GAIN: f32 = 0.8;

/// Echo tap delay, independent of the preset
pub const ECHO_DELAY_MS: u64 = 300;

/// Most 16-bit samples a WAV data chunk can hold
const MAX_OUTPUT_SAMPLES: f64 = ((u32::MAX - 36) / 2) as f64;

/// Apply `preset` to `buffer`, returning a new buffer.
///
/// Output length is `floor(frames / speed_factor)`. Each output sample `i`
/// reads input `floor(i * pitch_factor)` (silence past the end) scaled by
/// [`OUTPUT_GAIN`]. When `echo_mix > 0`, the resampled signal delayed by
/// [`ECHO_DELAY_MS`] is mixed in once and the sum clamped to `[-1, 1]`.
/// Output too long for a 16-bit WAV data chunk is rejected.
pub fn apply_effect(buffer: &SampleBuffer, preset: &EffectPreset) -> Result<SampleBuffer> {
    if buffer.channel_count() == 0 {
        return Err(VoxError::InvalidInput("buffer has no channels".into()));
    }
    let input_frames = buffer.frame_count();
    if input_frames == 0 {
        return Err(VoxError::InvalidInput("buffer has no frames".into()));
    }
    preset.validate()?;

    let output_len = (input_frames as f64 / preset.speed_factor).floor();
    if output_len * buffer.channel_count() as f64 > MAX_OUTPUT_SAMPLES {
        return Err(VoxError::InvalidInput(format!(
            "{input_frames} frames at speed {} is too long to encode",
            preset.speed_factor
        )));
    }
    let output_frames = output_len as usize;
    if output_frames == 0 {
        return Err(VoxError::InvalidInput(format!(
            "{input_frames} frames at speed {} leaves no output",
            preset.speed_factor
        )));
    }

    let delay = echo_delay_frames(buffer.sample_rate());
    let echo_mix = preset.echo_mix as f32;

    let channels = buffer
        .channels()
        .iter()
        .map(|input| {
            let mut out = resample(input, output_frames, preset.pitch_factor);
            if echo_mix > 0.0 {
                add_echo(&mut out, delay, echo_mix);
            }
            out
        })
        .collect();

    SampleBuffer::new(channels, buffer.sample_rate())
}

/// Frames in the echo delay, `floor(0.3 * sample_rate)`
pub fn echo_delay_frames(sample_rate: u32) -> usize {
    (sample_rate as u64 * ECHO_DELAY_MS / 1000) as usize
}

fn resample(input: &[f32], output_frames: usize, pitch_factor: f64) -> Vec<f32> {
    (0..output_frames)
        .map(|i| {
            let source = (i as f64 * pitch_factor).floor() as usize;
            input.get(source).map_or(0.0, |s| s * OUTPUT_GAIN)
        })
        .collect()
}

// Walk backwards so `samples[i - delay]` still holds the dry value when read.
fn add_echo(samples: &mut [f32], delay: usize, mix: f32) {
    for i in (delay..samples.len()).rev() {
        let wet = samples[i] + mix * samples[i - delay];
        samples[i] = wet.clamp(-1.0, 1.0);
    }
}
