//! Planar multi-channel sample storage

use crate::error::{Result, VoxError};

/// Decoded audio: one `Vec<f32>` per channel, all of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// Fails if the sample rate is zero or the channels differ in length.
    /// A buffer with no channels is allowed here; effect application and
    /// encoding reject it themselves.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(VoxError::InvalidInput("sample rate must be positive".into()));
        }
        if let Some(first) = channels.first() {
            let frames = first.len();
            if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, ch)| ch.len() != frames) {
                return Err(VoxError::InvalidInput(format!(
                    "channel {idx} has {} frames, expected {frames}",
                    ch.len()
                )));
            }
        }
        Ok(Self { channels, sample_rate })
    }

    /// Single-channel convenience constructor
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Split interleaved samples (frame-major) into planar channels.
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(VoxError::InvalidInput("channel count must be positive".into()));
        }
        let n = channels as usize;
        let frames = samples.len() / n;
        let mut planar = vec![Vec::with_capacity(frames); n];
        for frame in samples.chunks_exact(n) {
            for (ch, &s) in planar.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self::new(planar, sample_rate)
    }

    /// Interleave channels back into one frame-major vector
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count() * self.channel_count());
        for i in 0..self.frame_count() {
            out.extend(self.channels.iter().map(|ch| ch[i]));
        }
        out
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() || self.frame_count() == 0
    }
}
