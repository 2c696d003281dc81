//! 16-bit PCM RIFF/WAVE encoder

use crate::buffer::SampleBuffer;
use crate::error::{Result, VoxError};

pub const WAV_MEDIA_TYPE: &str = "audio/wav";
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = 2;
const FORMAT_PCM: u16 = 1;

/// Encoded audio bytes tagged with their media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    bytes: Vec<u8>,
    media_type: String,
}

impl EncodedAudio {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self { bytes, media_type: media_type.into() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Convert a float sample to signed 16-bit.
///
/// Negative samples scale by 32768 and non-negative ones by 32767, so both
/// -1.0 and 1.0 map to the ends of the i16 range.
pub fn quantize_sample(sample: f32) -> i16 {
    if sample < 0.0 {
        (sample * 32768.0).round().max(-32768.0) as i16
    } else {
        (sample * 32767.0).round().min(32767.0) as i16
    }
}

/// Serialize `buffer` as a canonical 44-byte-header PCM WAV, 16 bits per
/// sample, channels interleaved frame by frame.
pub fn encode_to_container(buffer: &SampleBuffer) -> Result<EncodedAudio> {
    let channels = buffer.channel_count();
    if channels == 0 {
        return Err(VoxError::Encoding("buffer has no channels".into()));
    }
    // BlockAlign is a u16 too, so the limit is u16::MAX / 2 channels
    let (num_channels, block_align) = u16::try_from(channels)
        .ok()
        .and_then(|n| Some((n, n.checked_mul(BYTES_PER_SAMPLE as u16)?)))
        .ok_or_else(|| VoxError::Encoding(format!("{channels} channels exceeds the WAV limit")))?;

    let frames = buffer.frame_count();
    let data_bytes = frames
        .checked_mul(channels * BYTES_PER_SAMPLE)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| VoxError::Encoding(format!("{frames} frames does not fit a WAV data chunk")))?;

    let sample_rate = buffer.sample_rate();
    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .ok_or_else(|| VoxError::Encoding(format!("sample rate {sample_rate} too high")))?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_bytes as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_bytes).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_bytes.to_le_bytes());

    let planes = buffer.channels();
    for i in 0..frames {
        for plane in planes {
            out.extend_from_slice(&quantize_sample(plane[i]).to_le_bytes());
        }
    }

    Ok(EncodedAudio::new(out, WAV_MEDIA_TYPE))
}
