//! voxshift-core: Sample buffers, voice presets, and the effect/encode pipeline

mod buffer;
mod error;
pub mod preset;
pub mod processor;
pub mod wav;

pub use buffer::SampleBuffer;
pub use error::{Result, VoxError};
pub use preset::{EffectKind, EffectPreset};
pub use processor::{apply_effect, echo_delay_frames, ECHO_DELAY_MS, OUTPUT_GAIN};
pub use wav::{encode_to_container, quantize_sample, EncodedAudio, WAV_HEADER_LEN, WAV_MEDIA_TYPE};
