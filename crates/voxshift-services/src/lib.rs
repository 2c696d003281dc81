//! voxshift-services: Decoding, session state, and export around the core pipeline

pub mod decoder;
mod error;
pub mod export;
pub mod session;

pub use decoder::{decode_wav_bytes, decode_wav_file, is_audio_media_type};
pub use error::{Result, ServiceError};
pub use export::{download_filename, export_clip, timestamp_label};
pub use session::{EffectOutcome, VoiceSession};
