//! Error types for voxshift services

use thiserror::Error;
use voxshift_core::VoxError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Vox(#[from] VoxError),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),
    #[error("No audio loaded; record or load a clip first")]
    NoClip,
    #[error("Already recording")]
    AlreadyRecording,
    #[error("Not recording")]
    NotRecording,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
