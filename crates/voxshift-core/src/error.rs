//! Error types for voxshift

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VoxError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, VoxError>;
