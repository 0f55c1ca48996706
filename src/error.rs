//! Error types for auricle

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuricleError {
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HRTF error: {0}")]
    Hrtf(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, AuricleError>;
