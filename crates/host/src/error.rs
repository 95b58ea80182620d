use smartpt_core::align::AlignError;
use smartpt_core::protocol::DecodeError;

use crate::link::InvalidTransition;

/// Errors raised by the host link client and submission pipeline.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Not connected to a sensor node")]
    NotConnected,

    #[error("Timeout waiting for ACK after {0} ms")]
    AckTimeout(u64),

    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(DecodeError),

    #[error("Alignment error: {0}")]
    Align(AlignError),

    #[error("Invalid link transition: {0}")]
    InvalidTransition(#[from] InvalidTransition),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// The core error types are `no_std` and do not implement `std::error::Error`,
// so they are carried without a source chain.
impl From<DecodeError> for HostError {
    fn from(e: DecodeError) -> Self {
        HostError::Decode(e)
    }
}

impl From<AlignError> for HostError {
    fn from(e: AlignError) -> Self {
        HostError::Align(e)
    }
}
