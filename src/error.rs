//! Error types for Herald gateway

use thiserror::Error;

use crate::transcribe::Verdict;

/// Result type alias for Herald operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an uploaded clip is rejected before any engine runs
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAudio {
    /// Clip is below the minimum-viable-audio floor
    #[error("audio clip too small ({size} bytes, minimum {min})")]
    TooSmall { size: usize, min: usize },

    /// Clip header could not be read back
    #[error("audio clip unreadable")]
    Unreadable,
}

/// Errors that can occur in Herald gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Uploaded audio rejected before transcription
    #[error("invalid audio: {0}")]
    InvalidAudio(#[from] InvalidAudio),

    /// Audio conversion failed (recoverable; the raw clip is used instead)
    #[error("audio conversion failed: {0}")]
    Conversion(String),

    /// Speech engine call failed
    #[error("engine error: {0}")]
    Engine(String),

    /// Both engines exhausted or gated
    #[error("no speech detected{}", .reason.map(|r| format!(" ({})", r.reason())).unwrap_or_default())]
    NoSpeech {
        /// Quality verdict from the last rejected candidate, if any
        reason: Option<Verdict>,
    },

    /// Text-generation gateway unreachable or returned an unusable status
    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// App launch failed
    #[error("launch failed: {0}")]
    Launch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
