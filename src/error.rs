//! Error types for parakeet

use thiserror::Error;

/// Result type alias for parakeet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in parakeet
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Weather lookup error
    #[error("weather error: {0}")]
    Weather(String),

    /// Chat-completion error
    #[error("completion error: {0}")]
    Completion(String),

    /// Voice connection/playback error
    #[error("voice error: {0}")]
    Voice(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
