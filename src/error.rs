//! # Error Types
//!
//! Custom error types for Rover Console using `thiserror`.

use thiserror::Error;

/// Main error type for Rover Console
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wire frame errors (unknown shape, missing fields)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Input event carried no usable pointer data (e.g. zero touch points)
    #[error("Input data missing: {0}")]
    InputDataMissing(&'static str),

    /// Layout query failed or produced an unusable geometry
    #[error("Geometry unavailable: {0}")]
    GeometryUnavailable(String),

    /// Outbound channel is no longer accepting frames
    #[error("Channel closed")]
    ChannelClosed,

    /// Outbound queue is full; the peer is not keeping up
    #[error("Outbound queue full ({0} frames)")]
    QueueFull(usize),
}

/// Result type alias for Rover Console
pub type Result<T> = std::result::Result<T, ConsoleError>;
