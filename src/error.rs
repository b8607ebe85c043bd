//! # Error Types
//!
//! Errors from the layers around the decoder. Decoding itself never fails:
//! malformed input degrades to command blocks or a trailing remainder.

use thiserror::Error;

/// Main error type for virtual printer operations
#[derive(Debug, Error)]
pub enum PrinterError {
    /// Transport-level errors (bind, accept, connection)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed ePOS-Print request
    #[error("ePOS request error: {0}")]
    Epos(String),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
