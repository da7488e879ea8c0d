//! Error types for the filetriage identification pipeline.
//!
//! Refiners and parsers return structured errors through `Result`; the
//! public classification entry points absorb them so that a malformed file
//! degrades to a less specific tag instead of failing the call.

use thiserror::Error;

/// Main error type for identification operations.
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Input is not the format a probe expected
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Parse error with location information
    #[error("Parse error at offset {offset:#x}: {message}")]
    ParseError { offset: u64, message: String },

    /// Signature scanner failure
    #[error("Scanner error: {0}")]
    Scanner(String),

    /// Archive listing failure (zip reader and fallback)
    #[error("Archive error: {0}")]
    Archive(String),

    /// Container wrapper (CaRT) could not be opened
    #[error("Container error: {0}")]
    Container(String),

    /// Invalid configuration or static table
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<zip::result::ZipError> for IdentifyError {
    fn from(err: zip::result::ZipError) -> Self {
        IdentifyError::Archive(err.to_string())
    }
}

impl From<serde_json::Error> for IdentifyError {
    fn from(err: serde_json::Error) -> Self {
        IdentifyError::Serialization(err.to_string())
    }
}

/// Result type alias for identification operations
pub type Result<T> = std::result::Result<T, IdentifyError>;
