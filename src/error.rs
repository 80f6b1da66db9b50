//! Custom error types for envelope-crypt
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// Message shared by every failure that happens after the key is applied.
///
/// Padding and UTF-8 failures render identically so that callers relaying
/// the message cannot be used as a padding oracle.
const DECRYPTION_FAILED: &str = "Decryption failed: invalid passphrase or corrupted data";

/// The main error type for envelope-crypt operations
#[derive(Error, Debug)]
pub enum CryptError {
    /// The operating system's secure random generator could not be read
    #[error("Secure random source unavailable")]
    EntropySourceUnavailable,

    /// The envelope text is not valid base64 or is too short to hold a header
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Decryption produced invalid padding or failed authentication
    #[error("{}", DECRYPTION_FAILED)]
    CryptoFailure,

    /// Decrypted bytes are not valid UTF-8
    #[error("{}", DECRYPTION_FAILED)]
    Encoding,

    /// Envelope carries a version marker this build does not understand
    #[error("Unsupported envelope format: {0}")]
    UnsupportedFormat(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl CryptError {
    /// Check if this error came from applying a key to ciphertext
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::CryptoFailure | Self::Encoding)
    }

    /// Check if this error is a malformed envelope error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEnvelope(_))
    }
}

impl From<std::io::Error> for CryptError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CryptError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for envelope-crypt operations
pub type CryptResult<T> = Result<T, CryptError>;
