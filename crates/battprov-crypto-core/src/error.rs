//! Cryptographic error types for `battprov-crypto-core`.

use thiserror::Error;

/// Errors produced by provisioning primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material unusable by the operation (empty stream-cipher key,
    /// KEK too short to split into two non-empty halves).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Malformed base64 or hex at an encoding boundary.
    #[error("decode error: {0}")]
    Decode(String),

    /// The operating system CSPRNG failed to produce bytes.
    #[error("random generation failed: {0}")]
    Random(String),

    /// Bundle JSON could not be produced or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while reading or writing a bundle file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
