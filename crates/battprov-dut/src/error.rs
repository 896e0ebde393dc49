//! Device-side error types for `battprov-dut`.

use thiserror::Error;

use battprov_crypto_core::CryptoError;

use crate::context::ContextField;

/// Errors produced while accumulating or verifying a provisioning context.
///
/// A response mismatch is not an error: it is reported through
/// [`crate::VerificationReport::success`].
#[derive(Debug, Error)]
pub enum DutError {
    /// Primitive-level failure (empty KEK, CSPRNG).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Verification attempted before every required field was provisioned.
    #[error("missing provisioning field: {0}")]
    MissingField(ContextField),

    /// A provisioned value is not valid base64/hex.
    #[error("cannot decode {field}: {reason}")]
    Decode {
        /// The context field holding the bad value.
        field: ContextField,
        /// Decoder message.
        reason: String,
    },

    /// Command name not recognized.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A set-command was issued without its value.
    #[error("command {0} requires a value")]
    MissingArgument(String),

    /// Context or report JSON could not be written.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A concurrent writer panicked while holding the context lock.
    #[error("context store lock poisoned")]
    LockPoisoned,

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DutError {
    pub(crate) fn decode(field: ContextField, err: &CryptoError) -> Self {
        let reason = match err {
            CryptoError::Decode(msg) => msg.clone(),
            other => other.to_string(),
        };
        Self::Decode { field, reason }
    }
}
