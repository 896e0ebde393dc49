//! Secret-holding buffer for the provisioning secret.
//!
//! [`SecretBuffer`] wraps [`SecretSlice<u8>`] from the `secrecy` crate:
//! - bytes are zeroized on drop
//! - `Debug`/`Display` never print the contents

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::Zeroize;

/// Variable-length buffer for sensitive data.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
}

impl SecretBuffer {
    /// Copy `data` into a new secret allocation.
    ///
    /// The caller should zeroize the source data after calling this.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Create a `SecretBuffer` filled with `len` bytes from `OsRng`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn random(len: usize) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))?;
        let result = Self::new(&bytes);
        bytes.zeroize();
        Ok(result)
    }

    /// Expose the underlying bytes. Keep the borrow short.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Returns the number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Returns `true` if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for SecretBuffer {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}
