//! RC4-style stream cipher used to wrap the HMAC pads under the KEK.
//!
//! Encryption and decryption are the same operation: [`apply`] XORs the
//! data with a keystream that depends only on the key, so applying it
//! twice with the same key returns the original bytes.
//!
//! The cipher is fixed by the provisioning protocol. It offers no
//! integrity: a wrong KEK yields wrong pads, which surface later as a
//! response mismatch.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Keystream generator state: a byte permutation plus two indices.
#[derive(Zeroize, ZeroizeOnDrop)]
struct KeyStream {
    state: [u8; 256],
    i: u8,
    j: u8,
}

impl KeyStream {
    /// Key schedule: 256 rounds mixing key bytes cyclically into the
    /// identity permutation.
    fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.is_empty() {
            return Err(CryptoError::InvalidKey(
                "stream cipher key must be at least 1 byte".into(),
            ));
        }

        let mut state = [0u8; 256];
        for (slot, value) in state.iter_mut().zip(0..=u8::MAX) {
            *slot = value;
        }

        let mut j = 0u8;
        for (i, &k) in (0..=u8::MAX).zip(key.iter().cycle()) {
            j = j.wrapping_add(state[usize::from(i)]).wrapping_add(k);
            state.swap(usize::from(i), usize::from(j));
        }

        Ok(Self { state, i: 0, j: 0 })
    }

    /// Generation phase: advance both indices, swap, emit one byte.
    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[usize::from(self.i)]);
        self.state.swap(usize::from(self.i), usize::from(self.j));
        let idx = self.state[usize::from(self.i)].wrapping_add(self.state[usize::from(self.j)]);
        self.state[usize::from(idx)]
    }
}

/// Encrypt or decrypt `data` under `key`.
///
/// Output has the same length as `data`. Each call starts a fresh
/// keystream, so the two pads are wrapped independently under one KEK.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` if `key` is empty.
pub fn apply(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut stream = KeyStream::new(key)?;
    Ok(data.iter().map(|&b| b ^ stream.next_byte()).collect())
}
