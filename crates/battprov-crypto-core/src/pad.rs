//! Key padding and HMAC pad derivation.
//!
//! The provisioning protocol never hands the secret itself to the device.
//! Instead the secret is padded to one SHA-256 block and folded into the
//! two HMAC pads, which are then wrapped under the KEK:
//!
//! ```text
//! ipad = pad_key(secret) XOR 0x36 * 64
//! opad = pad_key(secret) XOR 0x5c * 64
//! ```

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// SHA-256 block size in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Inner pad constant.
pub const IPAD_BYTE: u8 = 0x36;

/// Outer pad constant.
pub const OPAD_BYTE: u8 = 0x5c;

/// Inner and outer HMAC pads derived from one secret.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PadPair {
    /// `pad_key(secret) XOR 0x36` repeated.
    pub ipad: [u8; BLOCK_SIZE],
    /// `pad_key(secret) XOR 0x5c` repeated.
    pub opad: [u8; BLOCK_SIZE],
}

impl fmt::Debug for PadPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PadPair(***)")
    }
}

/// Right-pad `secret` with zero bytes to exactly [`BLOCK_SIZE`] bytes.
///
/// Secrets longer than one block are truncated, not hashed.
#[must_use]
pub fn pad_key(secret: &[u8]) -> [u8; BLOCK_SIZE] {
    let mut padded = [0u8; BLOCK_SIZE];
    let take = secret.len().min(BLOCK_SIZE);
    padded[..take].copy_from_slice(&secret[..take]);
    padded
}

/// Byte-wise XOR over the common prefix of `a` and `b`.
#[must_use]
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

fn xor_block(block: &[u8; BLOCK_SIZE], byte: u8) -> [u8; BLOCK_SIZE] {
    let mut out = *block;
    for b in &mut out {
        *b ^= byte;
    }
    out
}

/// Derive the inner and outer pads for `secret`.
#[must_use]
pub fn derive_pads(secret: &[u8]) -> PadPair {
    let mut padded = pad_key(secret);
    let pads = PadPair {
        ipad: xor_block(&padded, IPAD_BYTE),
        opad: xor_block(&padded, OPAD_BYTE),
    };
    padded.zeroize();
    pads
}
