//! HMAC-SHA256 built from explicit inner and outer pads.
//!
//! `ring::hmac` takes a key and derives the pads internally. Here the pads
//! are first-class values: they are produced by [`crate::pad::derive_pads`],
//! wrapped under the KEK, shipped to the device, unwrapped, and only then
//! fed into [`compute`]. The two SHA-256 invocations are part of the
//! protocol contract:
//!
//! ```text
//! response = SHA256(opad || SHA256(ipad || message))
//! ```

use ring::digest;

/// SHA-256 output length in bytes.
pub const DIGEST_LEN: usize = 32;

/// A SHA-256 digest.
pub type Digest = [u8; DIGEST_LEN];

fn sha256_concat(prefix: &[u8], suffix: &[u8]) -> Digest {
    let mut ctx = digest::Context::new(&digest::SHA256);
    ctx.update(prefix);
    ctx.update(suffix);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(ctx.finish().as_ref());
    out
}

/// Compute `SHA256(opad || SHA256(ipad || message))`.
///
/// Pads of any length are accepted; the protocol always supplies 64-byte
/// pads, but a device that decrypted garbage must still produce a digest
/// so the mismatch can be reported.
#[must_use]
pub fn compute(ipad: &[u8], opad: &[u8], message: &[u8]) -> Digest {
    let inner = sha256_concat(ipad, message);
    sha256_concat(opad, &inner)
}

/// Constant-time byte comparison for digests.
///
/// Returns `true` iff both slices have equal length and identical contents.
/// The length check short-circuits: digest length is public.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
