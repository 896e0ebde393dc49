//! Key material generation and the provisioning bundle.
//!
//! This module provides:
//! - [`generate_challenge`], [`generate_secret`], [`generate_kek_pair`] — CSPRNG draws
//! - [`KekPair`] — the two KEK halves and their fixed combination order
//! - [`build_bundle`] — produce a complete [`ProvisioningBundle`]
//!
//! # Channel separation
//!
//! `kek_seed_half1` is imported into the device's trusted context store
//! ahead of time. `kek_seed_half2` and the encrypted pads arrive later
//! over the provisioning channel. Neither half alone unwraps the pads.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::base64_bytes;
use crate::error::CryptoError;
use crate::hmac;
use crate::memory::SecretBuffer;
use crate::pad::derive_pads;
use crate::stream;

/// Default challenge length in bytes.
pub const CHALLENGE_LEN: usize = 32;

/// Default secret length in bytes (one SHA-256 block).
pub const SECRET_LEN: usize = 64;

/// Default full KEK length in bytes (two 16-byte halves).
pub const KEK_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Random draws
// ---------------------------------------------------------------------------

fn random_vec(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))?;
    Ok(bytes)
}

/// Draw a random challenge of `len` bytes.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn generate_challenge(len: usize) -> Result<Vec<u8>, CryptoError> {
    random_vec(len)
}

/// Draw a random secret of `len` bytes.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn generate_secret(len: usize) -> Result<SecretBuffer, CryptoError> {
    SecretBuffer::random(len)
}

/// Draw a random KEK of `len` bytes and split it at `len / 2`.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` if `len < 2` (a half would be empty).
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn generate_kek_pair(len: usize) -> Result<KekPair, CryptoError> {
    if len < 2 {
        return Err(CryptoError::InvalidKey(format!(
            "KEK length {len} cannot be split into two non-empty halves"
        )));
    }
    let mut full = random_vec(len)?;
    let half2 = full.split_off(len / 2);
    Ok(KekPair::new(full, half2))
}

// ---------------------------------------------------------------------------
// KEK halves
// ---------------------------------------------------------------------------

/// The two halves of a key-encryption key.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KekPair {
    /// Retained in the trusted context store.
    pub half1: Vec<u8>,
    /// Delivered over the provisioning channel.
    pub half2: Vec<u8>,
}

impl KekPair {
    /// Pair two halves; see [`Self::combine`] for the joining order.
    #[must_use]
    pub fn new(half1: Vec<u8>, half2: Vec<u8>) -> Self {
        Self { half1, half2 }
    }

    /// The full KEK: `half1 || half2`. Order is fixed.
    #[must_use]
    pub fn combine(&self) -> SecretBuffer {
        let mut full = Vec::with_capacity(self.half1.len().saturating_add(self.half2.len()));
        full.extend_from_slice(&self.half1);
        full.extend_from_slice(&self.half2);
        let kek = SecretBuffer::new(&full);
        full.zeroize();
        kek
    }
}

impl fmt::Debug for KekPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KekPair")
            .field("half1_len", &self.half1.len())
            .field("half2_len", &self.half2.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Lengths used by [`build_bundle_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BundleParams {
    /// Challenge length in bytes.
    pub challenge_len: usize,
    /// HMAC secret length in bytes.
    pub secret_len: usize,
    /// Full KEK length in bytes, split in two halves.
    pub kek_len: usize,
}

impl Default for BundleParams {
    fn default() -> Self {
        Self {
            challenge_len: CHALLENGE_LEN,
            secret_len: SECRET_LEN,
            kek_len: KEK_LEN,
        }
    }
}

/// Everything needed to run one challenge-response verification.
///
/// Serialized as a flat JSON object with every value base64-encoded.
/// Immutable once built; zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ProvisioningBundle {
    #[serde(with = "base64_bytes")]
    pub challenge: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub secret: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub kek_seed_half1: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub kek_seed_half2: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub encrypted_ipad: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub encrypted_opad: Vec<u8>,
    /// `SHA256(opad || SHA256(ipad || challenge))`.
    #[serde(with = "base64_bytes")]
    pub response: Vec<u8>,
}

impl ProvisioningBundle {
    /// Assemble a bundle from fixed inputs.
    ///
    /// Derives the pads from `secret`, computes the response over
    /// `challenge`, and wraps each pad under `kek.combine()` with a fresh
    /// keystream.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` if the combined KEK is empty.
    pub fn from_parts(
        challenge: &[u8],
        secret: &[u8],
        kek: &KekPair,
    ) -> Result<Self, CryptoError> {
        let pads = derive_pads(secret);
        let response = hmac::compute(&pads.ipad, &pads.opad, challenge);

        let full_kek = kek.combine();
        let encrypted_ipad = stream::apply(full_kek.expose(), &pads.ipad)?;
        let encrypted_opad = stream::apply(full_kek.expose(), &pads.opad)?;

        Ok(Self {
            challenge: challenge.to_vec(),
            secret: secret.to_vec(),
            kek_seed_half1: kek.half1.clone(),
            kek_seed_half2: kek.half2.clone(),
            encrypted_ipad,
            encrypted_opad,
            response: response.to_vec(),
        })
    }

    /// The KEK halves as carried in this bundle.
    #[must_use]
    pub fn kek_pair(&self) -> KekPair {
        KekPair::new(self.kek_seed_half1.clone(), self.kek_seed_half2.clone())
    }

    /// Recompute the response from the stored secret and challenge.
    ///
    /// Generator-side sanity check; the device never sees the secret.
    #[must_use]
    pub fn self_verify(&self) -> bool {
        let pads = derive_pads(&self.secret);
        let expected = hmac::compute(&pads.ipad, &pads.opad, &self.challenge);
        hmac::constant_time_eq(&expected, &self.response)
    }

    /// Pretty JSON in the bundle file format.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, CryptoError> {
        serde_json::to_string_pretty(self).map_err(|e| CryptoError::Serialization(e.to_string()))
    }

    /// Parse a bundle from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` for malformed JSON, missing
    /// keys, or values that are not valid base64.
    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        serde_json::from_str(json).map_err(|e| CryptoError::Serialization(e.to_string()))
    }

    /// Read a bundle file.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Io` if the file cannot be read, or
    /// `CryptoError::Serialization` if it does not parse.
    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the bundle to `path`.
    ///
    /// Atomic write pattern (write to a sibling `.tmp`, then rename). The
    /// file holds the secret, so it is owner-only on Unix.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Io` if the write or rename fails.
    pub fn save(&self, path: &Path) -> Result<(), CryptoError> {
        let json = self.to_json_pretty()?;
        let file_name = path
            .file_name()
            .map_or_else(|| "bundle".into(), |n| n.to_string_lossy().into_owned());
        let tmp = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl fmt::Debug for ProvisioningBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningBundle")
            .field("challenge_len", &self.challenge.len())
            .field("secret", &"***")
            .field("kek_seed_half1_len", &self.kek_seed_half1.len())
            .field("kek_seed_half2_len", &self.kek_seed_half2.len())
            .field("encrypted_ipad_len", &self.encrypted_ipad.len())
            .field("encrypted_opad_len", &self.encrypted_opad.len())
            .finish_non_exhaustive()
    }
}

/// Build a bundle with the default lengths (32-byte challenge, 64-byte
/// secret, 32-byte KEK).
///
/// # Errors
///
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn build_bundle() -> Result<ProvisioningBundle, CryptoError> {
    build_bundle_with(&BundleParams::default())
}

/// Build a bundle with custom lengths.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` if `params.kek_len < 2`.
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn build_bundle_with(params: &BundleParams) -> Result<ProvisioningBundle, CryptoError> {
    let challenge = generate_challenge(params.challenge_len)?;
    let secret = generate_secret(params.secret_len)?;
    let kek = generate_kek_pair(params.kek_len)?;
    ProvisioningBundle::from_parts(&challenge, secret.expose(), &kek)
}
