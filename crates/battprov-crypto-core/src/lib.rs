//! `battprov-crypto-core` — Challenge-response provisioning primitives.
//!
//! This crate is the audit target: zero network, zero async, zero file
//! system access outside the bundle import/export helpers.
//!
//! The protocol pieces, leaf first:
//! - [`pad`] — fixed-width key padding and the HMAC inner/outer pads
//! - [`hmac`] — the explicit two-hash HMAC-SHA256 over caller-supplied pads
//! - [`stream`] — the self-inverse stream cipher that wraps the pads under a KEK
//! - [`keygen`] — random material and the [`ProvisioningBundle`]

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod encoding;

pub mod hmac;
pub mod pad;
pub mod stream;

pub mod keygen;

pub use encoding::{
    decode_base64, decode_hex, decode_hex_or_base64, encode_base64, encode_hex,
};
pub use error::CryptoError;
pub use hmac::{constant_time_eq, Digest, DIGEST_LEN};
pub use keygen::{
    build_bundle, build_bundle_with, generate_challenge, generate_kek_pair, generate_secret,
    BundleParams, KekPair, ProvisioningBundle, CHALLENGE_LEN, KEK_LEN, SECRET_LEN,
};
pub use memory::SecretBuffer;
pub use pad::{derive_pads, pad_key, xor_bytes, PadPair, BLOCK_SIZE, IPAD_BYTE, OPAD_BYTE};
