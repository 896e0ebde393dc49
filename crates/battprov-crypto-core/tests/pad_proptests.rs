#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for key padding and pad-based HMAC.

use battprov_crypto_core::hmac::compute;
use battprov_crypto_core::{derive_pads, pad_key, BLOCK_SIZE};
use proptest::prelude::*;
use ring::hmac as ring_hmac;

proptest! {
    /// pad_key output is always one block; short secrets are a prefix
    /// followed by zeros.
    #[test]
    fn pad_key_is_block_sized(secret in proptest::collection::vec(any::<u8>(), 0..200)) {
        let padded = pad_key(&secret);
        prop_assert_eq!(padded.len(), BLOCK_SIZE);
        let kept = secret.len().min(BLOCK_SIZE);
        prop_assert_eq!(&padded[..kept], &secret[..kept]);
        prop_assert!(padded[kept..].iter().all(|&b| b == 0));
    }

    /// The pad construction is deterministic.
    #[test]
    fn hmac_is_deterministic(
        secret in proptest::collection::vec(any::<u8>(), 0..64),
        message in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let pads = derive_pads(&secret);
        prop_assert_eq!(
            compute(&pads.ipad, &pads.opad, &message),
            compute(&pads.ipad, &pads.opad, &message)
        );
    }

    /// For secrets up to one block, the explicit construction equals
    /// standard HMAC-SHA256.
    #[test]
    fn hmac_matches_ring_for_short_keys(
        secret in proptest::collection::vec(any::<u8>(), 0..=64),
        message in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let pads = derive_pads(&secret);
        let ours = compute(&pads.ipad, &pads.opad, &message);
        let key = ring_hmac::Key::new(ring_hmac::HMAC_SHA256, &secret);
        let reference = ring_hmac::sign(&key, &message);
        prop_assert_eq!(ours.as_slice(), reference.as_ref());
    }
}
