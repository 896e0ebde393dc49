//! Published RC4 test vectors.
//!
//! The same vectors appear in most RC4 references; the first is the one the
//! provisioning tooling was checked against.

use battprov_crypto_core::stream::apply;
use battprov_crypto_core::{decode_hex, encode_hex};

fn check(key: &[u8], plaintext: &[u8], expected_hex: &str) {
    let ciphertext = apply(key, plaintext).expect("non-empty key");
    assert_eq!(encode_hex(&ciphertext), expected_hex.to_lowercase());
    let decrypted = apply(key, &ciphertext).expect("non-empty key");
    assert_eq!(decrypted, plaintext, "decryption must restore plaintext");
}

/// Key = "Key", plaintext = "Plaintext".
#[test]
fn key_plaintext() {
    check(b"Key", b"Plaintext", "BBF316E8D940AF0AD3");
}

/// Key = "Wiki", plaintext = "pedia".
#[test]
fn wiki_pedia() {
    check(b"Wiki", b"pedia", "1021BF0420");
}

/// Key = "Secret", plaintext = "Attack at dawn".
#[test]
fn secret_attack_at_dawn() {
    check(b"Secret", b"Attack at dawn", "45A01F645FC35B383552544B9BF5");
}

/// Key bytes written as hex, as they appear in the bundle diagnostics.
#[test]
fn hex_key_input() {
    let key = decode_hex("4b6579").unwrap();
    let plaintext = decode_hex("506c61696e74657874").unwrap();
    check(&key, &plaintext, "bbf316e8d940af0ad3");
}
