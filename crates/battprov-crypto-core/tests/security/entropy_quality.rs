//! Entropy smoke tests for generated key material.
//!
//! Shannon entropy of uniform random bytes approaches 8.0 bits/byte only
//! for large samples. The thresholds here catch degenerate output
//! (all-zeros, short repeating patterns) without flaking on natural
//! variance:
//!
//! | Sample size | Expected entropy | Threshold |
//! |-------------|------------------|-----------|
//! | 32 bytes    | ~4.88            | 4.0       |
//! | 64 bytes    | ~5.75            | 5.0       |
//! | 4 KB        | ~7.95            | 7.8       |

use battprov_crypto_core::{generate_challenge, generate_kek_pair, generate_secret};

#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[test]
fn challenge_entropy() {
    let challenge = generate_challenge(32).unwrap();
    let h = shannon_entropy(&challenge);
    assert!(h > 4.0, "32-byte challenge entropy {h:.3} too low");
}

#[test]
fn secret_entropy() {
    let secret = generate_secret(64).unwrap();
    let h = shannon_entropy(secret.expose());
    assert!(h > 5.0, "64-byte secret entropy {h:.3} too low");
}

#[test]
fn large_secret_entropy() {
    let secret = generate_secret(4096).unwrap();
    let h = shannon_entropy(secret.expose());
    assert!(h > 7.8, "4 KB secret entropy {h:.3} too low");
}

#[test]
fn kek_halves_are_not_equal() {
    let kek = generate_kek_pair(32).unwrap();
    assert_ne!(kek.half1, kek.half2);
}

#[test]
fn shannon_entropy_of_constant_is_zero() {
    assert!(shannon_entropy(&[0u8; 64]).abs() < f64::EPSILON);
}
