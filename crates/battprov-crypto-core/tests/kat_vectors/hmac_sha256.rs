//! RFC 4231 HMAC-SHA256 vectors run through the explicit-pad construction.
//!
//! Both keys are shorter than one block, so `pad_key` zero-extends them
//! exactly as RFC 2104 does and the two-hash construction must agree with
//! the published MAC.

use battprov_crypto_core::hmac::compute;
use battprov_crypto_core::{decode_hex, derive_pads, encode_hex};

/// RFC 4231 test case 1.
#[test]
fn rfc4231_case_1() {
    let key = [0x0bu8; 20];
    let pads = derive_pads(&key);
    let mac = compute(&pads.ipad, &pads.opad, b"Hi There");
    assert_eq!(
        encode_hex(&mac),
        "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
    );
}

/// RFC 4231 test case 2.
#[test]
fn rfc4231_case_2() {
    let pads = derive_pads(b"Jefe");
    let mac = compute(&pads.ipad, &pads.opad, b"what do ya want for nothing?");
    assert_eq!(
        encode_hex(&mac),
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );
}

/// Pads supplied as raw bytes, without going through `derive_pads`.
#[test]
fn explicit_constant_pads() {
    let ipad = [0x36u8; 64];
    let opad = [0x5cu8; 64];
    let from_pads = compute(&ipad, &opad, b"challenge");
    let derived = derive_pads(&[]);
    assert_eq!(from_pads, compute(&derived.ipad, &derived.opad, b"challenge"));
    assert_eq!(decode_hex(&encode_hex(&from_pads)).unwrap(), from_pads);
}
