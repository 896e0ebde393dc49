//! One KEK half is not enough to unwrap the pads.

use battprov_crypto_core::stream::apply;
use battprov_crypto_core::{build_bundle, derive_pads, KekPair};

#[test]
fn half1_alone_does_not_unwrap_ipad() {
    let bundle = build_bundle().unwrap();
    let pads = derive_pads(&bundle.secret);
    let attempt = apply(&bundle.kek_seed_half1, &bundle.encrypted_ipad).unwrap();
    assert_ne!(attempt.as_slice(), pads.ipad.as_slice());
}

#[test]
fn half2_alone_does_not_unwrap_opad() {
    let bundle = build_bundle().unwrap();
    let pads = derive_pads(&bundle.secret);
    let attempt = apply(&bundle.kek_seed_half2, &bundle.encrypted_opad).unwrap();
    assert_ne!(attempt.as_slice(), pads.opad.as_slice());
}

#[test]
fn reversed_half_order_does_not_unwrap() {
    let bundle = build_bundle().unwrap();
    let pads = derive_pads(&bundle.secret);
    let reversed = KekPair::new(bundle.kek_seed_half2.clone(), bundle.kek_seed_half1.clone());
    let attempt = apply(reversed.combine().expose(), &bundle.encrypted_ipad).unwrap();
    assert_ne!(attempt.as_slice(), pads.ipad.as_slice());
}

#[test]
fn full_kek_unwraps_both_pads() {
    let bundle = build_bundle().unwrap();
    let pads = derive_pads(&bundle.secret);
    let kek = bundle.kek_pair().combine();
    assert_eq!(
        apply(kek.expose(), &bundle.encrypted_ipad).unwrap().as_slice(),
        pads.ipad.as_slice()
    );
    assert_eq!(
        apply(kek.expose(), &bundle.encrypted_opad).unwrap().as_slice(),
        pads.opad.as_slice()
    );
}
