//! Response verification on the device.
//!
//! [`verify`] reconstructs `kek = half1 || half2`, unwraps both pads with
//! the stream cipher, recomputes the HMAC over the challenge and compares
//! it against the expected response in constant time. A mismatch is a
//! normal outcome (`success: false`); every intermediate value is kept in
//! the report for diagnosis.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use battprov_crypto_core::{
    decode_base64, decode_hex_or_base64, encode_base64, encode_hex, hmac, stream, xor_bytes,
    CryptoError, KekPair,
};

use crate::context::{ContextField, ProvisioningContext, ProvisioningState};
use crate::error::DutError;

/// Outcome of one verification, persisted as `provision_result.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Reconstructed KEK, hex.
    pub kek: String,
    /// Encrypted inner pad as provisioned.
    pub ipad_encrypted: String,
    /// Encrypted outer pad as provisioned.
    pub opad_encrypted: String,
    /// Unwrapped inner pad, base64.
    pub ipad_decrypted: String,
    /// Unwrapped outer pad, base64.
    pub opad_decrypted: String,
    /// `ipad_decrypted XOR opad_decrypted`, hex.
    ///
    /// Diagnostic only. The XOR cancels the secret, so for well-formed
    /// pads this is always `0x6a` repeated; it is not the padded key.
    pub key_padded: String,
    /// Challenge as provisioned.
    pub challenge: String,
    /// Expected response as provisioned.
    pub expected_response: String,
    /// Recomputed response, base64.
    pub computed_hmac: String,
    /// Whether `computed_hmac` equals the expected response.
    pub success: bool,
}

impl VerificationReport {
    /// The terminal provisioning state this report represents.
    #[must_use]
    pub const fn state(&self) -> ProvisioningState {
        ProvisioningState::Verified {
            success: self.success,
        }
    }
}

fn require(ctx: &ProvisioningContext, field: ContextField) -> Result<&str, DutError> {
    ctx.get(field).ok_or(DutError::MissingField(field))
}

fn decode_field(
    ctx: &ProvisioningContext,
    field: ContextField,
    decoder: fn(&str) -> Result<Vec<u8>, CryptoError>,
) -> Result<Zeroizing<Vec<u8>>, DutError> {
    let text = require(ctx, field)?;
    decoder(text)
        .map(Zeroizing::new)
        .map_err(|e| DutError::decode(field, &e))
}

/// Verify the challenge response held in `ctx`.
///
/// Read-only: calling it again on the same context yields the same report.
///
/// # Errors
///
/// - `DutError::MissingField` if any of the six required fields is absent
///   (checked before anything is decoded)
/// - `DutError::Decode` if a field is not valid base64 (or hex/base64 for
///   the KEK second half)
/// - `DutError::Crypto(CryptoError::InvalidKey)` if both KEK halves decode
///   to empty byte strings
pub fn verify(ctx: &ProvisioningContext) -> Result<VerificationReport, DutError> {
    if let Some(field) = ctx.missing() {
        return Err(DutError::MissingField(field));
    }

    let half1 = decode_field(ctx, ContextField::KekSeedHalf1, decode_base64)?;
    let half2 = decode_field(ctx, ContextField::KekSeedHalf2, decode_hex_or_base64)?;
    let ipad_encrypted = decode_field(ctx, ContextField::EncryptedIpad, decode_base64)?;
    let opad_encrypted = decode_field(ctx, ContextField::EncryptedOpad, decode_base64)?;
    let challenge = decode_field(ctx, ContextField::Challenge, decode_base64)?;
    let expected = decode_field(ctx, ContextField::ExpectedResponse, decode_base64)?;

    let kek = KekPair::new(half1.to_vec(), half2.to_vec()).combine();

    let ipad = Zeroizing::new(stream::apply(kek.expose(), &ipad_encrypted)?);
    let opad = Zeroizing::new(stream::apply(kek.expose(), &opad_encrypted)?);
    let key_padded = xor_bytes(&ipad, &opad);
    let computed = hmac::compute(&ipad, &opad, &challenge);
    let success = hmac::constant_time_eq(&computed, &expected);

    tracing::info!("Decrypted ipad: {}", encode_hex(&ipad));
    tracing::info!("Decrypted opad: {}", encode_hex(&opad));
    tracing::info!("Reconstructed key_padded: {}", encode_hex(&key_padded));
    tracing::info!("Expected response: {}", encode_hex(&expected));
    tracing::info!("Computed response: {}", encode_hex(&computed));

    Ok(VerificationReport {
        kek: encode_hex(kek.expose()),
        ipad_encrypted: require(ctx, ContextField::EncryptedIpad)?.to_owned(),
        opad_encrypted: require(ctx, ContextField::EncryptedOpad)?.to_owned(),
        ipad_decrypted: encode_base64(&ipad),
        opad_decrypted: encode_base64(&opad),
        key_padded: encode_hex(&key_padded),
        challenge: require(ctx, ContextField::Challenge)?.to_owned(),
        expected_response: require(ctx, ContextField::ExpectedResponse)?.to_owned(),
        computed_hmac: encode_base64(&computed),
        success,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use battprov_crypto_core::{ProvisioningBundle, BLOCK_SIZE, IPAD_BYTE, OPAD_BYTE};

    fn bundle() -> ProvisioningBundle {
        ProvisioningBundle::from_parts(
            b"0123456789abcdef0123456789abcdef",
            &[0x5Au8; 64],
            &KekPair::new(vec![0x10; 16], vec![0x20; 16]),
        )
        .unwrap()
    }

    fn context_from(bundle: &ProvisioningBundle) -> ProvisioningContext {
        let mut ctx = ProvisioningContext::new();
        ctx.set(ContextField::KekSeedHalf1, encode_base64(&bundle.kek_seed_half1));
        ctx.set(ContextField::KekSeedHalf2, encode_hex(&bundle.kek_seed_half2));
        ctx.set(ContextField::EncryptedIpad, encode_base64(&bundle.encrypted_ipad));
        ctx.set(ContextField::EncryptedOpad, encode_base64(&bundle.encrypted_opad));
        ctx.set(ContextField::Challenge, encode_base64(&bundle.challenge));
        ctx.set(ContextField::ExpectedResponse, encode_base64(&bundle.response));
        ctx
    }

    #[test]
    fn untampered_context_verifies() {
        let report = verify(&context_from(&bundle())).unwrap();
        assert!(report.success);
        assert_eq!(report.state(), ProvisioningState::Verified { success: true });
        assert_eq!(report.kek, format!("{}{}", "10".repeat(16), "20".repeat(16)));
    }

    #[test]
    fn kek_second_half_accepts_base64() {
        let b = bundle();
        let mut ctx = context_from(&b);
        ctx.set(ContextField::KekSeedHalf2, encode_base64(&b.kek_seed_half2));
        assert!(verify(&ctx).unwrap().success);
    }

    #[test]
    fn wrong_expected_response_is_reported_not_raised() {
        let b = bundle();
        let mut ctx = context_from(&b);
        ctx.set(ContextField::ExpectedResponse, encode_base64(&[0u8; 32]));
        let report = verify(&ctx).unwrap();
        assert!(!report.success);
        assert_eq!(report.expected_response, encode_base64(&[0u8; 32]));
        assert_eq!(report.computed_hmac, encode_base64(&b.response));
    }

    #[test]
    fn key_padded_is_constant_diagnostic() {
        let report = verify(&context_from(&bundle())).unwrap();
        assert_eq!(
            report.key_padded,
            encode_hex(&[IPAD_BYTE ^ OPAD_BYTE; BLOCK_SIZE])
        );
    }

    #[test]
    fn echoes_provisioned_text() {
        let b = bundle();
        let ctx = context_from(&b);
        let report = verify(&ctx).unwrap();
        assert_eq!(
            Some(report.ipad_encrypted.as_str()),
            ctx.get(ContextField::EncryptedIpad)
        );
        assert_eq!(Some(report.challenge.as_str()), ctx.get(ContextField::Challenge));
    }

    #[test]
    fn missing_field_is_error() {
        let mut ctx = ProvisioningContext::new();
        ctx.set(ContextField::KekSeedHalf1, "AA==");
        let err = verify(&ctx).expect_err("should fail");
        assert!(matches!(err, DutError::MissingField(ContextField::KekSeedHalf2)));
    }

    #[test]
    fn undecodable_field_is_decode_error() {
        let mut ctx = context_from(&bundle());
        ctx.set(ContextField::Challenge, "!!not base64!!");
        let err = verify(&ctx).expect_err("should fail");
        assert!(matches!(
            err,
            DutError::Decode {
                field: ContextField::Challenge,
                ..
            }
        ));
    }

    #[test]
    fn empty_kek_is_invalid_key() {
        let mut ctx = context_from(&bundle());
        ctx.set(ContextField::KekSeedHalf1, "");
        ctx.set(ContextField::KekSeedHalf2, "");
        let err = verify(&ctx).expect_err("should fail");
        assert!(matches!(err, DutError::Crypto(CryptoError::InvalidKey(_))));
    }

    #[test]
    fn verify_is_repeatable() {
        let ctx = context_from(&bundle());
        assert_eq!(verify(&ctx).unwrap(), verify(&ctx).unwrap());
    }

    #[test]
    fn report_json_keys() {
        let report = verify(&context_from(&bundle())).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        for key in [
            "kek",
            "ipad_encrypted",
            "opad_encrypted",
            "ipad_decrypted",
            "opad_decrypted",
            "key_padded",
            "challenge",
            "expected_response",
            "computed_hmac",
            "success",
        ] {
            assert!(value.get(key).is_some(), "{key}");
        }
        assert_eq!(value["success"], serde_json::Value::Bool(true));
    }
}
