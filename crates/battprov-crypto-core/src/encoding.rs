//! Text encodings used at the bundle and context boundaries.
//!
//! Bundle fields travel as standard padded base64. The KEK second half is
//! delivered to the device as hex, with base64 accepted as a fallback.

use data_encoding::{BASE64, HEXLOWER, HEXLOWER_PERMISSIVE};

use crate::error::CryptoError;

/// Encode bytes as standard padded base64.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode standard padded base64.
///
/// # Errors
///
/// Returns `CryptoError::Decode` if the input is not valid base64.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(text.trim().as_bytes())
        .map_err(|e| CryptoError::Decode(format!("invalid base64: {e}")))
}

/// Encode bytes as lowercase hex.
#[must_use]
pub fn encode_hex(bytes: &[u8]) -> String {
    HEXLOWER.encode(bytes)
}

/// Decode hex, accepting either letter case.
///
/// # Errors
///
/// Returns `CryptoError::Decode` if the input is not valid hex.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, CryptoError> {
    HEXLOWER_PERMISSIVE
        .decode(text.trim().as_bytes())
        .map_err(|e| CryptoError::Decode(format!("invalid hex: {e}")))
}

/// Decode hex, falling back to base64 when the text is not hex.
///
/// # Errors
///
/// Returns `CryptoError::Decode` if the input is neither hex nor base64.
pub fn decode_hex_or_base64(text: &str) -> Result<Vec<u8>, CryptoError> {
    decode_hex(text).or_else(|_| {
        decode_base64(text)
            .map_err(|e| CryptoError::Decode(format!("neither hex nor base64 ({e})")))
    })
}

/// Serde adapter: `Vec<u8>` as a base64 string.
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 text.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_base64(bytes))
    }

    /// Deserialize base64 text into bytes.
    ///
    /// # Errors
    ///
    /// Fails if the string is not valid base64.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_base64(&text).map_err(serde::de::Error::custom)
    }
}
