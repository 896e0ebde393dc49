//! Provisioning command surface.
//!
//! Each command either stores exactly one context field or triggers
//! verification. Commands are independent: the device may be restarted
//! between any two of them.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use zeroize::Zeroizing;

use battprov_crypto_core::{decode_base64, encode_base64, encode_hex, ProvisioningBundle};

use crate::context::{ContextField, ProvisioningState};
use crate::error::DutError;
use crate::store::ContextStore;
use crate::validator::{self, VerificationReport};

/// One provisioning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionCommand {
    /// Import `kek_seed_half1` from a bundle file; nothing else is read
    /// into the context.
    ImportBundle(PathBuf),
    /// KEK second half, hex or base64.
    SetKekSecondHalf(String),
    /// Inner pad encrypted under the KEK, base64.
    SetEncryptedIpad(String),
    /// Outer pad encrypted under the KEK, base64.
    SetEncryptedOpad(String),
    /// Challenge, base64.
    SetChallenge(String),
    /// Expected HMAC response, base64.
    SetExpectedResponse(String),
    /// Verify the accumulated context and record the report.
    VerifyNow,
}

/// The one key the device reads from a trusted key store file. Every
/// other key in the file is ignored and never deserialized.
#[derive(Deserialize)]
struct TrustedHalf {
    #[serde(default)]
    kek_seed_half1: Option<String>,
}

/// Read `kek_seed_half1` from `path` and return it as canonical base64.
fn read_first_half(path: &Path) -> Result<String, DutError> {
    let json = std::fs::read_to_string(path)?;
    let record: TrustedHalf =
        serde_json::from_str(&json).map_err(|e| DutError::Serialization(e.to_string()))?;
    let text = record
        .kek_seed_half1
        .ok_or(DutError::MissingField(ContextField::KekSeedHalf1))?;
    let half1 = decode_base64(&text)
        .map(Zeroizing::new)
        .map_err(|e| DutError::decode(ContextField::KekSeedHalf1, &e))?;
    Ok(encode_base64(&half1))
}

impl ProvisionCommand {
    /// Parse a command name plus its optional value.
    ///
    /// Accepts the canonical names (`set-kek-second-half`, ...) and the
    /// legacy long-flag spellings (`--write-battery-provision-key`, ...).
    ///
    /// # Errors
    ///
    /// - `DutError::UnknownCommand` for an unrecognized name
    /// - `DutError::MissingArgument` for a setter without a value
    pub fn parse(name: &str, value: Option<&str>) -> Result<Self, DutError> {
        let needs_value = |make: fn(String) -> Self| {
            value
                .map(|v| make(v.to_owned()))
                .ok_or_else(|| DutError::MissingArgument(name.to_owned()))
        };

        match name {
            "import-bundle" => value
                .map(|v| Self::ImportBundle(PathBuf::from(v)))
                .ok_or_else(|| DutError::MissingArgument(name.to_owned())),
            "set-kek-second-half" | "--write-battery-provision-key" => {
                needs_value(Self::SetKekSecondHalf)
            }
            "set-encrypted-ipad" | "--write-battery-provision-ipad" => {
                needs_value(Self::SetEncryptedIpad)
            }
            "set-encrypted-opad" | "--write-battery-provision-opad" => {
                needs_value(Self::SetEncryptedOpad)
            }
            "set-challenge" | "--write-battery-provision-challenge" => {
                needs_value(Self::SetChallenge)
            }
            "set-expected-response" | "--write-battery-provision-response" => {
                needs_value(Self::SetExpectedResponse)
            }
            "verify-now" | "--provision-battery" => Ok(Self::VerifyNow),
            other => Err(DutError::UnknownCommand(other.to_owned())),
        }
    }

    /// Canonical command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ImportBundle(_) => "import-bundle",
            Self::SetKekSecondHalf(_) => "set-kek-second-half",
            Self::SetEncryptedIpad(_) => "set-encrypted-ipad",
            Self::SetEncryptedOpad(_) => "set-encrypted-opad",
            Self::SetChallenge(_) => "set-challenge",
            Self::SetExpectedResponse(_) => "set-expected-response",
            Self::VerifyNow => "verify-now",
        }
    }

    /// Context field written by a setter command.
    #[must_use]
    pub const fn field(&self) -> Option<ContextField> {
        match self {
            Self::ImportBundle(_) => Some(ContextField::KekSeedHalf1),
            Self::SetKekSecondHalf(_) => Some(ContextField::KekSeedHalf2),
            Self::SetEncryptedIpad(_) => Some(ContextField::EncryptedIpad),
            Self::SetEncryptedOpad(_) => Some(ContextField::EncryptedOpad),
            Self::SetChallenge(_) => Some(ContextField::Challenge),
            Self::SetExpectedResponse(_) => Some(ContextField::ExpectedResponse),
            Self::VerifyNow => None,
        }
    }

    /// The command as argv words, inverse of [`Self::parse`].
    #[must_use]
    pub fn as_args(&self) -> Vec<String> {
        let value = match self {
            Self::ImportBundle(path) => Some(path.display().to_string()),
            Self::SetKekSecondHalf(v)
            | Self::SetEncryptedIpad(v)
            | Self::SetEncryptedOpad(v)
            | Self::SetChallenge(v)
            | Self::SetExpectedResponse(v) => Some(v.clone()),
            Self::VerifyNow => None,
        };
        std::iter::once(self.name().to_owned()).chain(value).collect()
    }

    /// The provisioning sequence that delivers `bundle` to a device which
    /// already holds `kek_seed_half1`. The KEK second half travels as hex.
    #[must_use]
    pub fn sequence_for(bundle: &ProvisioningBundle) -> Vec<Self> {
        vec![
            Self::SetKekSecondHalf(encode_hex(&bundle.kek_seed_half2)),
            Self::SetEncryptedIpad(encode_base64(&bundle.encrypted_ipad)),
            Self::SetEncryptedOpad(encode_base64(&bundle.encrypted_opad)),
            Self::SetChallenge(encode_base64(&bundle.challenge)),
            Self::SetExpectedResponse(encode_base64(&bundle.response)),
            Self::VerifyNow,
        ]
    }
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A field was persisted; the context is now in `state`.
    Stored {
        field: ContextField,
        state: ProvisioningState,
    },
    /// Verification ran; the report has been recorded.
    Verified(VerificationReport),
}

/// The device under test: a context store plus the command handlers.
#[derive(Debug)]
pub struct Dut<S> {
    store: S,
}

impl<S: ContextStore> Dut<S> {
    /// Wrap `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current accumulation state.
    ///
    /// # Errors
    ///
    /// Propagates store load errors.
    pub fn state(&self) -> Result<ProvisioningState, DutError> {
        Ok(self.store.load()?.state())
    }

    /// Apply one command.
    ///
    /// Setters persist their field and never compute. `VerifyNow` loads
    /// one snapshot of the context, verifies it and records the report;
    /// a response mismatch is still `Ok`.
    ///
    /// # Errors
    ///
    /// - `DutError::MissingField` / `DutError::Decode` from verification
    /// - `DutError::Io` / `DutError::Serialization` if a key store file
    ///   cannot be read or parsed
    /// - `DutError::MissingField` / `DutError::Decode` if its
    ///   `kek_seed_half1` is absent or not base64
    /// - store I/O errors
    pub fn apply(&self, command: ProvisionCommand) -> Result<CommandOutcome, DutError> {
        let (field, value) = match command {
            ProvisionCommand::VerifyNow => return self.verify_now(),
            ProvisionCommand::ImportBundle(path) => {
                let half1 = read_first_half(&path)?;
                tracing::info!("Imported KEK first half from {}", path.display());
                (ContextField::KekSeedHalf1, half1)
            }
            ProvisionCommand::SetKekSecondHalf(v) => (ContextField::KekSeedHalf2, v),
            ProvisionCommand::SetEncryptedIpad(v) => (ContextField::EncryptedIpad, v),
            ProvisionCommand::SetEncryptedOpad(v) => (ContextField::EncryptedOpad, v),
            ProvisionCommand::SetChallenge(v) => (ContextField::Challenge, v),
            ProvisionCommand::SetExpectedResponse(v) => (ContextField::ExpectedResponse, v),
        };

        let ctx = self.store.update(field, value)?;
        let state = ctx.state();
        tracing::debug!("Stored {field}; state {state:?}");
        Ok(CommandOutcome::Stored { field, state })
    }

    fn verify_now(&self) -> Result<CommandOutcome, DutError> {
        let snapshot = self.store.load()?;
        let report = validator::verify(&snapshot)?;
        self.store.record_report(&report)?;
        tracing::info!("Provisioning success: {}", report.success);
        Ok(CommandOutcome::Verified(report))
    }
}
