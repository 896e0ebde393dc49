//! The provisioning context accumulated on the device.
//!
//! Values are kept in the textual form they arrived in (base64, or hex for
//! the KEK second half) and decoded only at verification time, so a
//! malformed value is reported against the field that carried it.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Fields ─────────────────────────────────────────────────────────

/// A provisioning context field, named by its persisted JSON key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextField {
    /// First KEK half, imported from the trusted bundle store (base64).
    KekSeedHalf1,
    /// Second KEK half, delivered by command (hex, base64 accepted).
    KekSeedHalf2,
    /// Encrypted inner pad (base64).
    EncryptedIpad,
    /// Encrypted outer pad (base64).
    EncryptedOpad,
    /// Challenge the response was computed over (base64).
    Challenge,
    /// Expected response digest (base64).
    ExpectedResponse,
}

impl ContextField {
    /// Every field `verify` needs, in the order they are checked.
    pub const REQUIRED: [Self; 6] = [
        Self::KekSeedHalf1,
        Self::KekSeedHalf2,
        Self::EncryptedIpad,
        Self::EncryptedOpad,
        Self::Challenge,
        Self::ExpectedResponse,
    ];

    /// Key used in `provision_context.json`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::KekSeedHalf1 => "kek_seed_half1",
            Self::KekSeedHalf2 => "write_battery_provision_key",
            Self::EncryptedIpad => "write_battery_provision_ipad",
            Self::EncryptedOpad => "write_battery_provision_opad",
            Self::Challenge => "write_battery_provision_challenge",
            Self::ExpectedResponse => "write_battery_provision_response",
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── State ──────────────────────────────────────────────────────────

/// Where a device stands in the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// No field set.
    Empty,
    /// Some but not all required fields set.
    PartiallyProvisioned,
    /// All six required fields present; `verify` may run.
    ReadyToVerify,
    /// `verify` ran and produced a report.
    Verified {
        /// Whether the recomputed response matched.
        success: bool,
    },
}

// ── Context ────────────────────────────────────────────────────────

/// Field-name → value accumulator persisted between command invocations.
///
/// Absent keys load as `None`; unrecognized keys are ignored.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kek_seed_half1: Option<String>,

    #[serde(
        default,
        rename = "write_battery_provision_key",
        skip_serializing_if = "Option::is_none"
    )]
    kek_seed_half2: Option<String>,

    #[serde(
        default,
        rename = "write_battery_provision_ipad",
        skip_serializing_if = "Option::is_none"
    )]
    encrypted_ipad: Option<String>,

    #[serde(
        default,
        rename = "write_battery_provision_opad",
        skip_serializing_if = "Option::is_none"
    )]
    encrypted_opad: Option<String>,

    #[serde(
        default,
        rename = "write_battery_provision_challenge",
        skip_serializing_if = "Option::is_none"
    )]
    challenge: Option<String>,

    #[serde(
        default,
        rename = "write_battery_provision_response",
        skip_serializing_if = "Option::is_none"
    )]
    expected_response: Option<String>,
}

impl ProvisioningContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn slot(&self, field: ContextField) -> &Option<String> {
        match field {
            ContextField::KekSeedHalf1 => &self.kek_seed_half1,
            ContextField::KekSeedHalf2 => &self.kek_seed_half2,
            ContextField::EncryptedIpad => &self.encrypted_ipad,
            ContextField::EncryptedOpad => &self.encrypted_opad,
            ContextField::Challenge => &self.challenge,
            ContextField::ExpectedResponse => &self.expected_response,
        }
    }

    fn slot_mut(&mut self, field: ContextField) -> &mut Option<String> {
        match field {
            ContextField::KekSeedHalf1 => &mut self.kek_seed_half1,
            ContextField::KekSeedHalf2 => &mut self.kek_seed_half2,
            ContextField::EncryptedIpad => &mut self.encrypted_ipad,
            ContextField::EncryptedOpad => &mut self.encrypted_opad,
            ContextField::Challenge => &mut self.challenge,
            ContextField::ExpectedResponse => &mut self.expected_response,
        }
    }

    /// Set `field`, replacing any previous value.
    pub fn set(&mut self, field: ContextField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    /// Current value of `field`, if provisioned.
    #[must_use]
    pub fn get(&self, field: ContextField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// First required field that is still absent.
    #[must_use]
    pub fn missing(&self) -> Option<ContextField> {
        ContextField::REQUIRED
            .into_iter()
            .find(|&field| self.slot(field).is_none())
    }

    /// Accumulation state derived from which fields are present.
    #[must_use]
    pub fn state(&self) -> ProvisioningState {
        let present = ContextField::REQUIRED
            .into_iter()
            .filter(|&field| self.slot(field).is_some())
            .count();
        match present {
            0 => ProvisioningState::Empty,
            n if n == ContextField::REQUIRED.len() => ProvisioningState::ReadyToVerify,
            _ => ProvisioningState::PartiallyProvisioned,
        }
    }
}

impl fmt::Debug for ProvisioningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for field in ContextField::REQUIRED {
            if self.slot(field).is_some() {
                list.entry(&field.key());
            }
        }
        list.finish()
    }
}
