//! `battprov-dut` — Device-under-test side of battery provisioning.
//!
//! Provisioning commands arrive one at a time, usually in separate process
//! invocations. Each one persists a single field into the
//! [`ProvisioningContext`]; the final verify command unwraps the HMAC pads
//! with the reconstructed KEK and checks the challenge response.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod command;
pub mod context;
pub mod error;
pub mod store;
pub mod validator;

pub use command::{CommandOutcome, Dut, ProvisionCommand};
pub use context::{ContextField, ProvisioningContext, ProvisioningState};
pub use error::DutError;
pub use store::{
    ContextStore, FileContextStore, MemoryContextStore, CONTEXT_FILE, DEFAULT_CONTEXT_DIR,
    RESULT_FILE,
};
pub use validator::{verify, VerificationReport};
