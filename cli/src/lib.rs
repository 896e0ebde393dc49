//! battprov command-line shell.
//!
//! Thin wrappers that wire `clap` arguments to `battprov-crypto-core` and
//! `battprov-dut`. Each binary in `src/bin` parses its arguments, installs
//! logging, and calls the matching `run` here.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod dut;
pub mod keygen;
pub mod logging;
pub mod writer;
