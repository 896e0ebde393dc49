//! `battprov-dut`: one provisioning command per invocation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use battprov_dut::{
    CommandOutcome, Dut, FileContextStore, ProvisionCommand, DEFAULT_CONTEXT_DIR,
};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "battprov-dut")]
#[command(about = "Simulated device under test: store one provisioning field or verify")]
#[command(version)]
pub struct DutArgs {
    /// Directory holding provision_context.json and provision_result.json
    #[arg(long, default_value = DEFAULT_CONTEXT_DIR)]
    pub context_dir: PathBuf,

    /// Bundle file whose kek_seed_half1 is imported before the command runs
    #[arg(long)]
    pub bundle: Option<PathBuf>,

    /// set-kek-second-half | set-encrypted-ipad | set-encrypted-opad |
    /// set-challenge | set-expected-response | verify-now | import-bundle
    #[arg(allow_hyphen_values = true)]
    pub command: Option<String>,

    /// Value for set-* commands
    #[arg(allow_hyphen_values = true)]
    pub value: Option<String>,
}

/// Run one invocation. Returns the outcome of the command, if one ran.
///
/// # Errors
///
/// Fails on an unknown command, a missing value, a missing or malformed
/// provisioning field at verification time, or store I/O errors. A
/// response mismatch is not an error.
pub fn run(args: &DutArgs) -> Result<Option<CommandOutcome>> {
    let dut = Dut::new(FileContextStore::new(&args.context_dir));

    if let Some(bundle) = &args.bundle {
        dut.apply(ProvisionCommand::ImportBundle(bundle.clone()))
            .with_context(|| format!("cannot import {}", bundle.display()))?;
    }

    let Some(name) = args.command.as_deref() else {
        tracing::info!("No action specified");
        return Ok(None);
    };

    let command = ProvisionCommand::parse(name, args.value.as_deref())?;
    let outcome = dut
        .apply(command)
        .with_context(|| format!("{name} failed"))?;
    Ok(Some(outcome))
}
