//! `battprov-writer`: drive a `battprov-dut` binary through the full
//! provisioning sequence for one bundle.
//!
//! The device is modeled as separate processes: one import of the KEK
//! first half from the bundle, then one process per provisioning command.
//! Each invocation is awaited before the next starts, so no child outlives
//! the writer.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use battprov_crypto_core::ProvisioningBundle;
use battprov_dut::ProvisionCommand;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "battprov-writer")]
#[command(about = "Deliver a provisioning bundle to a device binary, one command at a time")]
#[command(version)]
pub struct WriterArgs {
    /// Path to the battprov-dut executable
    pub dut_bin: PathBuf,

    /// Bundle file produced by battprov-keygen
    pub bundle: PathBuf,

    /// Context directory passed through to the device
    #[arg(long)]
    pub context_dir: Option<PathBuf>,
}

/// One device invocation: argv after the executable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
}

/// Every device invocation needed to provision `bundle` from `bundle_path`.
#[must_use]
pub fn plan(
    bundle: &ProvisioningBundle,
    bundle_path: &Path,
    context_dir: Option<&Path>,
) -> Vec<Invocation> {
    let prefix: Vec<String> = context_dir
        .map(|dir| vec!["--context-dir".to_owned(), dir.display().to_string()])
        .unwrap_or_default();

    let import = Invocation {
        args: prefix
            .iter()
            .cloned()
            .chain(["--bundle".to_owned(), bundle_path.display().to_string()])
            .collect(),
    };

    std::iter::once(import)
        .chain(
            ProvisionCommand::sequence_for(bundle)
                .into_iter()
                .map(|command| Invocation {
                    args: prefix.iter().cloned().chain(command.as_args()).collect(),
                }),
        )
        .collect()
}

/// Run the full sequence against `args.dut_bin`.
///
/// # Errors
///
/// Fails if the bundle cannot be read, a device process cannot be
/// spawned, or any invocation exits non-zero.
pub fn run(args: &WriterArgs) -> Result<()> {
    let bundle = ProvisioningBundle::load(&args.bundle)
        .with_context(|| format!("cannot read bundle {}", args.bundle.display()))?;

    for invocation in plan(&bundle, &args.bundle, args.context_dir.as_deref()) {
        tracing::info!("Running command: {}", invocation.args.join(" "));
        let status = Command::new(&args.dut_bin)
            .args(&invocation.args)
            .status()
            .with_context(|| format!("cannot start {}", args.dut_bin.display()))?;
        if !status.success() {
            bail!(
                "device command `{}` exited with {status}",
                invocation.args.join(" ")
            );
        }
    }

    tracing::info!("All commands executed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use battprov_crypto_core::{encode_hex, KekPair};
    use clap::CommandFactory;

    fn bundle() -> ProvisioningBundle {
        ProvisioningBundle::from_parts(
            b"challenge",
            b"secret",
            &KekPair::new(vec![0xAB; 16], vec![0xCD; 16]),
        )
        .unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        WriterArgs::command().debug_assert();
    }

    #[test]
    fn plan_imports_first_then_six_commands() {
        let steps = plan(&bundle(), Path::new("keys.json"), None);
        assert_eq!(steps.len(), 7);
        assert_eq!(steps[0].args, vec!["--bundle", "keys.json"]);
        assert_eq!(steps[1].args[0], "set-kek-second-half");
        assert_eq!(steps[6].args, vec!["verify-now"]);
    }

    #[test]
    fn plan_sends_second_half_as_hex() {
        let steps = plan(&bundle(), Path::new("keys.json"), None);
        assert_eq!(steps[1].args[1], encode_hex(&[0xCD; 16]));
    }

    #[test]
    fn plan_passes_context_dir_to_every_step() {
        let steps = plan(&bundle(), Path::new("keys.json"), Some(Path::new("state")));
        for step in &steps {
            assert_eq!(&step.args[..2], ["--context-dir", "state"]);
        }
    }

    #[test]
    fn run_fails_when_device_binary_is_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("keys.json");
        bundle().save(&path).unwrap();
        let args = WriterArgs {
            dut_bin: dir.path().join("no-such-dut"),
            bundle: path,
            context_dir: None,
        };
        assert!(run(&args).is_err());
    }
}
