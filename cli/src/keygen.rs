//! `battprov-keygen`: generate a provisioning bundle file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use battprov_crypto_core::{build_bundle_with, BundleParams, CHALLENGE_LEN, KEK_LEN, SECRET_LEN};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "battprov-keygen")]
#[command(about = "Generate challenge, secret, split KEK and wrapped HMAC pads")]
#[command(version)]
pub struct KeygenArgs {
    /// Output bundle file
    #[arg(default_value = "generated_keys.json")]
    pub output: PathBuf,

    /// Challenge length in bytes
    #[arg(long, default_value_t = CHALLENGE_LEN)]
    pub challenge_len: usize,

    /// Secret length in bytes
    #[arg(long, default_value_t = SECRET_LEN)]
    pub secret_len: usize,

    /// Full KEK length in bytes (split into two halves)
    #[arg(long, default_value_t = KEK_LEN)]
    pub kek_len: usize,
}

impl KeygenArgs {
    #[must_use]
    pub const fn params(&self) -> BundleParams {
        BundleParams {
            challenge_len: self.challenge_len,
            secret_len: self.secret_len,
            kek_len: self.kek_len,
        }
    }
}

/// Build a bundle and write it to `args.output`.
///
/// # Errors
///
/// Fails if generation fails, the generated bundle does not self-verify,
/// or the file cannot be written.
pub fn run(args: &KeygenArgs) -> Result<()> {
    let bundle = build_bundle_with(&args.params()).context("key generation failed")?;
    if !bundle.self_verify() {
        bail!("generated bundle failed its own response check");
    }
    bundle
        .save(&args.output)
        .with_context(|| format!("cannot write {}", args.output.display()))?;
    tracing::info!("Keys generated and saved to '{}'", args.output.display());
    Ok(())
}
