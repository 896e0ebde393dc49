//! Persistence boundary for the provisioning context.
//!
//! The device-side tooling runs once per command, so the context lives in
//! a JSON file between invocations. [`ContextStore`] is injected into
//! [`crate::Dut`]; [`MemoryContextStore`] serves concurrent writers and
//! tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::context::{ContextField, ProvisioningContext};
use crate::error::DutError;
use crate::validator::VerificationReport;

/// Default context directory, relative to the working directory.
pub const DEFAULT_CONTEXT_DIR: &str = "db";

/// Context file name inside the context directory.
pub const CONTEXT_FILE: &str = "provision_context.json";

/// Verification report file name inside the context directory.
pub const RESULT_FILE: &str = "provision_result.json";

/// Load/save lifecycle for a [`ProvisioningContext`].
pub trait ContextStore {
    /// Load the current context. A store that has never been written
    /// returns an empty context.
    ///
    /// # Errors
    ///
    /// Returns `DutError::Io` if backing storage is unreachable.
    fn load(&self) -> Result<ProvisioningContext, DutError>;

    /// Replace the stored context.
    ///
    /// # Errors
    ///
    /// Returns `DutError::Io` or `DutError::Serialization` on write failure.
    fn save(&self, ctx: &ProvisioningContext) -> Result<(), DutError>;

    /// Persist the outcome of a verification.
    ///
    /// # Errors
    ///
    /// Returns `DutError::Io` or `DutError::Serialization` on write failure.
    fn record_report(&self, report: &VerificationReport) -> Result<(), DutError>;

    /// Set one field: load, overwrite, save.
    ///
    /// The default is not atomic across writers; stores shared between
    /// threads override it.
    ///
    /// # Errors
    ///
    /// Propagates `load`/`save` errors.
    fn update(&self, field: ContextField, value: String) -> Result<ProvisioningContext, DutError> {
        let mut ctx = self.load()?;
        ctx.set(field, value);
        self.save(&ctx)?;
        Ok(ctx)
    }
}

// ── File-backed store ──────────────────────────────────────────────

/// Context stored as `{dir}/provision_context.json`.
#[derive(Debug, Clone)]
pub struct FileContextStore {
    dir: PathBuf,
}

impl FileContextStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the context and result files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn context_path(&self) -> PathBuf {
        self.dir.join(CONTEXT_FILE)
    }

    #[must_use]
    pub fn result_path(&self) -> PathBuf {
        self.dir.join(RESULT_FILE)
    }

    /// Read back the last verification report, if any.
    ///
    /// # Errors
    ///
    /// Returns `DutError::Io` if the file exists but cannot be read, or
    /// `DutError::Serialization` if it does not parse.
    pub fn load_report(&self) -> Result<Option<VerificationReport>, DutError> {
        let path = self.result_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| DutError::Serialization(e.to_string()))
    }

    /// Write `value` as pretty JSON via `.{name}.tmp` + rename.
    fn write_atomic<T: Serialize>(&self, name: &str, value: &T) -> Result<(), DutError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!(".{name}.tmp"));

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| DutError::Serialization(e.to_string()))?;

        fs::write(&tmp, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl ContextStore for FileContextStore {
    /// Creates the directory and an empty `{}` context file when absent.
    /// A file that does not parse is treated as empty and overwritten by
    /// the next save.
    fn load(&self) -> Result<ProvisioningContext, DutError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.context_path();
        if !path.exists() {
            let empty = ProvisioningContext::new();
            self.write_atomic(CONTEXT_FILE, &empty)?;
            return Ok(empty);
        }

        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!("Resetting unreadable context {}: {e}", path.display());
            ProvisioningContext::new()
        }))
    }

    fn save(&self, ctx: &ProvisioningContext) -> Result<(), DutError> {
        self.write_atomic(CONTEXT_FILE, ctx)
    }

    fn record_report(&self, report: &VerificationReport) -> Result<(), DutError> {
        self.write_atomic(RESULT_FILE, report)
    }
}

// ── In-memory store ────────────────────────────────────────────────

/// Mutex-guarded in-memory context.
///
/// `update` holds the lock for the whole read-modify-write, and `load`
/// clones under the lock, so `verify` always sees all six fields from a
/// single instant.
#[derive(Debug, Default)]
pub struct MemoryContextStore {
    context: Mutex<ProvisioningContext>,
    last_report: Mutex<Option<VerificationReport>>,
}

impl MemoryContextStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing context.
    #[must_use]
    pub fn with_context(ctx: ProvisioningContext) -> Self {
        Self {
            context: Mutex::new(ctx),
            last_report: Mutex::new(None),
        }
    }

    /// The most recently recorded report.
    ///
    /// # Errors
    ///
    /// Returns `DutError::LockPoisoned` if a writer panicked.
    pub fn last_report(&self) -> Result<Option<VerificationReport>, DutError> {
        self.last_report
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| DutError::LockPoisoned)
    }
}

impl ContextStore for MemoryContextStore {
    fn load(&self) -> Result<ProvisioningContext, DutError> {
        self.context
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| DutError::LockPoisoned)
    }

    fn save(&self, ctx: &ProvisioningContext) -> Result<(), DutError> {
        let mut guard = self.context.lock().map_err(|_| DutError::LockPoisoned)?;
        *guard = ctx.clone();
        Ok(())
    }

    fn record_report(&self, report: &VerificationReport) -> Result<(), DutError> {
        let mut guard = self
            .last_report
            .lock()
            .map_err(|_| DutError::LockPoisoned)?;
        *guard = Some(report.clone());
        Ok(())
    }

    fn update(&self, field: ContextField, value: String) -> Result<ProvisioningContext, DutError> {
        let mut guard = self.context.lock().map_err(|_| DutError::LockPoisoned)?;
        guard.set(field, value);
        Ok(guard.clone())
    }
}
