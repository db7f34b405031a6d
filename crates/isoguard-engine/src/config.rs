//! Verification run configuration.
//!
//! Loaded from TOML. Only `root`, `endpoint`, `first_payload` and
//! `second_payload` are required; everything else has a default.

use crate::orchestrator::VerifyPlan;
use isoguard_core::errors::{ExError, ExErrorKind, IsoGuardError, Result};
use isoguard_core::fingerprint::{fingerprinter_for, Fingerprinter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PERIOD: &str = "5000";
pub const DEFAULT_END_DATE: &str = "2024-09-30";
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 5_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_ALGORITHM: &str = "sha256";

fn default_period() -> String {
    DEFAULT_PERIOD.to_string()
}

fn default_end_date() -> String {
    DEFAULT_END_DATE.to_string()
}

fn default_grace_period_ms() -> u64 {
    DEFAULT_GRACE_PERIOD_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VerifyConfig {
    /// Cache root monitored by the run; wiped at the start of the run
    pub root: PathBuf,
    /// URL the workloads are POSTed to
    pub endpoint: String,
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
    /// JSON workload sent first
    pub first_payload: PathBuf,
    /// Unrelated JSON workload sent second
    pub second_payload: PathBuf,
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub invocation_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub capture_timeout_ms: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default)]
    pub cleanup_on_exit: bool,
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

impl VerifyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::ConfigInvalid)
                .with_op("load_config")
                .with_message(e.to_string())
        })
    }

    /// Read and parse a TOML config file. Relative payload, root and report
    /// paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            isoguard_core::errors::io_error("load_config", e).with_path(path.display().to_string())
        })?;
        let mut config =
            Self::from_toml_str(&text).map_err(|e| e.with_path(path.display().to_string()))?;
        if let Some(base) = path.parent() {
            config.root = resolve(base, &config.root);
            config.first_payload = resolve(base, &config.first_payload);
            config.second_payload = resolve(base, &config.second_payload);
            config.report_dir = config.report_dir.as_deref().map(|d| resolve(base, d));
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// `ConfigInvalid` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| -> Result<()> {
            Err(IsoGuardError::ConfigInvalid {
                reason: reason.to_string(),
            }
            .into())
        };
        if self.endpoint.trim().is_empty() {
            return invalid("endpoint must not be empty");
        }
        if self.root.as_os_str().is_empty() {
            return invalid("root must not be empty");
        }
        if self.invocation_timeout_ms == 0 {
            return invalid("invocation_timeout_ms must be greater than zero");
        }
        if self.capture_timeout_ms == 0 {
            return invalid("capture_timeout_ms must be greater than zero");
        }
        if self.workers == 0 {
            return invalid("workers must be at least 1");
        }
        if self.grace_period_ms > self.invocation_timeout_ms {
            return invalid("grace_period_ms must not exceed invocation_timeout_ms");
        }
        self.fingerprinter().map(|_| ())
    }

    /// Resolve the configured digest.
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if `algorithm` is neither sha256 nor sha512.
    pub fn fingerprinter(&self) -> Result<Box<dyn Fingerprinter>> {
        fingerprinter_for(&self.algorithm).ok_or_else(|| {
            IsoGuardError::ConfigInvalid {
                reason: format!("algorithm must be sha256 or sha512, got '{}'", self.algorithm),
            }
            .into()
        })
    }

    /// Validate and turn the config into a runnable plan, reading both
    /// payload files.
    pub fn to_plan(&self) -> Result<VerifyPlan> {
        self.validate()?;
        Ok(VerifyPlan {
            root: self.root.clone(),
            first_payload: read_payload(&self.first_payload)?,
            second_payload: read_payload(&self.second_payload)?,
            period: self.period.clone(),
            end_date: self.end_date.clone(),
            grace_period: Duration::from_millis(self.grace_period_ms),
            invocation_timeout: Duration::from_millis(self.invocation_timeout_ms),
            capture_timeout: Duration::from_millis(self.capture_timeout_ms),
            workers: self.workers,
            cleanup_on_exit: self.cleanup_on_exit,
        })
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn read_payload(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        isoguard_core::errors::io_error("read_payload", e).with_path(path.display().to_string())
    })?;
    serde_json::from_str(&text).map_err(|e| {
        ExError::from(e)
            .with_op("read_payload")
            .with_path(path.display().to_string())
    })
}
