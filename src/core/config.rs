//! Configuration model and TOML loading.
//!
//! Config is read-only input: it is loaded from `--config`, then the
//! `TMPCLEAN_CONFIG` environment variable, then built-in defaults. Nothing is
//! ever written back.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TcError};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "TMPCLEAN_CONFIG";

/// Default age threshold in days.
pub const DEFAULT_DAYS: u64 = 7;

/// Default number of errors shown in the human summary.
pub const DEFAULT_ERROR_PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: PathsConfig,
    pub policy: PolicyConfig,
    pub report: ReportConfig,
    pub log: LogConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Fixed root outside of which nothing may be touched.
    pub base_dir: PathBuf,
    /// Target used when `--path` is not given. Defaults to `base_dir`.
    pub default_target: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            default_target: None,
        }
    }
}

impl PathsConfig {
    /// Target directory for a run without an explicit `--path`.
    #[must_use]
    pub fn target(&self) -> &Path {
        self.default_target.as_deref().unwrap_or(&self.base_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub default_days: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_days: DEFAULT_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub error_preview_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            error_preview_limit: DEFAULT_ERROR_PREVIEW_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Append-only JSONL activity log. Absent means no log is written.
    pub jsonl_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Cooperative wall-clock limit for one run.
    pub max_runtime_secs: Option<u64>,
}

/// Platform default base directory.
#[must_use]
pub fn default_base_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Windows\Temp")
    } else {
        PathBuf::from("/tmp")
    }
}

impl Config {
    /// Load configuration from an explicit path, the environment, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(value) if !value.is_empty() => Self::from_file(Path::new(&value)),
            _ => Ok(Self::default()),
        }
    }

    /// Read and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(TcError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| TcError::io(path, source))?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot describe a safe run.
    pub fn validate(&self) -> Result<()> {
        if self.paths.base_dir.as_os_str().is_empty() {
            return Err(TcError::InvalidConfig {
                details: "paths.base_dir must not be empty".to_string(),
            });
        }
        if !self.paths.base_dir.is_absolute() {
            return Err(TcError::InvalidConfig {
                details: format!(
                    "paths.base_dir must be absolute, got {}",
                    self.paths.base_dir.display()
                ),
            });
        }
        if self
            .paths
            .default_target
            .as_ref()
            .is_some_and(|target| target.as_os_str().is_empty())
        {
            return Err(TcError::InvalidConfig {
                details: "paths.default_target must not be empty".to_string(),
            });
        }
        if self.limits.max_runtime_secs == Some(0) {
            return Err(TcError::InvalidConfig {
                details: "limits.max_runtime_secs must be positive".to_string(),
            });
        }
        Ok(())
    }
}
