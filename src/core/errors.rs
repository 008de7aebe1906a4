//! TC-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, TcError>;

/// Top-level error type for tmpclean.
#[derive(Debug, Error)]
pub enum TcError {
    #[error("[TC-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[TC-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[TC-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[TC-2001] refusing to operate outside {base}: {requested}")]
    ContainmentViolation { requested: PathBuf, base: PathBuf },

    #[error("[TC-2101] cannot read modification time of {path}: {source}")]
    StatFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[TC-2102] cannot enumerate {path}: {source}")]
    EnumerationFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[TC-2103] cannot remove {path}: {source}")]
    RemovalFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[TC-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TcError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "TC-1001",
            Self::MissingConfig { .. } => "TC-1002",
            Self::ConfigParse { .. } => "TC-1003",
            Self::ContainmentViolation { .. } => "TC-2001",
            Self::StatFailure { .. } => "TC-2101",
            Self::EnumerationFailure { .. } => "TC-2102",
            Self::RemovalFailure { .. } => "TC-2103",
            Self::Io { .. } => "TC-3002",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<toml::de::Error> for TcError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
