//! Immutable description of one cleanup run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::core::errors::{Result, TcError};
use crate::core::paths::PathGuard;

/// Seconds in one day of age threshold.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Everything one run needs. Constructed once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSpec {
    /// Resolved directory to sweep. Already validated against `base_dir`.
    pub path: PathBuf,
    /// Base directory the target was validated against.
    pub base_dir: PathBuf,
    /// Files strictly older than this are removed.
    pub age_threshold: Duration,
    /// Remove every file and directory regardless of age or emptiness.
    pub remove_all: bool,
    /// Report decisions without touching the filesystem.
    pub dry_run: bool,
}

impl TargetSpec {
    /// Validate `requested` against `base_dir` and build the run spec.
    ///
    /// Returns `ContainmentViolation` without touching the tree when the
    /// target is outside the base.
    pub fn new(
        requested: &Path,
        base_dir: &Path,
        days: u64,
        remove_all: bool,
        dry_run: bool,
    ) -> Result<Self> {
        let age_threshold = days_to_threshold(days)?;
        let path = PathGuard::new(base_dir).check(requested)?;
        Ok(Self {
            path,
            base_dir: base_dir.to_path_buf(),
            age_threshold,
            remove_all,
            dry_run,
        })
    }

    /// Human label for the active removal mode.
    #[must_use]
    pub fn mode_label(&self) -> String {
        if self.remove_all {
            "ALL".to_string()
        } else {
            format!(
                "older than {} days",
                self.age_threshold.as_secs() / SECONDS_PER_DAY
            )
        }
    }

    /// Human label for the action mode.
    #[must_use]
    pub const fn action_label(&self) -> &'static str {
        if self.dry_run {
            "dry-run (no changes)"
        } else {
            "execute deletions"
        }
    }
}

/// Convert a day count to an age threshold, rejecting overflow.
pub fn days_to_threshold(days: u64) -> Result<Duration> {
    days.checked_mul(SECONDS_PER_DAY)
        .map(Duration::from_secs)
        .ok_or_else(|| TcError::InvalidConfig {
            details: format!("--days {days} overflows the age threshold"),
        })
}
