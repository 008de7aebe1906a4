//! Walk entries, per-entry outcomes, and the aggregate run summary.

#![allow(missing_docs)]

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::core::errors::TcError;

/// File or directory, as seen by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Short label used in notices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
        }
    }
}

/// One path discovered during traversal with the fact the policy needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A file (or a symlink, which is never followed) and its own mtime.
    File { path: PathBuf, modified: SystemTime },
    /// A directory and whether it had no entries when visited.
    Directory { path: PathBuf, is_empty: bool },
}

impl WalkEntry {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File { path, .. } | Self::Directory { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::File { .. } => EntryKind::File,
            Self::Directory { .. } => EntryKind::Directory,
        }
    }
}

/// Which step of the walk failed for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Modification time could not be read.
    Stat,
    /// Directory contents could not be listed.
    Enumeration,
    /// Removal was attempted and failed.
    Removal,
}

impl ErrorKind {
    /// Wrap an IO failure at `path` in the matching `TcError` variant.
    #[must_use]
    pub fn into_error(self, path: PathBuf, source: io::Error) -> TcError {
        match self {
            Self::Stat => TcError::StatFailure { path, source },
            Self::Enumeration => TcError::EnumerationFailure { path, source },
            Self::Removal => TcError::RemovalFailure { path, source },
        }
    }
}

/// A failure scoped to one path. Recorded, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub path: PathBuf,
    pub kind: ErrorKind,
    /// Code of the `TcError` the failure was built from.
    pub code: &'static str,
    /// The underlying IO error text.
    pub message: String,
}

impl EntryError {
    /// Capture `source` for `path`, taking the code from `TcError`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ErrorKind, source: io::Error) -> Self {
        let path = path.into();
        let message = source.to_string();
        let code = kind.into_error(path.clone(), source).code();
        Self {
            path,
            kind,
            code,
            message,
        }
    }
}

/// Result of one attempted removal. Kept entries produce no outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// True only when the entry was actually deleted.
    pub removed: bool,
    /// Preview outcome: nothing was touched.
    pub dry_run: bool,
    pub error: Option<EntryError>,
}

impl Outcome {
    /// Whether this outcome counts toward the targeted totals.
    #[must_use]
    pub const fn is_targeted(&self) -> bool {
        self.error.is_none() && (self.removed || self.dry_run)
    }
}

/// Aggregate of one run, built incrementally by the walker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files removed, or that would be removed in a dry run.
    pub files_removed: u64,
    /// Directories removed, or that would be removed in a dry run.
    pub dirs_removed: u64,
    /// Failures in the order they happened.
    pub errors: Vec<EntryError>,
    pub dry_run: bool,
    /// The walk stopped early on interrupt or deadline.
    pub interrupted: bool,
}

impl RunSummary {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Fold one outcome into the totals.
    pub fn record(&mut self, outcome: &Outcome) {
        if let Some(error) = &outcome.error {
            self.errors.push(error.clone());
            return;
        }
        if outcome.is_targeted() {
            match outcome.kind {
                EntryKind::File => self.files_removed += 1,
                EntryKind::Directory => self.dirs_removed += 1,
            }
        }
    }

    pub fn record_error(&mut self, error: EntryError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// First `limit` errors, for bounded display.
    #[must_use]
    pub fn error_preview(&self, limit: usize) -> &[EntryError] {
        &self.errors[..self.errors.len().min(limit)]
    }

    /// True when the most recent error concerns `path`.
    #[must_use]
    pub fn last_error_is_for(&self, path: &Path) -> bool {
        self.errors.last().is_some_and(|error| error.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: EntryKind, removed: bool, dry_run: bool) -> Outcome {
        Outcome {
            path: PathBuf::from("/tmp/x"),
            kind,
            removed,
            dry_run,
            error: None,
        }
    }

    #[test]
    fn dry_run_outcomes_count_as_targeted() {
        let mut summary = RunSummary::new(true);
        summary.record(&outcome(EntryKind::File, false, true));
        summary.record(&outcome(EntryKind::Directory, false, true));
        assert_eq!(summary.files_removed, 1);
        assert_eq!(summary.dirs_removed, 1);
        assert!(!summary.has_errors());
    }

    #[test]
    fn failed_outcomes_land_in_errors_only() {
        let mut summary = RunSummary::new(false);
        let mut failed = outcome(EntryKind::File, false, false);
        failed.error = Some(EntryError::new(
            "/tmp/x",
            ErrorKind::Removal,
            io::Error::from(io::ErrorKind::PermissionDenied),
        ));
        summary.record(&failed);
        assert_eq!(summary.files_removed, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.last_error_is_for(Path::new("/tmp/x")));
        assert_eq!(summary.errors[0].code, "TC-2103");
    }

    #[test]
    fn error_preview_is_bounded() {
        let mut summary = RunSummary::new(false);
        for i in 0..25 {
            summary.record_error(EntryError::new(
                format!("/tmp/{i}"),
                ErrorKind::Stat,
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }
        assert_eq!(summary.error_preview(20).len(), 20);
        assert_eq!(summary.error_preview(100).len(), 25);
        assert_eq!(summary.error_preview(20)[0].path, PathBuf::from("/tmp/0"));
    }

    #[test]
    fn entry_error_codes_follow_tc_error() {
        let cases = [
            (ErrorKind::Stat, "TC-2101"),
            (ErrorKind::Enumeration, "TC-2102"),
            (ErrorKind::Removal, "TC-2103"),
        ];
        for (kind, code) in cases {
            let error = EntryError::new("/tmp/x", kind, io::Error::other("busy"));
            assert_eq!(error.code, code);
            assert_eq!(error.message, "busy");
            let wrapped = kind.into_error(PathBuf::from("/tmp/x"), io::Error::other("busy"));
            assert_eq!(wrapped.code(), code);
            assert!(wrapped.to_string().starts_with(&format!("[{code}]")));
        }
    }
}
