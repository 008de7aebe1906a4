//! Bottom-up traversal of the target subtree.
//!
//! Children are always visited before their parent, so a directory emptied
//! earlier in the same run is seen as empty when its own turn comes. The
//! target root itself is never a candidate, and symlinks are never followed.

use std::io;
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::sweep::cancel::CancelToken;
use crate::sweep::executor::{Executor, FsOps, RealFs};
use crate::sweep::policy::decide;
use crate::sweep::summary::{EntryError, ErrorKind, Outcome, RunSummary, WalkEntry};
use crate::sweep::target::TargetSpec;

/// Receives walk events as they happen.
///
/// `on_outcome` fires for every attempted (or previewed) removal, including
/// failed ones. `on_entry_error` fires for stat and enumeration failures that
/// never reached a decision.
pub trait SweepObserver {
    /// A removal was attempted, previewed, or failed.
    fn on_outcome(&mut self, _outcome: &Outcome) {}
    /// An entry could not be inspected and was skipped.
    fn on_entry_error(&mut self, _error: &EntryError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SweepObserver for NullObserver {}

/// Single-threaded walker over one validated target.
#[derive(Debug, Clone, Default)]
pub struct TreeWalker<F: FsOps = RealFs> {
    executor: Executor<F>,
    cancel: CancelToken,
}

impl TreeWalker<RealFs> {
    /// Walker over the host filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fs(RealFs)
    }
}

impl<F: FsOps> TreeWalker<F> {
    /// Walker whose inspection and removal go through `fs`.
    #[must_use]
    pub fn with_fs(fs: F) -> Self {
        Self {
            executor: Executor::new(fs),
            cancel: CancelToken::new(),
        }
    }

    /// Stop between entries once `cancel` fires.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Walk `spec.path`, sampling the clock once for the whole run.
    pub fn walk(&self, spec: &TargetSpec, observer: &mut dyn SweepObserver) -> RunSummary {
        self.walk_at(spec, SystemTime::now(), observer)
    }

    /// Walk with an explicit `now` used for every age comparison.
    pub fn walk_at(
        &self,
        spec: &TargetSpec,
        now: SystemTime,
        observer: &mut dyn SweepObserver,
    ) -> RunSummary {
        let mut summary = RunSummary::new(spec.dry_run);
        let entries = WalkDir::new(&spec.path)
            .min_depth(1)
            .follow_links(false)
            .contents_first(true)
            .sort_by_file_name();

        for item in entries {
            if self.cancel.is_cancelled() {
                summary.interrupted = true;
                break;
            }

            let dent = match item {
                Ok(dent) => dent,
                Err(err) => {
                    let path = err.path().unwrap_or(spec.path.as_path()).to_path_buf();
                    record_error(
                        &mut summary,
                        observer,
                        EntryError::new(path, ErrorKind::Enumeration, io::Error::from(err)),
                    );
                    continue;
                }
            };

            let Some(entry) = self.inspect(&dent, &mut summary, observer) else {
                continue;
            };
            let decision = decide(&entry, spec, now);
            if let Some(outcome) = self.executor.apply(&entry, decision, spec.dry_run) {
                observer.on_outcome(&outcome);
                summary.record(&outcome);
            }
        }
        summary
    }

    /// Gather the fact the policy needs for one entry, recording failures.
    fn inspect(
        &self,
        dent: &walkdir::DirEntry,
        summary: &mut RunSummary,
        observer: &mut dyn SweepObserver,
    ) -> Option<WalkEntry> {
        let path = dent.path();
        if dent.file_type().is_dir() {
            match self.executor.fs().is_dir_empty(path) {
                Ok(is_empty) => Some(WalkEntry::Directory {
                    path: path.to_path_buf(),
                    is_empty,
                }),
                Err(err) => {
                    // An unreadable directory was already reported while descending.
                    if !summary.last_error_is_for(path) {
                        record_error(
                            summary,
                            observer,
                            EntryError::new(path, ErrorKind::Enumeration, err),
                        );
                    }
                    None
                }
            }
        } else {
            match self.executor.fs().modified(path) {
                Ok(modified) => Some(WalkEntry::File {
                    path: path.to_path_buf(),
                    modified,
                }),
                Err(err) => {
                    record_error(summary, observer, EntryError::new(path, ErrorKind::Stat, err));
                    None
                }
            }
        }
    }
}

fn record_error(summary: &mut RunSummary, observer: &mut dyn SweepObserver, error: EntryError) {
    observer.on_entry_error(&error);
    summary.record_error(error);
}

/// Convenience wrapper: walk `spec` on the host filesystem with no observer.
pub fn walk(spec: &TargetSpec) -> RunSummary {
    TreeWalker::new().walk(spec, &mut NullObserver)
}
