//! Keep/remove decision. Pure: no I/O, no clock reads.

use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::sweep::summary::WalkEntry;
use crate::sweep::target::TargetSpec;

/// What to do with one walk entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Leave the entry in place; no outcome is recorded.
    Keep,
    /// Remove the entry, or preview its removal in a dry run.
    Remove,
}

/// Decide the fate of `entry` relative to the run's sampled `now`.
///
/// Files are removed when strictly older than the threshold. Directories are
/// removed when empty at visit time; age never applies to them. Remove-all
/// mode overrides both.
#[must_use]
pub fn decide(entry: &WalkEntry, spec: &TargetSpec, now: SystemTime) -> Decision {
    if spec.remove_all {
        return Decision::Remove;
    }
    let remove = match entry {
        WalkEntry::File { modified, .. } => age_at(*modified, now) > spec.age_threshold,
        WalkEntry::Directory { is_empty, .. } => *is_empty,
    };
    if remove {
        Decision::Remove
    } else {
        Decision::Keep
    }
}

/// Age of an mtime at `now`. Timestamps in the future have zero age.
#[must_use]
pub fn age_at(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}
