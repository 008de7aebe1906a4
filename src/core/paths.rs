//! Path normalization and base-directory containment.
//!
//! Every target must resolve to the base directory or a strict descendant of
//! it before anything on disk is touched. Containment is decided on whole
//! path components, so `/tmp/Temp2` is never treated as living under
//! `/tmp/Temp`.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::core::errors::{Result, TcError};

/// Lexically remove `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root or a drive prefix.
#[must_use]
pub fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Resolve `path` to an absolute form with symlinks resolved.
///
/// Falls back to canonicalizing the deepest existing ancestor when the path
/// itself does not exist, so a missing leaf below a symlinked directory still
/// resolves through the link.
#[must_use]
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    if let Ok(resolved) = std::fs::canonicalize(&absolute) {
        return resolved;
    }

    let syntactic = normalize_syntactic(&absolute);
    if let Ok(resolved) = std::fs::canonicalize(&syntactic) {
        return resolved;
    }

    let mut tail: Vec<&OsStr> = Vec::new();
    let mut cursor = syntactic.as_path();
    while let (Some(name), Some(parent)) = (cursor.file_name(), cursor.parent()) {
        tail.push(name);
        cursor = parent;
        if let Ok(mut resolved) = std::fs::canonicalize(cursor) {
            for part in tail.iter().rev() {
                resolved.push(part);
            }
            return resolved;
        }
    }
    syntactic
}

/// Comparison key for a path: resolved, then case-folded where the host
/// filesystem is case-insensitive.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    fold_case(resolve_absolute_path(path))
}

#[cfg(windows)]
fn fold_case(path: PathBuf) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(windows))]
fn fold_case(path: PathBuf) -> PathBuf {
    path
}

/// True iff `requested` is `base` or lies beneath it on a component boundary.
#[must_use]
pub fn is_within_base(requested: &Path, base: &Path) -> bool {
    let requested = normalize_path(requested);
    let base = normalize_path(base);
    requested.starts_with(&base)
}

/// Containment check bound to one base directory.
#[derive(Debug, Clone)]
pub struct PathGuard {
    base: PathBuf,
}

impl PathGuard {
    /// Guard that admits `base` and its descendants only.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Validate `requested` and return its resolved form for traversal.
    ///
    /// Performs no filesystem mutation. A refusal is the only error.
    pub fn check(&self, requested: &Path) -> Result<PathBuf> {
        if is_within_base(requested, &self.base) {
            Ok(resolve_absolute_path(requested))
        } else {
            Err(TcError::ContainmentViolation {
                requested: requested.to_path_buf(),
                base: self.base.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn syntactic_normalization_collapses_dots() {
        assert_eq!(
            normalize_syntactic(Path::new("/tmp/./a/../b")),
            PathBuf::from("/tmp/b")
        );
        assert_eq!(
            normalize_syntactic(Path::new("/../../etc")),
            PathBuf::from("/etc")
        );
    }

    #[test]
    fn base_itself_is_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(is_within_base(dir.path(), dir.path()));
    }

    #[test]
    fn sibling_sharing_textual_prefix_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("Temp");
        let sibling = dir.path().join("Temp2");
        std::fs::create_dir(&base).expect("base");
        std::fs::create_dir(&sibling).expect("sibling");
        assert!(!is_within_base(&sibling, &base));
        assert!(is_within_base(&base.join("inner"), &base));
    }

    #[test]
    fn parent_traversal_out_of_base_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("Temp");
        std::fs::create_dir(&base).expect("base");
        let escape = base.join("missing").join("..").join("..");
        assert!(!is_within_base(&escape, &base));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_pointing_outside_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("Temp");
        let outside = dir.path().join("outside");
        std::fs::create_dir(&base).expect("base");
        std::fs::create_dir(&outside).expect("outside");
        let link = base.join("link");
        std::os::unix::fs::symlink(&outside, &link).expect("symlink");
        assert!(!is_within_base(&link, &base));
        assert!(!is_within_base(&link.join("not-yet-created"), &base));
    }

    #[test]
    fn guard_reports_containment_violation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("Temp");
        std::fs::create_dir(&base).expect("base");
        let guard = PathGuard::new(&base);
        let err = guard.check(dir.path()).expect_err("parent must be refused");
        assert_eq!(err.code(), "TC-2001");
        let ok = guard.check(&base).expect("base accepted");
        assert_eq!(ok, std::fs::canonicalize(&base).expect("canonical"));
    }

    proptest! {
        #[test]
        fn descendants_are_contained(segments in proptest::collection::vec("[a-z]{1,8}", 1..4)) {
            let dir = tempfile::tempdir().expect("tempdir");
            let mut requested = dir.path().to_path_buf();
            for segment in &segments {
                requested.push(segment);
            }
            prop_assert!(is_within_base(&requested, dir.path()));
        }

        #[test]
        fn textual_prefix_siblings_are_not_contained(name in "[a-z]{1,8}", suffix in "[a-z0-9]{1,4}") {
            let dir = tempfile::tempdir().expect("tempdir");
            let base = dir.path().join(&name);
            let sibling = dir.path().join(format!("{name}{suffix}"));
            prop_assert!(!is_within_base(&sibling, &base));
        }
    }
}
