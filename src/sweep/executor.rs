//! Apply a decision: dry-run preview or real removal.
//!
//! Removal failures are captured in the returned [`Outcome`]; nothing here
//! aborts the walk.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::sweep::policy::Decision;
use crate::sweep::summary::{EntryError, EntryKind, ErrorKind, Outcome, WalkEntry};

/// Filesystem operations the walker and executor depend on.
pub trait FsOps {
    /// Best-effort: make the entry writable before removal.
    fn clear_readonly(&self, path: &Path) -> io::Result<()>;
    /// Remove a file or a symlink (never its target).
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    /// Remove a directory and anything left inside it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Whether a directory has no entries right now.
    fn is_dir_empty(&self, path: &Path) -> io::Result<bool>;
    /// Modification time of the entry itself; a symlink is not followed.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// Host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsOps for RealFs {
    #[cfg(unix)]
    fn clear_readonly(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let meta = fs::symlink_metadata(path)?;
        // chmod would act on the link target.
        if meta.file_type().is_symlink() {
            return Ok(());
        }
        let mut perms = meta.permissions();
        let mode = perms.mode();
        if mode & 0o200 == 0 {
            perms.set_mode(mode | 0o200);
            fs::set_permissions(path, perms)?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::permissions_set_readonly_false)]
    fn clear_readonly(&self, path: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.file_type().is_symlink() {
            return Ok(());
        }
        let mut perms = meta.permissions();
        if perms.readonly() {
            perms.set_readonly(false);
            fs::set_permissions(path, perms)?;
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            // Directory symlinks on Windows are unlinked with remove_dir.
            Err(err) if cfg!(windows) && is_dir_symlink(path) => {
                fs::remove_dir(path).map_err(|_| err)
            }
            other => other,
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn is_dir_empty(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::read_dir(path)?.next().is_none())
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::symlink_metadata(path)?.modified()
    }
}

fn is_dir_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
        && fs::metadata(path).is_ok_and(|meta| meta.is_dir())
}

/// Carries out removal decisions against an [`FsOps`] backend.
#[derive(Debug, Clone, Default)]
pub struct Executor<F: FsOps = RealFs> {
    fs: F,
}

impl<F: FsOps> Executor<F> {
    /// Executor that removes through `fs`.
    #[must_use]
    pub const fn new(fs: F) -> Self {
        Self { fs }
    }

    /// The filesystem seam, shared with the walker for inspection.
    #[must_use]
    pub const fn fs(&self) -> &F {
        &self.fs
    }

    /// Apply `decision` to `entry`.
    ///
    /// Returns `None` for [`Decision::Keep`]: kept entries are not tracked.
    pub fn apply(&self, entry: &WalkEntry, decision: Decision, dry_run: bool) -> Option<Outcome> {
        if decision == Decision::Keep {
            return None;
        }
        let path = entry.path();
        let kind = entry.kind();
        if dry_run {
            return Some(Outcome {
                path: path.to_path_buf(),
                kind,
                removed: false,
                dry_run: true,
                error: None,
            });
        }

        let result = match kind {
            EntryKind::File => {
                let _ = self.fs.clear_readonly(path);
                self.fs.remove_file(path)
            }
            EntryKind::Directory => self.fs.remove_dir_all(path),
        };

        Some(match result {
            Ok(()) => Outcome {
                path: path.to_path_buf(),
                kind,
                removed: true,
                dry_run: false,
                error: None,
            },
            Err(err) => Outcome {
                path: path.to_path_buf(),
                kind,
                removed: false,
                dry_run: false,
                error: Some(EntryError::new(path, ErrorKind::Removal, err)),
            },
        })
    }
}
