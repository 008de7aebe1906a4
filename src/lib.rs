#![forbid(unsafe_code)]

//! tmpclean: one-pass cleanup of a temporary-file directory tree.
//!
//! The pass is split into:
//! 1. **Path guard**: refuses any target outside the configured base directory
//! 2. **Tree walker**: bottom-up traversal that never follows symlinks
//! 3. **Deletion policy**: pure keep/remove decision by age or remove-all mode
//! 4. **Executor**: dry-run notice or real removal, failures captured per entry

pub mod core;
pub mod logger;
pub mod sweep;
