//! Sweep engine: target spec, deletion policy, executor, bottom-up walker.

pub mod cancel;
pub mod executor;
pub mod policy;
pub mod summary;
pub mod target;
pub mod walker;

pub use cancel::CancelToken;
pub use executor::{Executor, FsOps, RealFs};
pub use policy::{Decision, decide};
pub use summary::{EntryError, EntryKind, ErrorKind, Outcome, RunSummary, WalkEntry};
pub use target::TargetSpec;
pub use walker::{NullObserver, SweepObserver, TreeWalker};
