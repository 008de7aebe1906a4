//! JSONL activity log: one JSON object per line, appended, never rewritten.
//!
//! A log that cannot be opened or written disables itself and leaves a single
//! warning for the caller to surface. The sweep never fails because of it.

#![allow(missing_docs)]

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::sweep::summary::{EntryError, EntryKind, ErrorKind, Outcome, RunSummary};
use crate::sweep::target::TargetSpec;
use crate::sweep::walker::SweepObserver;

/// One activity log event.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent<'a> {
    RunStart {
        target: &'a Path,
        base_dir: &'a Path,
        mode: String,
        dry_run: bool,
    },
    Outcome {
        path: &'a Path,
        kind: EntryKind,
        removed: bool,
        dry_run: bool,
        error: Option<&'a str>,
    },
    EntryError {
        path: &'a Path,
        kind: ErrorKind,
        code: &'static str,
        message: &'a str,
    },
    RunEnd {
        files_removed: u64,
        dirs_removed: u64,
        errors: usize,
        interrupted: bool,
    },
}

impl<'a> LogEvent<'a> {
    #[must_use]
    pub fn run_start(spec: &'a TargetSpec) -> Self {
        Self::RunStart {
            target: &spec.path,
            base_dir: &spec.base_dir,
            mode: spec.mode_label(),
            dry_run: spec.dry_run,
        }
    }

    #[must_use]
    pub fn outcome(outcome: &'a Outcome) -> Self {
        Self::Outcome {
            path: &outcome.path,
            kind: outcome.kind,
            removed: outcome.removed,
            dry_run: outcome.dry_run,
            error: outcome.error.as_ref().map(|error| error.message.as_str()),
        }
    }

    #[must_use]
    pub fn entry_error(error: &'a EntryError) -> Self {
        Self::EntryError {
            path: &error.path,
            kind: error.kind,
            code: error.code,
            message: &error.message,
        }
    }

    #[must_use]
    pub fn run_end(summary: &RunSummary) -> Self {
        Self::RunEnd {
            files_removed: summary.files_removed,
            dirs_removed: summary.dirs_removed,
            errors: summary.errors.len(),
            interrupted: summary.interrupted,
        }
    }
}

#[derive(Serialize)]
struct Record<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a LogEvent<'a>,
}

/// Appending JSONL writer.
#[derive(Debug)]
pub struct JsonlLogger {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    warning: Option<String>,
}

impl JsonlLogger {
    /// Logger that writes nothing.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            path: None,
            writer: None,
            warning: None,
        }
    }

    /// Open `path` for appending. On failure the logger starts disabled with
    /// a pending warning.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                path: Some(path.to_path_buf()),
                writer: Some(BufWriter::new(file)),
                warning: None,
            },
            Err(err) => Self {
                path: Some(path.to_path_buf()),
                writer: None,
                warning: Some(format!(
                    "activity log {} unavailable, continuing without it: {err}",
                    path.display()
                )),
            },
        }
    }

    /// Open the configured log, or a disabled logger when none is configured.
    #[must_use]
    pub fn from_config(path: Option<&Path>) -> Self {
        path.map_or_else(Self::disabled, Self::open)
    }

    /// Pending degradation warning, handed out once.
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    /// Append one timestamped line. A write failure disables the logger.
    pub fn log(&mut self, event: &LogEvent<'_>) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let record = Record {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };
        let result = serde_json::to_writer(&mut *writer, &record)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"));
        if let Err(err) = result {
            self.degrade(&err);
        }
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writer.flush() {
                self.degrade(&err);
            }
        }
    }

    fn degrade(&mut self, err: &std::io::Error) {
        self.writer = None;
        if self.warning.is_none() {
            let shown = self
                .path
                .as_deref()
                .map_or_else(String::new, |p| format!(" {}", p.display()));
            self.warning = Some(format!(
                "activity log{shown} write failed, logging disabled: {err}"
            ));
        }
    }
}

impl SweepObserver for JsonlLogger {
    fn on_outcome(&mut self, outcome: &Outcome) {
        self.log(&LogEvent::outcome(outcome));
    }

    fn on_entry_error(&mut self, error: &EntryError) {
        self.log(&LogEvent::entry_error(error));
    }
}

impl Drop for JsonlLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .expect("read log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json line"))
            .collect()
    }

    #[test]
    fn events_are_appended_as_tagged_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("activity.jsonl");
        let outcome = Outcome {
            path: dir.path().join("old.txt"),
            kind: EntryKind::File,
            removed: true,
            dry_run: false,
            error: None,
        };
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let error = EntryError::new(dir.path().join("locked"), ErrorKind::Stat, denied);

        {
            let mut logger = JsonlLogger::open(&path);
            assert!(logger.writer.is_some());
            logger.on_outcome(&outcome);
            logger.on_entry_error(&error);
            logger.log(&LogEvent::run_end(&RunSummary::new(false)));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "outcome");
        assert_eq!(lines[0]["kind"], "file");
        assert_eq!(lines[0]["removed"], true);
        assert!(lines[0]["ts"].as_str().is_some_and(|ts| ts.ends_with('Z')));
        assert_eq!(lines[1]["event"], "entry_error");
        assert_eq!(lines[1]["code"], "TC-2101");
        assert_eq!(lines[2]["event"], "run_end");
        assert_eq!(lines[2]["interrupted"], false);
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("activity.jsonl");
        for _ in 0..2 {
            let mut logger = JsonlLogger::open(&path);
            logger.log(&LogEvent::run_end(&RunSummary::new(true)));
        }
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn unopenable_log_degrades_with_one_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing-dir").join("activity.jsonl");
        let mut logger = JsonlLogger::open(&path);
        assert!(logger.writer.is_none());
        logger.log(&LogEvent::run_end(&RunSummary::new(true)));
        assert!(logger.take_warning().is_some());
        assert!(logger.take_warning().is_none());
    }

    #[test]
    fn disabled_logger_is_silent() {
        let mut logger = JsonlLogger::from_config(None);
        assert!(logger.writer.is_none());
        assert!(logger.path.is_none());
        logger.flush();
        assert!(logger.take_warning().is_none());
    }
}
