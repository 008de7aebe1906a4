//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{Duration, SystemTime};

use filetime::FileTime;

/// Captured result of one CLI invocation.
pub struct CliCaseResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    /// Per-case transcript, kept for failure diagnosis.
    pub log_path: PathBuf,
}

/// Run the `tmpclean` binary with `args` and record a transcript.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CliCaseResult {
    let output = Command::new(env!("CARGO_BIN_EXE_tmpclean"))
        .args(args)
        .env_remove("TMPCLEAN_CONFIG")
        .env_remove("TMPCLEAN_OUTPUT_FORMAT")
        .env("NO_COLOR", "1")
        .output()
        .expect("spawn tmpclean");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let log_dir = std::env::temp_dir().join("tmpclean-test-logs");
    let _ = fs::create_dir_all(&log_dir);
    let log_path = log_dir.join(format!("{case_name}.log"));
    let transcript = format!(
        "args: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status
    );
    let _ = fs::write(&log_path, transcript);

    CliCaseResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Write a config file whose base directory is `base`.
pub fn write_config(dir: &Path, base: &Path, extra: &str) -> PathBuf {
    let path = dir.join("tmpclean.toml");
    let base = base.to_string_lossy().replace('\\', "\\\\");
    fs::write(&path, format!("[paths]\nbase_dir = \"{base}\"\n{extra}"))
        .expect("write config");
    path
}

/// Create a file whose mtime is `age_days` in the past.
pub fn write_aged(path: &Path, age_days: u64) {
    fs::write(path, b"data").expect("write fixture");
    let mtime = SystemTime::now() - Duration::from_secs(age_days * 86_400);
    filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).expect("set mtime");
}
