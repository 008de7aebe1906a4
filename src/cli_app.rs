//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde::Serialize;
use thiserror::Error;

use tmpclean::core::config::Config;
use tmpclean::core::errors::TcError;
use tmpclean::logger::jsonl::{JsonlLogger, LogEvent};
use tmpclean::sweep::{
    CancelToken, EntryError, Outcome, RunSummary, SweepObserver, TargetSpec, TreeWalker,
};

/// Environment override for the output format (`human` or `json`).
const OUTPUT_FORMAT_ENV: &str = "TMPCLEAN_OUTPUT_FORMAT";

/// tmpclean: safely clear old files from a temporary directory.
#[derive(Debug, Parser)]
#[command(
    name = "tmpclean",
    author,
    version,
    about = "Safely clear old files from a temporary directory",
    long_about = None
)]
pub struct Cli {
    /// Target temp folder (must be under the configured base directory).
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,
    /// Remove files older than this many days.
    #[arg(long, value_name = "DAYS")]
    days: Option<u64>,
    /// Remove all files and directories regardless of age (use with caution).
    #[arg(long)]
    all: bool,
    /// Perform deletions. Omitting keeps dry-run mode.
    #[arg(long)]
    doit: bool,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print the summary as one JSON object.
    #[arg(long)]
    json: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Print every outcome, including completed removals.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Only print the final summary.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    completions: Option<CompletionShell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or refused target.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Run completed with per-entry failures or stopped early.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<TcError> for CliError {
    fn from(value: TcError) -> Self {
        match value {
            TcError::ContainmentViolation { base, .. } => {
                Self::User(format!("Refusing to operate outside {}", base.display()))
            }
            TcError::InvalidConfig { .. }
            | TcError::MissingConfig { .. }
            | TcError::ConfigParse { .. } => Self::User(value.to_string()),
            other => Self::Runtime(other.to_string()),
        }
    }
}

/// Run one cleanup pass as described by the parsed flags.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color || !io::stdout().is_terminal() {
        control::set_override(false);
    }

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        let binary_name = command.get_name().to_string();
        generate(shell, &mut command, binary_name, &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let requested = cli
        .path
        .clone()
        .unwrap_or_else(|| config.paths.target().to_path_buf());
    let days = cli.days.unwrap_or(config.policy.default_days);
    let spec = TargetSpec::new(&requested, &config.paths.base_dir, days, cli.all, !cli.doit)?;

    let mode = output_mode(cli);
    if mode == OutputMode::Human {
        print_header(&spec);
    }

    let mut cancel = CancelToken::new();
    if let Some(secs) = config.limits.max_runtime_secs {
        cancel = cancel.with_deadline(Duration::from_secs(secs));
    }
    if let Err(err) = cancel.register_signals() {
        eprintln!("warning: interrupt handling unavailable: {err}");
    }

    let mut logger = JsonlLogger::from_config(config.log.jsonl_path.as_deref());
    report_log_warning(&mut logger);
    logger.log(&LogEvent::run_start(&spec));

    let summary = {
        let mut observer = ConsoleObserver {
            mode,
            verbosity: verbosity(cli),
            logger: &mut logger,
        };
        TreeWalker::new()
            .with_cancel(cancel)
            .walk(&spec, &mut observer)
    };

    logger.log(&LogEvent::run_end(&summary));
    logger.flush();
    report_log_warning(&mut logger);

    match mode {
        OutputMode::Human => print_summary(&summary, config.report.error_preview_limit)?,
        OutputMode::Json => emit_summary_json(&requested, &spec, &summary)?,
    }

    if summary.interrupted {
        return Err(CliError::Partial(
            "run interrupted before completion; summary is partial".to_string(),
        ));
    }
    if summary.has_errors() {
        return Err(CliError::Partial(format!(
            "{} item(s) could not be processed",
            summary.errors.len()
        )));
    }
    Ok(())
}

/// Prints per-entry notices and forwards every event to the activity log.
struct ConsoleObserver<'a> {
    mode: OutputMode,
    verbosity: Verbosity,
    logger: &'a mut JsonlLogger,
}

impl SweepObserver for ConsoleObserver<'_> {
    fn on_outcome(&mut self, outcome: &Outcome) {
        self.logger.on_outcome(outcome);
        if self.mode == OutputMode::Json || self.verbosity == Verbosity::Quiet {
            return;
        }
        let label = outcome.kind.label();
        if outcome.dry_run {
            println!("Would remove {label}: {}", outcome.path.display());
        } else if self.verbosity == Verbosity::Verbose {
            match &outcome.error {
                None => println!("Removed {label}: {}", outcome.path.display()),
                Some(error) => println!(
                    "{} {label}: {} -> {}",
                    "Failed to remove".yellow(),
                    outcome.path.display(),
                    error.message
                ),
            }
        }
    }

    fn on_entry_error(&mut self, error: &EntryError) {
        self.logger.on_entry_error(error);
        if self.mode == OutputMode::Human && self.verbosity == Verbosity::Verbose {
            println!(
                "{} {} -> {}",
                "Skipped".yellow(),
                error.path.display(),
                error.message
            );
        }
    }
}

fn print_header(spec: &TargetSpec) {
    println!("{} {}", "Target:".bold(), spec.path.display());
    println!("{} {}", "Mode:".bold(), spec.mode_label());
    println!("{} {}", "Action:".bold(), spec.action_label());
}

fn print_summary(summary: &RunSummary, error_limit: usize) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Files targeted: {}, Dirs targeted: {}",
        summary.files_removed, summary.dirs_removed
    )?;
    if summary.has_errors() {
        writeln!(
            stdout,
            "{}",
            "Some items could not be removed (permission/in-use):".yellow()
        )?;
        for error in summary.error_preview(error_limit) {
            writeln!(stdout, "  {} -> {}", error.path.display(), error.message)?;
        }
        let hidden = summary.errors.len().saturating_sub(error_limit);
        if hidden > 0 {
            writeln!(stdout, "  ... and {hidden} more")?;
        }
    }
    if summary.interrupted {
        writeln!(
            stdout,
            "{}",
            "Run interrupted before completion; summary is partial.".red()
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    target: &'a Path,
    resolved_target: &'a Path,
    base_dir: &'a Path,
    mode: String,
    action: &'static str,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

fn emit_summary_json(
    requested: &Path,
    spec: &TargetSpec,
    summary: &RunSummary,
) -> Result<(), CliError> {
    let report = JsonReport {
        target: requested,
        resolved_target: &spec.path,
        base_dir: &spec.base_dir,
        mode: spec.mode_label(),
        action: spec.action_label(),
        summary,
    };
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &report)?;
    writeln!(stdout)?;
    Ok(())
}

fn report_log_warning(logger: &mut JsonlLogger) {
    if let Some(warning) = logger.take_warning() {
        eprintln!("warning: {warning}");
    }
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var(OUTPUT_FORMAT_ENV).ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }
    match env_mode.map(str::trim) {
        Some(mode) if mode.eq_ignore_ascii_case("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}

const fn verbosity(cli: &Cli) -> Verbosity {
    if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_are_dry_run_with_config_days() {
        let cli = Cli::try_parse_from(["tmpclean"]).expect("parse");
        assert!(!cli.doit);
        assert!(!cli.all);
        assert!(cli.days.is_none());
        assert!(cli.path.is_none());
        assert_eq!(verbosity(&cli), Verbosity::Normal);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["tmpclean", "-v", "-q"]).is_err());
    }

    #[test]
    fn negative_days_are_rejected() {
        assert!(Cli::try_parse_from(["tmpclean", "--days", "-1"]).is_err());
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(resolve_output_mode(true, Some("human")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("JSON")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("human")), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, None), OutputMode::Human);
    }

    #[test]
    fn containment_violation_maps_to_user_exit_code() {
        let err = CliError::from(TcError::ContainmentViolation {
            requested: PathBuf::from("/home"),
            base: PathBuf::from("/tmp"),
        });
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Refusing to operate outside /tmp");
    }

    #[test]
    fn partial_runs_exit_with_four() {
        assert_eq!(CliError::Partial("x".to_string()).exit_code(), 4);
    }
}
