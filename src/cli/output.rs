//! Output formatting and progress indicators
//!
//! Console rendering for the CLI: status lines, spinners and the release
//! summary. Everything here honours `--quiet` and `--json`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::outcome::{OutcomeStatus, StepOutcome};
use crate::core::pipeline::ReleaseReport;

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);

/// Global output settings taken from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything except errors
    pub quiet: bool,
    /// Machine-readable output
    pub json: bool,
    /// Verbosity level (`-v` count)
    pub verbose: u8,
}

impl OutputConfig {
    /// Output settings from CLI flags
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make these settings visible to every command
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
    }

    /// Log level for the tracing subscriber
    pub fn log_level(self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, _) => tracing::Level::DEBUG,
        }
    }
}

/// True if `--quiet` was given
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// True if `--json` was given
pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

fn is_plain() -> bool {
    !is_quiet() && !is_json()
}

/// Create a spinner for operations with unknown duration
///
/// Hidden in quiet and JSON modes.
pub fn create_spinner(message: &str) -> ProgressBar {
    if !is_plain() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (circle)
    pub const INFO: &str = "ℹ";

    /// Skipped step prefix
    pub const SKIPPED: &str = "-";
}

/// Print a success line
pub fn print_success(message: &str) {
    if is_plain() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print an informational line
pub fn print_info(message: &str) {
    if is_plain() {
        println!("{} {message}", status::INFO);
    }
}

/// Print a warning line to stderr
pub fn print_warning(message: &str) {
    if !is_quiet() {
        eprintln!("{} {message}", status::WARNING);
    }
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    if is_plain() {
        println!("    {message}");
    }
}

/// Print an error and its cause chain to stderr
pub fn display_error(error: &anyhow::Error) {
    if is_json() {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let value = serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "causes": causes,
        });
        eprintln!("{value}");
        return;
    }

    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("    caused by: {cause}");
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn outcome_prefix(outcome: &StepOutcome) -> &'static str {
    match outcome.status {
        OutcomeStatus::Success => status::SUCCESS,
        OutcomeStatus::Skipped => status::SKIPPED,
        OutcomeStatus::Failed => status::ERROR,
    }
}

/// Render the release summary
pub fn print_report(report: &ReleaseReport) -> anyhow::Result<()> {
    if is_json() {
        return print_json(report);
    }

    for warning in &report.warnings {
        print_warning(warning);
    }

    if is_quiet() {
        for outcome in report
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
        {
            eprintln!(
                "{} {} {}: {}",
                status::ERROR,
                outcome.phase,
                outcome.target,
                outcome.diagnostic.as_deref().unwrap_or_default()
            );
        }
        return Ok(());
    }

    println!();
    println!("Release v{} ({} host)", report.version, report.host);
    for outcome in &report.outcomes {
        let line = format!("{} {:<8} {}", outcome_prefix(outcome), outcome.phase, outcome.target);
        match &outcome.diagnostic {
            Some(diagnostic) => println!("  {line}: {diagnostic}"),
            None => println!("  {line}"),
        }
    }

    if !report.artifacts.is_empty() {
        println!();
        println!("Artifacts in {}:", report.release_dir.display());
        for artifact in &report.artifacts {
            let name = artifact
                .path
                .file_name()
                .map_or_else(|| artifact.path.display().to_string(), |n| {
                    n.to_string_lossy().into_owned()
                });
            println!("  {name} ({:.1} MB)", artifact.size_mib());
        }
    }

    println!();
    let aggregate = &report.aggregate;
    if aggregate.overall_success {
        print_success(&format!("Release v{} complete", report.version));
        if !aggregate.skipped_targets.is_empty() {
            print_detail(&format!(
                "Skipped on this host: {}",
                join_names(&aggregate.skipped_targets)
            ));
        }
    } else {
        eprintln!(
            "{} Release v{} failed: {}",
            status::ERROR,
            report.version,
            join_names(&aggregate.failed_targets)
        );
    }
    Ok(())
}

fn join_names(targets: &[crate::core::target::PlatformTarget]) -> String {
    targets
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_flags() {
        assert_eq!(OutputConfig::new(false, false, 0).log_level(), tracing::Level::WARN);
        assert_eq!(OutputConfig::new(false, false, 1).log_level(), tracing::Level::INFO);
        assert_eq!(OutputConfig::new(false, false, 3).log_level(), tracing::Level::DEBUG);
        assert_eq!(OutputConfig::new(true, false, 2).log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_join_names() {
        use crate::core::target::PlatformTarget::{Android, Ios};
        assert_eq!(join_names(&[Ios, Android]), "ios, android");
        assert_eq!(join_names(&[]), "");
    }
}
