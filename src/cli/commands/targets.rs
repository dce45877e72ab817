//! Targets command implementation
//!
//! Implements `stepup-release targets`: a dry run of target resolution.

use anyhow::Result;
use serde::Serialize;

use crate::cli::commands::ProjectArgs;
use crate::cli::output::{is_json, is_quiet, print_detail, print_info, print_json, print_warning};
use crate::core::target::{
    resolve_targets, HostOs, HostRequirement, PlatformTarget, TargetSelection,
};
use crate::infra::host::detect_host;
use crate::infra::toolchain::is_available;

/// One row of the targets listing
#[derive(Debug, Serialize)]
struct TargetRow {
    target: PlatformTarget,
    required_host: HostRequirement,
    runs_here: bool,
}

fn rows(selection: &TargetSelection, host: &HostOs) -> Vec<TargetRow> {
    resolve_targets(selection, host)
        .iter()
        .map(|target| TargetRow {
            target,
            required_host: target.required_host(),
            runs_here: target.required_host().is_satisfied_by(host),
        })
        .collect()
}

/// Execute the targets command
pub fn execute(project: &ProjectArgs, selection: &TargetSelection) -> Result<()> {
    let project_dir = project.dir()?;
    let config = project.load_config(&project_dir)?;
    let host = detect_host();
    let rows = rows(selection, &host);

    if is_json() {
        return print_json(&serde_json::json!({
            "host": host,
            "toolchain": config.toolchain.program,
            "targets": rows,
        }));
    }
    if is_quiet() {
        return Ok(());
    }

    print_info(&format!("Host: {host}"));
    for row in &rows {
        let state = if row.runs_here { "build" } else { "skip" };
        print_detail(&format!(
            "{:<10} {:<8} requires {}",
            row.target.name(),
            state,
            row.required_host
        ));
    }
    if rows.is_empty() {
        print_warning("No known targets selected");
    }

    let program = config.toolchain.program.to_string_lossy();
    if !is_available(&program) {
        print_warning(&format!("'{program}' was not found on PATH"));
    }
    Ok(())
}
