//! Release command implementation
//!
//! Implements `stepup-release release` to build and package every selected
//! target.

use anyhow::{bail, Context, Result};

use crate::cli::commands::ProjectArgs;
use crate::cli::output::{create_spinner, print_report};
use crate::core::pipeline::{PipelineOptions, ReleasePipeline};
use crate::infra::host::detect_host;
use crate::infra::toolchain::SystemRunner;

/// Execute the release command
pub async fn execute(project: &ProjectArgs, options: &PipelineOptions) -> Result<()> {
    let project_dir = project.dir()?;
    let config = project.load_config(&project_dir)?;

    let runner = SystemRunner;
    let pipeline = ReleasePipeline::new(&project_dir, config, detect_host(), &runner);

    let spinner = create_spinner(&format!("Releasing v{}...", options.version));
    let result = pipeline.run(options).await;
    spinner.finish_and_clear();

    let report = result.with_context(|| format!("Release v{} aborted", options.version))?;
    print_report(&report)?;

    if !report.is_success() {
        let failed: Vec<&str> = report
            .aggregate
            .failed_targets
            .iter()
            .map(|t| t.name())
            .collect();
        bail!("Failed targets: {}", failed.join(", "));
    }
    Ok(())
}
