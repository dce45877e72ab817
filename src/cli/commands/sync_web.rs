//! Website version sync
//!
//! Implements `stepup-release sync-web`: copies the version from
//! `pubspec.yaml` into the download page script.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::commands::ProjectArgs;
use crate::cli::output::{is_json, print_json, print_success};
use crate::config::defaults;
use crate::core::manifest::{update_website_script, Manifest};
use crate::core::version::ReleaseVersion;

/// Execute the sync-web command
pub fn execute(project: &ProjectArgs, script: Option<&Path>) -> Result<()> {
    let project_dir = project.dir()?;
    let config = project.load_config(&project_dir)?;

    let manifest = Manifest::new(project_dir.join(defaults::MANIFEST_FILE));
    let current = manifest.current_version()?;
    let version = ReleaseVersion::parse(&current)
        .with_context(|| format!("{} has an unusable version", manifest.path().display()))?;

    let script = project_dir.join(script.unwrap_or(&config.website.script));
    update_website_script(&script, &version)
        .with_context(|| format!("Failed to update {}", script.display()))?;

    if is_json() {
        return print_json(&serde_json::json!({
            "status": "success",
            "version": version.to_string(),
            "script": script,
        }));
    }
    print_success(&format!("Website version set to {version}"));
    Ok(())
}
