//! Release pipeline
//!
//! Drives a release from a version string to a directory of artifacts:
//!
//! 1. validate the version
//! 2. rewrite the manifest version
//! 3. `clean` and `pub get` (both must succeed)
//! 4. prefetch native dependencies through the mirror chain
//! 5. build every target, then package every target
//! 6. summarize
//!
//! Stages run strictly in order. The first failed step ends the run; the
//! report still carries everything recorded up to that point.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::defaults;
use crate::core::config::ReleaseConfig;
use crate::core::manifest::Manifest;
use crate::core::mirror::{MirrorResolver, ResolvedResource};
use crate::core::outcome::{
    aggregate, Aggregate, OutcomeStatus, Phase, ReleaseArtifact, StepOutcome,
};
use crate::core::package::ReleaseLayout;
use crate::core::step::StepExecutor;
use crate::core::target::{resolve_targets, HostOs, PlatformTarget, TargetSelection, TargetSet};
use crate::core::version::ReleaseVersion;
use crate::error::ReleaseError;
use crate::infra::download::DownloadManager;
use crate::infra::filesystem;
use crate::infra::toolchain::CommandRunner;

/// Which loops a run executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Prepare, build and package
    #[default]
    Full,
    /// Prepare and build; no packaging
    BuildOnly,
    /// Package existing build output only
    PackageOnly,
}

impl RunMode {
    /// Mode from the CLI's mutually exclusive flags
    pub fn from_flags(build_only: bool, package_only: bool) -> Self {
        match (build_only, package_only) {
            (true, _) => Self::BuildOnly,
            (false, true) => Self::PackageOnly,
            (false, false) => Self::Full,
        }
    }

    fn builds(self) -> bool {
        self != Self::PackageOnly
    }

    fn packages(self) -> bool {
        self != Self::BuildOnly
    }
}

/// Options for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Version as typed by the operator
    pub version: String,
    /// Target selection
    pub selection: TargetSelection,
    /// Loops to run
    pub mode: RunMode,
}

/// Everything a run recorded
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
    /// Released version
    pub version: String,
    /// Host the run executed on
    pub host: HostOs,
    /// Mode the run executed in
    pub mode: RunMode,
    /// Working target set
    pub targets: TargetSet,
    /// Release output directory
    pub release_dir: PathBuf,
    /// Step outcomes in execution order
    pub outcomes: Vec<StepOutcome>,
    /// Pass/fail decision
    pub aggregate: Aggregate,
    /// Non-fatal problems
    pub warnings: Vec<String>,
    /// Files staged into the release directory
    pub artifacts: Vec<ReleaseArtifact>,
}

impl ReleaseReport {
    /// True if no step failed
    pub fn is_success(&self) -> bool {
        self.aggregate.overall_success
    }
}

/// Release pipeline for one project
pub struct ReleasePipeline<'r> {
    project_dir: PathBuf,
    config: ReleaseConfig,
    host: HostOs,
    runner: &'r dyn CommandRunner,
}

impl<'r> ReleasePipeline<'r> {
    /// Create a pipeline
    pub fn new(
        project_dir: &Path,
        config: ReleaseConfig,
        host: HostOs,
        runner: &'r dyn CommandRunner,
    ) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            config,
            host,
            runner,
        }
    }

    /// Resolve the working target set without running anything
    pub fn targets(&self, selection: &TargetSelection) -> TargetSet {
        resolve_targets(selection, &self.host)
    }

    /// Run the pipeline
    ///
    /// Returns `Err` only for fatal stage errors (invalid version, manifest,
    /// `clean`/`pub get`, filesystem). Failed steps are reported in the
    /// returned [`ReleaseReport`].
    pub async fn run(&self, options: &PipelineOptions) -> Result<ReleaseReport, ReleaseError> {
        let version = ReleaseVersion::parse(&options.version)?;
        let targets = self.targets(&options.selection);
        tracing::info!(
            "Releasing {} v{version} on {} host, targets: {}",
            self.config.app_name,
            self.host,
            display_targets(&targets)
        );

        let layout = ReleaseLayout::new(&self.project_dir, &self.config.app_name, version);
        let executor = StepExecutor::new(layout, self.host.clone(), &self.config, self.runner);
        let mut run = RunRecord::default();

        if options.mode.builds() {
            self.update_manifest(&version, &mut run.warnings)?;

            tracing::info!("Preparing build environment");
            executor.run_toolchain(&["clean"])?;
            executor.run_toolchain(&["pub", "get"])?;

            self.prefetch(&mut run.warnings).await;

            run.step_all(&executor, &targets, Phase::Build);
        }

        if options.mode.packages() && !run.halted {
            filesystem::create_dir_all(&executor.layout().release_dir())?;
            run.step_all(&executor, &targets, Phase::Package);
        }

        Ok(ReleaseReport {
            version: version.to_string(),
            host: self.host.clone(),
            mode: options.mode,
            targets,
            release_dir: executor.layout().release_dir(),
            aggregate: aggregate(&run.outcomes),
            outcomes: run.outcomes,
            warnings: run.warnings,
            artifacts: run.artifacts,
        })
    }

    fn update_manifest(
        &self,
        version: &ReleaseVersion,
        warnings: &mut Vec<String>,
    ) -> Result<(), ReleaseError> {
        let manifest = Manifest::new(self.project_dir.join(defaults::MANIFEST_FILE));
        let current = manifest.current_version()?;

        if let Ok(previous) = semver::Version::parse(&current) {
            if version.is_older_than(&previous) {
                let warning = format!("version {version} is lower than current {previous}");
                tracing::warn!("{warning}");
                warnings.push(warning);
            }
        }

        manifest.write_version(version)?;
        tracing::info!("Updated {} from {current} to {version}", manifest.path().display());
        Ok(())
    }

    async fn prefetch(&self, warnings: &mut Vec<String>) {
        let Some(cache_dir) = self.config.prefetch_cache_dir() else {
            tracing::info!("No dependency cache directory, skipping prefetch");
            return;
        };
        if !cache_dir.is_dir() {
            tracing::info!(
                "Dependency cache {} does not exist, skipping prefetch",
                cache_dir.display()
            );
            return;
        }

        let resolver = MirrorResolver::new(
            self.config.mirror_set(),
            DownloadManager::with_timeout(self.config.fetch_timeout()),
        );

        for artifact in &self.config.prefetch.artifacts {
            let dest = cache_dir.join(&artifact.dest);
            match resolver.resolve(&artifact.url, &dest).await {
                Ok(ResolvedResource::AlreadyPresent(path)) => {
                    tracing::debug!("{} already cached", path.display());
                }
                Ok(ResolvedResource::Downloaded { path, source, .. }) => {
                    tracing::info!("Fetched {} from {source}", path.display());
                }
                Err(e) => {
                    let warning = format!("could not prefetch {}: {e}", artifact.url);
                    tracing::warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }
    }
}

/// Outcomes, warnings and artifacts accumulated during a run
#[derive(Default)]
struct RunRecord {
    outcomes: Vec<StepOutcome>,
    warnings: Vec<String>,
    artifacts: Vec<ReleaseArtifact>,
    halted: bool,
}

impl RunRecord {
    /// Run one phase over every target, halting at the first failure
    fn step_all(&mut self, executor: &StepExecutor<'_>, targets: &TargetSet, phase: Phase) {
        for target in targets.iter() {
            let outcome = executor.execute(target, phase);
            let proceed = outcome.may_continue();

            if outcome.status == OutcomeStatus::Success {
                if let Some(note) = &outcome.diagnostic {
                    self.warnings.push(format!("{target}: {note}"));
                }
            }
            if let Some(artifact) = &outcome.artifact {
                self.artifacts.push(artifact.clone());
            }
            self.outcomes.push(outcome);

            if !proceed {
                tracing::error!("Stopping release: {phase} failed for {target}");
                self.halted = true;
                return;
            }
        }
    }
}

fn display_targets(targets: &TargetSet) -> String {
    if targets.is_empty() {
        return "(none)".to_string();
    }
    targets
        .iter()
        .map(PlatformTarget::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_from_flags() {
        assert_eq!(RunMode::from_flags(false, false), RunMode::Full);
        assert_eq!(RunMode::from_flags(true, false), RunMode::BuildOnly);
        assert_eq!(RunMode::from_flags(false, true), RunMode::PackageOnly);
    }

    #[test]
    fn test_run_mode_loops() {
        assert!(RunMode::Full.builds() && RunMode::Full.packages());
        assert!(RunMode::BuildOnly.builds() && !RunMode::BuildOnly.packages());
        assert!(!RunMode::PackageOnly.builds() && RunMode::PackageOnly.packages());
    }

    #[test]
    fn test_display_targets() {
        let targets: TargetSet = [PlatformTarget::Windows, PlatformTarget::Android]
            .into_iter()
            .collect();
        assert_eq!(display_targets(&targets), "windows, android");
        assert_eq!(display_targets(&TargetSet::new()), "(none)");
    }
}
