//! Step execution
//!
//! Runs one phase (build or package) for one target and classifies the
//! result. The executor never returns an error: every failure becomes a
//! [`StepOutcome`] so the pipeline can decide whether to continue.

use std::path::{Path, PathBuf};

use crate::core::config::{InstallerConfig, ReleaseConfig};
use crate::core::outcome::{Phase, StepOutcome};
use crate::core::package::{self, ReleaseLayout};
use crate::core::target::{HostOs, PlatformTarget};
use crate::error::ReleaseError;
use crate::infra::toolchain::{CommandRunner, Invocation, ToolchainEnv};

/// Executes build and package steps for a single release
pub struct StepExecutor<'r> {
    layout: ReleaseLayout,
    host: HostOs,
    toolchain: PathBuf,
    env: ToolchainEnv,
    installer: InstallerConfig,
    runner: &'r dyn CommandRunner,
}

impl<'r> StepExecutor<'r> {
    /// Create an executor from the release configuration
    pub fn new(
        layout: ReleaseLayout,
        host: HostOs,
        config: &ReleaseConfig,
        runner: &'r dyn CommandRunner,
    ) -> Self {
        Self {
            layout,
            host,
            toolchain: config.toolchain.program.clone(),
            env: config.toolchain_env(),
            installer: config.installer.clone(),
            runner,
        }
    }

    /// Release layout the executor writes into
    pub fn layout(&self) -> &ReleaseLayout {
        &self.layout
    }

    /// Run one phase for one target
    pub fn execute(&self, target: PlatformTarget, phase: Phase) -> StepOutcome {
        let required = target.required_host();
        if !required.is_satisfied_by(&self.host) {
            tracing::info!("Skipping {phase} for {target}: requires {required} host");
            return StepOutcome::skipped(
                target,
                phase,
                format!("requires {required} host (running on {})", self.host),
            );
        }

        match phase {
            Phase::Build => self.build(target),
            Phase::Package => self.package(target),
        }
    }

    /// Run a toolchain command that must succeed (`clean`, `pub get`)
    pub fn run_toolchain(&self, args: &[&str]) -> Result<(), ReleaseError> {
        let invocation = self.invocation(args);
        let command = invocation.to_string();
        tracing::info!("Running {command}");

        let output = self
            .runner
            .run(&invocation)
            .map_err(|e| ReleaseError::Toolchain {
                command: command.clone(),
                diagnostic: e.to_string(),
            })?;

        if output.success() {
            Ok(())
        } else {
            Err(ReleaseError::Toolchain {
                command,
                diagnostic: output.diagnostic(),
            })
        }
    }

    fn build(&self, target: PlatformTarget) -> StepOutcome {
        let Some(args) = target.build_args() else {
            tracing::debug!("{target} has no build command");
            return StepOutcome::success(target, Phase::Build);
        };

        let invocation = self.invocation(args);
        tracing::info!("Building {target}: {invocation}");

        match self.runner.run(&invocation) {
            Ok(output) if output.success() => StepOutcome::success(target, Phase::Build),
            Ok(output) => {
                let diagnostic = output.diagnostic();
                tracing::error!("Build for {target} failed: {diagnostic}");
                StepOutcome::failed(target, Phase::Build, diagnostic)
            }
            Err(e) => {
                let diagnostic = format!(
                    "failed to start '{}': {e}",
                    self.toolchain.display()
                );
                tracing::error!("{diagnostic}");
                StepOutcome::failed(target, Phase::Build, diagnostic)
            }
        }
    }

    fn package(&self, target: PlatformTarget) -> StepOutcome {
        tracing::info!("Packaging {target}");

        match package::package_target(&self.layout, target, &self.installer, self.runner) {
            Ok(result) => {
                let mut outcome = StepOutcome::success(target, Phase::Package);
                if let Some(note) = result.note {
                    outcome = outcome.with_diagnostic(note);
                }
                if let Some(artifact) = result.artifact {
                    tracing::info!(
                        "Staged {} ({:.1} MB)",
                        artifact.path.display(),
                        artifact.size_mib()
                    );
                    outcome = outcome.with_artifact(artifact);
                }
                outcome
            }
            Err(e) => {
                tracing::error!("Packaging {target} failed: {e}");
                StepOutcome::failed(target, Phase::Package, e.to_string())
            }
        }
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::new(&self.toolchain, args, self.project_dir()).with_env(self.env.clone())
    }

    fn project_dir(&self) -> &Path {
        self.layout.project_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::OutcomeStatus;
    use crate::core::version::ReleaseVersion;
    use crate::infra::toolchain::ToolOutput;
    use std::cell::RefCell;
    use std::io;
    use tempfile::TempDir;

    /// Records every invocation and answers with a fixed result
    struct Recorder {
        calls: RefCell<Vec<Invocation>>,
        answer: fn() -> io::Result<ToolOutput>,
    }

    impl Recorder {
        fn new(answer: fn() -> io::Result<ToolOutput>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                answer,
            }
        }

        fn args(&self) -> Vec<Vec<String>> {
            self.calls.borrow().iter().map(|c| c.args.clone()).collect()
        }
    }

    impl CommandRunner for Recorder {
        fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
            self.calls.borrow_mut().push(invocation.clone());
            (self.answer)()
        }
    }

    fn executor<'r>(temp: &TempDir, host: HostOs, runner: &'r Recorder) -> StepExecutor<'r> {
        let layout = ReleaseLayout::new(temp.path(), "StepUp", ReleaseVersion::new(2, 0, 0));
        StepExecutor::new(layout, host, &ReleaseConfig::default(), runner)
    }

    #[test]
    fn test_host_mismatch_skips_without_invocation() {
        let temp = TempDir::new().unwrap();
        let runner = Recorder::new(|| Ok(ToolOutput::ok()));
        let exec = executor(&temp, HostOs::Linux, &runner);

        for phase in [Phase::Build, Phase::Package] {
            let outcome = exec.execute(PlatformTarget::Windows, phase);
            assert_eq!(outcome.status, OutcomeStatus::Skipped);
            assert!(outcome.diagnostic.unwrap().contains("windows"));
        }
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_build_passes_args_and_env() {
        let temp = TempDir::new().unwrap();
        let runner = Recorder::new(|| Ok(ToolOutput::ok()));
        let exec = executor(&temp, HostOs::Linux, &runner);

        let outcome = exec.execute(PlatformTarget::Android, Phase::Build);
        assert_eq!(outcome.status, OutcomeStatus::Success);

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, ["build", "apk", "--release"]);
        assert_eq!(calls[0].cwd, temp.path());
        assert_eq!(
            calls[0].env.get("PUB_HOSTED_URL"),
            Some("https://pub.flutter-io.cn")
        );
    }

    #[test]
    fn test_build_nonzero_exit_is_failed_with_stderr() {
        let temp = TempDir::new().unwrap();
        let runner = Recorder::new(|| Ok(ToolOutput::failed(1, "Gradle task failed\n")));
        let exec = executor(&temp, HostOs::Windows, &runner);

        let outcome = exec.execute(PlatformTarget::Android, Phase::Build);
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.diagnostic.as_deref(), Some("Gradle task failed"));
    }

    #[test]
    fn test_build_spawn_failure_is_failed() {
        let temp = TempDir::new().unwrap();
        let runner = Recorder::new(|| Err(io::Error::new(io::ErrorKind::NotFound, "not found")));
        let exec = executor(&temp, HostOs::Windows, &runner);

        let outcome = exec.execute(PlatformTarget::Web, Phase::Build);
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome.diagnostic.unwrap().contains("flutter"));
    }

    #[test]
    fn test_installer_build_is_vacuous() {
        let temp = TempDir::new().unwrap();
        let runner = Recorder::new(|| Ok(ToolOutput::ok()));
        let exec = executor(&temp, HostOs::Windows, &runner);

        let outcome = exec.execute(PlatformTarget::Installer, Phase::Build);
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_package_missing_output_is_failed() {
        let temp = TempDir::new().unwrap();
        let runner = Recorder::new(|| Ok(ToolOutput::ok()));
        let exec = executor(&temp, HostOs::Linux, &runner);

        let outcome = exec.execute(PlatformTarget::Linux, Phase::Package);
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome
            .diagnostic
            .unwrap()
            .starts_with("prerequisite artifact missing"));
    }

    #[test]
    fn test_package_success_carries_artifact() {
        let temp = TempDir::new().unwrap();
        let bundle = temp.path().join("build/linux/x64/release/bundle");
        std::fs::create_dir_all(bundle.join("lib")).unwrap();
        std::fs::write(bundle.join("stepup_app"), b"ELF").unwrap();
        std::fs::write(bundle.join("lib/libapp.so"), b"so").unwrap();

        let runner = Recorder::new(|| Ok(ToolOutput::ok()));
        let exec = executor(&temp, HostOs::Linux, &runner);

        let outcome = exec.execute(PlatformTarget::Linux, Phase::Package);
        assert_eq!(outcome.status, OutcomeStatus::Success);
        let artifact = outcome.artifact.unwrap();
        assert_eq!(
            artifact.path,
            temp.path().join("releases/v2.0.0/StepUp_v2.0.0_linux.tar.gz")
        );
        assert!(artifact.size > 0);
    }

    #[test]
    fn test_run_toolchain_failure_is_error() {
        let temp = TempDir::new().unwrap();
        let runner = Recorder::new(|| Ok(ToolOutput::failed(69, "")));
        let exec = executor(&temp, HostOs::Linux, &runner);

        let err = exec.run_toolchain(&["pub", "get"]).unwrap_err();
        match err {
            ReleaseError::Toolchain {
                command,
                diagnostic,
            } => {
                assert_eq!(command, "flutter pub get");
                assert_eq!(diagnostic, "exited with status 69");
            }
            other => panic!("Expected Toolchain error, got {other:?}"),
        }
        assert_eq!(runner.args(), vec![vec!["pub".to_string(), "get".to_string()]]);
    }
}
