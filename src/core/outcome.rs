//! Step outcomes and their aggregation

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::target::PlatformTarget;

/// The two stages applied to each target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Invoke the platform build
    Build,
    /// Stage build output into the release directory
    Package,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Build => "build",
            Self::Package => "package",
        })
    }
}

/// Outcome classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Completed
    Success,
    /// Not run because the host cannot build this target
    Skipped,
    /// Ran and failed
    Failed,
}

/// A file placed in the release directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseArtifact {
    /// Full path of the file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

impl ReleaseArtifact {
    /// Size in mebibytes, for display
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mib(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

/// Result of one step for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Target the step ran for
    pub target: PlatformTarget,
    /// Phase of the step
    pub phase: Phase,
    /// Classification
    pub status: OutcomeStatus,
    /// Diagnostic text (stderr, skip reason, warning)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    /// File produced by a package step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ReleaseArtifact>,
}

impl StepOutcome {
    /// Successful step
    pub fn success(target: PlatformTarget, phase: Phase) -> Self {
        Self {
            target,
            phase,
            status: OutcomeStatus::Success,
            diagnostic: None,
            artifact: None,
        }
    }

    /// Step skipped on an incompatible host
    pub fn skipped(target: PlatformTarget, phase: Phase, reason: impl Into<String>) -> Self {
        Self {
            target,
            phase,
            status: OutcomeStatus::Skipped,
            diagnostic: Some(reason.into()),
            artifact: None,
        }
    }

    /// Failed step
    pub fn failed(target: PlatformTarget, phase: Phase, diagnostic: impl Into<String>) -> Self {
        Self {
            target,
            phase,
            status: OutcomeStatus::Failed,
            diagnostic: Some(diagnostic.into()),
            artifact: None,
        }
    }

    /// Attach a diagnostic
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    /// Attach the produced artifact
    #[must_use]
    pub fn with_artifact(mut self, artifact: ReleaseArtifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// True unless Failed; Skipped lets the pipeline continue
    pub fn may_continue(&self) -> bool {
        self.status != OutcomeStatus::Failed
    }
}

/// Pass/fail decision over recorded outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    /// No outcome was Failed
    pub overall_success: bool,
    /// Failed targets, in recording order
    pub failed_targets: Vec<PlatformTarget>,
    /// Skipped targets, in recording order, without repeats
    pub skipped_targets: Vec<PlatformTarget>,
}

/// Aggregate outcomes in the order they were recorded
pub fn aggregate(outcomes: &[StepOutcome]) -> Aggregate {
    let mut failed_targets = Vec::new();
    let mut skipped_targets = Vec::new();

    for outcome in outcomes {
        let bucket = match outcome.status {
            OutcomeStatus::Failed => &mut failed_targets,
            OutcomeStatus::Skipped => &mut skipped_targets,
            OutcomeStatus::Success => continue,
        };
        if !bucket.contains(&outcome.target) {
            bucket.push(outcome.target);
        }
    }

    Aggregate {
        overall_success: failed_targets.is_empty(),
        failed_targets,
        skipped_targets,
    }
}
