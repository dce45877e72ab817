//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod release;
pub mod sync_web;
pub mod targets;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::core::config::ReleaseConfig;
use crate::core::pipeline::{PipelineOptions, RunMode};
use crate::core::target::TargetSelection;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and package a release
    Release {
        /// Version to release (x.y.z)
        #[arg(id = "release_version", value_name = "VERSION")]
        version: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Build only; leave packaging for a later run
        #[arg(long, conflicts_with = "package_only")]
        build_only: bool,

        /// Package existing build output without building
        #[arg(long)]
        package_only: bool,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Show which targets a release would process on this host
    Targets {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Copy the manifest version into the website script
    SyncWeb {
        /// Website script to update (overrides the configured path)
        #[arg(long)]
        script: Option<PathBuf>,

        #[command(flatten)]
        project: ProjectArgs,
    },
}

/// Target selection flags
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Comma-separated targets (windows, android, macos, linux, web, ios, installer)
    #[arg(short, long, value_name = "LIST")]
    pub targets: Option<String>,

    /// Process every known target
    #[arg(short, long)]
    pub all: bool,
}

impl SelectionArgs {
    /// Selection the flags describe
    pub fn selection(&self) -> TargetSelection {
        TargetSelection::from_flags(self.all, self.targets.as_deref())
    }
}

/// Project location flags
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Flutter project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Release configuration file
    #[arg(long, value_name = "FILE", env = "STEPUP_RELEASE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ProjectArgs {
    /// Project root directory
    pub fn dir(&self) -> Result<PathBuf> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to read current directory"),
        }
    }

    /// Load the release configuration for a project
    pub fn load_config(&self, project_dir: &Path) -> Result<ReleaseConfig> {
        ReleaseConfig::load(project_dir, self.config.as_deref())
            .context("Failed to load release configuration")
    }
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Release {
                version,
                selection,
                build_only,
                package_only,
                project,
            } => {
                let options = PipelineOptions {
                    version,
                    selection: selection.selection(),
                    mode: RunMode::from_flags(build_only, package_only),
                };
                release::execute(&project, &options).await
            }
            Self::Targets { selection, project } => {
                targets::execute(&project, &selection.selection())
            }
            Self::SyncWeb { script, project } => sync_web::execute(&project, script.as_deref()),
        }
    }
}
