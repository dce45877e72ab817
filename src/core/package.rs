//! Packaging of build output into release artifacts
//!
//! Each target's build output sits at a fixed location chosen by the Flutter
//! toolchain. Packaging turns it into one file in `releases/v<version>/`:
//! an archive for directory outputs, a renamed copy for the Android APK, and
//! a compiled installer for the `installer` target.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::archive::{self, ArchiveFormat};
use crate::core::config::InstallerConfig;
use crate::core::manifest;
use crate::core::outcome::ReleaseArtifact;
use crate::core::target::PlatformTarget;
use crate::core::version::ReleaseVersion;
use crate::error::{ArchiveError, FilesystemError};
use crate::infra::filesystem;
use crate::infra::toolchain::{CommandRunner, Invocation};

/// Errors that can occur while packaging a target
#[derive(Error, Debug)]
pub enum PackageError {
    /// Build output the package step depends on is absent
    #[error("prerequisite artifact missing: {}", path.display())]
    PrerequisiteMissing { path: PathBuf },

    /// Archive creation failed
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Copy or directory creation failed
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Installer compiler could not be started
    #[error("failed to start installer compiler '{}': {error}", compiler.display())]
    CompilerSpawn { compiler: PathBuf, error: String },

    /// Installer compiler exited non-zero
    #[error("installer compilation failed: {diagnostic}")]
    CompilerFailed { diagnostic: String },
}

/// What a successful package step produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageResult {
    /// File written to the release directory
    pub artifact: Option<ReleaseArtifact>,
    /// Non-fatal note (optional tool missing, version rewrite skipped)
    pub note: Option<String>,
}

/// Where a target's build output lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutput {
    /// A directory to archive
    Directory {
        /// Output directory
        dir: PathBuf,
        /// File extension that must be present in `dir`, if any
        required_extension: Option<&'static str>,
        /// Archive format
        format: ArchiveFormat,
    },
    /// A single file to copy
    File(PathBuf),
}

/// Paths and names for one release
#[derive(Debug, Clone)]
pub struct ReleaseLayout {
    project_dir: PathBuf,
    app_name: String,
    version: ReleaseVersion,
}

impl ReleaseLayout {
    /// Layout for a project and version
    pub fn new(project_dir: &Path, app_name: &str, version: ReleaseVersion) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            app_name: app_name.to_string(),
            version,
        }
    }

    /// Project root
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Release version
    pub fn version(&self) -> ReleaseVersion {
        self.version
    }

    /// `releases/v<version>/`
    pub fn release_dir(&self) -> PathBuf {
        self.project_dir
            .join(crate::config::defaults::RELEASES_DIR)
            .join(self.version.release_dir_name())
    }

    /// Build output location for a target
    ///
    /// `None` for the installer, whose output comes from the installer
    /// compiler rather than the build phase.
    pub fn build_output(&self, target: PlatformTarget) -> Option<BuildOutput> {
        let build = self.project_dir.join("build");
        let output = match target {
            PlatformTarget::Windows => BuildOutput::Directory {
                dir: build.join("windows/x64/runner/Release"),
                required_extension: Some("exe"),
                format: ArchiveFormat::Zip,
            },
            PlatformTarget::Android => {
                BuildOutput::File(build.join("app/outputs/flutter-apk/app-release.apk"))
            }
            PlatformTarget::Macos => BuildOutput::Directory {
                dir: build.join("macos/Build/Products/Release"),
                required_extension: Some("app"),
                format: ArchiveFormat::Zip,
            },
            PlatformTarget::Linux => BuildOutput::Directory {
                dir: build.join("linux/x64/release/bundle"),
                required_extension: None,
                format: ArchiveFormat::TarGz,
            },
            PlatformTarget::Web => BuildOutput::Directory {
                dir: build.join("web"),
                required_extension: Some("html"),
                format: ArchiveFormat::Zip,
            },
            PlatformTarget::Ios => BuildOutput::Directory {
                dir: build.join("ios/iphoneos"),
                required_extension: Some("app"),
                format: ArchiveFormat::Zip,
            },
            PlatformTarget::Installer => return None,
        };
        Some(output)
    }

    /// Package name without extension, e.g. `StepUp_v1.2.5_windows`
    pub fn package_name(&self, target: PlatformTarget) -> String {
        match target {
            PlatformTarget::Installer => format!("{}_Setup_v{}", self.app_name, self.version),
            _ => format!("{}_v{}_{}", self.app_name, self.version, target.name()),
        }
    }

    /// Artifact file name in the release directory
    pub fn artifact_file_name(&self, target: PlatformTarget) -> String {
        let name = self.package_name(target);
        match self.build_output(target) {
            Some(BuildOutput::Directory { format, .. }) => format!("{name}{}", format.extension()),
            Some(BuildOutput::File(_)) => format!("{name}.apk"),
            None => format!("{name}.exe"),
        }
    }

    /// Installer executable written by the compiler
    pub fn installer_output(&self) -> PathBuf {
        self.project_dir
            .join("build/installer")
            .join(self.artifact_file_name(PlatformTarget::Installer))
    }
}

/// Package one target into the release directory
pub fn package_target<R: CommandRunner + ?Sized>(
    layout: &ReleaseLayout,
    target: PlatformTarget,
    installer: &InstallerConfig,
    runner: &R,
) -> Result<PackageResult, PackageError> {
    let Some(output) = layout.build_output(target) else {
        return package_installer(layout, &installer.compiler, &installer.script, runner);
    };

    let release_dir = layout.release_dir();
    filesystem::create_dir_all(&release_dir)?;
    let dest = release_dir.join(layout.artifact_file_name(target));

    match output {
        BuildOutput::Directory {
            dir,
            required_extension,
            format,
        } => {
            if !has_output(&dir, required_extension) {
                return Err(PackageError::PrerequisiteMissing { path: dir });
            }
            let files = archive::create_archive(&dir, &layout.package_name(target), &dest, format)?;
            tracing::info!("Archived {files} file(s) into {}", dest.display());
        }
        BuildOutput::File(source) => {
            if !source.is_file() {
                return Err(PackageError::PrerequisiteMissing { path: source });
            }
            filesystem::copy_file(&source, &dest)?;
        }
    }

    Ok(PackageResult {
        artifact: Some(staged_artifact(dest)?),
        note: None,
    })
}

/// Compile and stage the Windows installer
///
/// A missing compiler is not an error: the step succeeds with a note and
/// no artifact.
pub fn package_installer<R: CommandRunner + ?Sized>(
    layout: &ReleaseLayout,
    compiler: &Path,
    script: &Path,
    runner: &R,
) -> Result<PackageResult, PackageError> {
    if !compiler.exists() {
        let note = format!(
            "installer compiler not found at {}, skipping installer",
            compiler.display()
        );
        tracing::warn!("{note}");
        return Ok(PackageResult {
            artifact: None,
            note: Some(note),
        });
    }

    let script_path = layout.project_dir().join(script);
    let mut notes = Vec::new();
    if let Err(e) = manifest::update_installer_script(&script_path, &layout.version()) {
        tracing::warn!("Could not update installer version: {e}");
        notes.push(format!("installer version not updated: {e}"));
    }

    let script_dir = script_path
        .parent()
        .map_or_else(|| layout.project_dir().to_path_buf(), Path::to_path_buf);
    let script_name = script_path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    let invocation = Invocation::new(compiler, &[script_name.as_str()], &script_dir);

    let output = runner
        .run(&invocation)
        .map_err(|e| PackageError::CompilerSpawn {
            compiler: compiler.to_path_buf(),
            error: e.to_string(),
        })?;
    if !output.success() {
        return Err(PackageError::CompilerFailed {
            diagnostic: output.diagnostic(),
        });
    }

    let built = layout.installer_output();
    if !built.is_file() {
        tracing::warn!("Installer compiled but {} was not found", built.display());
        notes.push(format!("compiled installer not found at {}", built.display()));
        return Ok(PackageResult {
            artifact: None,
            note: join_notes(notes),
        });
    }

    let release_dir = layout.release_dir();
    filesystem::create_dir_all(&release_dir)?;
    let dest = release_dir.join(layout.artifact_file_name(PlatformTarget::Installer));
    filesystem::copy_file(&built, &dest)?;

    Ok(PackageResult {
        artifact: Some(staged_artifact(dest)?),
        note: join_notes(notes),
    })
}

fn join_notes(notes: Vec<String>) -> Option<String> {
    (!notes.is_empty()).then(|| notes.join("; "))
}

fn staged_artifact(path: PathBuf) -> Result<ReleaseArtifact, FilesystemError> {
    let size = filesystem::file_size(&path)?;
    Ok(ReleaseArtifact { path, size })
}

/// True if `dir` exists and, when required, holds an entry with `extension`
fn has_output(dir: &Path, required_extension: Option<&str>) -> bool {
    if !dir.is_dir() {
        return false;
    }
    let Some(extension) = required_extension else {
        return true;
    };
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(Result::ok)
            .any(|e| e.path().extension().is_some_and(|ext| ext == extension))
    })
}
