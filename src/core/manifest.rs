//! Version-carrying text files
//!
//! Reads and rewrites the version in `pubspec.yaml`, and propagates it into
//! the installer script (`#define MyAppVersion "..."`) and the website script
//! (`const APP_VERSION = '...';`). Every other line is left untouched.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::core::version::ReleaseVersion;
use crate::error::ManifestError;

fn read_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^version:\s*([\d.]+)").expect("valid regex"))
}

fn rewrite_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^version: [^\r\n]*").expect("valid regex"))
}

fn installer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"#define MyAppVersion "[^"]+""#).expect("valid regex"))
}

fn website_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"const APP_VERSION = '[\d.]+';").expect("valid regex"))
}

/// Extract the version string from manifest content
pub fn read_version(content: &str) -> Option<&str> {
    read_pattern()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replace every `version: ...` line with `version: <version>`
///
/// Returns `None` if the content has no version line.
pub fn rewrite_version(content: &str, version: &ReleaseVersion) -> Option<String> {
    if !rewrite_pattern().is_match(content) {
        return None;
    }
    let replacement = format!("version: {version}");
    Some(
        rewrite_pattern()
            .replace_all(content, regex::NoExpand(&replacement))
            .into_owned(),
    )
}

/// Replace the `MyAppVersion` define in an Inno Setup script
pub fn rewrite_installer_version(content: &str, version: &ReleaseVersion) -> Option<String> {
    if !installer_pattern().is_match(content) {
        return None;
    }
    let replacement = format!("#define MyAppVersion \"{version}\"");
    Some(
        installer_pattern()
            .replace_all(content, regex::NoExpand(&replacement))
            .into_owned(),
    )
}

/// Replace the `APP_VERSION` constant in the website script
pub fn rewrite_website_version(content: &str, version: &ReleaseVersion) -> Option<String> {
    if !website_pattern().is_match(content) {
        return None;
    }
    let replacement = format!("const APP_VERSION = '{version}';");
    Some(
        website_pattern()
            .replace_all(content, regex::NoExpand(&replacement))
            .into_owned(),
    )
}

/// The project's `pubspec.yaml`
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    /// Manifest at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, ManifestError> {
        if !self.path.exists() {
            return Err(ManifestError::NotFound {
                path: self.path.clone(),
            });
        }
        std::fs::read_to_string(&self.path).map_err(|e| ManifestError::IoError {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    /// Current version string as written in the manifest
    pub fn current_version(&self) -> Result<String, ManifestError> {
        let content = self.read()?;
        read_version(&content)
            .map(str::to_string)
            .ok_or_else(|| ManifestError::MissingVersion {
                path: self.path.clone(),
            })
    }

    /// Rewrite the manifest's version line in place
    pub fn write_version(&self, version: &ReleaseVersion) -> Result<(), ManifestError> {
        let content = self.read()?;
        let updated =
            rewrite_version(&content, version).ok_or_else(|| ManifestError::MissingVersion {
                path: self.path.clone(),
            })?;
        write_text(&self.path, &updated)
    }
}

/// Rewrite the installer script's version define in place
pub fn update_installer_script(path: &Path, version: &ReleaseVersion) -> Result<(), ManifestError> {
    update_file(path, "#define MyAppVersion", |content| {
        rewrite_installer_version(content, version)
    })
}

/// Rewrite the website script's `APP_VERSION` in place
pub fn update_website_script(path: &Path, version: &ReleaseVersion) -> Result<(), ManifestError> {
    update_file(path, "const APP_VERSION", |content| {
        rewrite_website_version(content, version)
    })
}

fn update_file(
    path: &Path,
    pattern: &str,
    rewrite: impl FnOnce(&str) -> Option<String>,
) -> Result<(), ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::IoError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    let updated = rewrite(&content).ok_or_else(|| ManifestError::PatternNotFound {
        path: path.to_path_buf(),
        pattern: pattern.to_string(),
    })?;
    write_text(path, &updated)
}

fn write_text(path: &Path, content: &str) -> Result<(), ManifestError> {
    std::fs::write(path, content).map_err(|e| ManifestError::IoError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
