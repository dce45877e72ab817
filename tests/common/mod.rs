//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory holding a Flutter project layout and
/// provides utilities for setting up release scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project with a `pubspec.yaml` at the given version
    #[allow(dead_code)]
    pub fn with_pubspec(version: &str) -> Self {
        let project = Self::new();
        project.create_file("pubspec.yaml", &sample_pubspec(version));
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Absolute path of a file inside the project
    #[allow(dead_code)]
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    #[allow(dead_code)]
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    #[allow(dead_code)]
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Names of the files in `releases/v<version>/`, sorted
    #[allow(dead_code)]
    pub fn release_files(&self, version: &str) -> Vec<String> {
        let dir = self.dir.path().join("releases").join(format!("v{version}"));
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample `pubspec.yaml` for testing
#[allow(dead_code)]
pub fn sample_pubspec(version: &str) -> String {
    format!(
        r"name: stepup_app
description: Step counter and habit tracker.
publish_to: 'none'
version: {version}

environment:
  sdk: '>=3.2.0 <4.0.0'

dependencies:
  flutter:
    sdk: flutter
  sqlite3_flutter_libs: ^0.5.20
"
    )
}

/// Sample website script for testing
#[allow(dead_code)]
pub const SAMPLE_WEBSITE_SCRIPT: &str = r"// Download page
const APP_VERSION = '1.0.0';
const RELEASE_BASE = `https://example.com/releases/v${APP_VERSION}`;

function downloadUrl(platform) {
  return `${RELEASE_BASE}/StepUp_v${APP_VERSION}_${platform}.zip`;
}
";

/// Sample Inno Setup script for testing
#[allow(dead_code)]
pub const SAMPLE_SETUP_ISS: &str = r#"#define MyAppName "StepUp"
#define MyAppVersion "1.0.0"

[Setup]
AppName={#MyAppName}
AppVersion={#MyAppVersion}
OutputDir=..\build\installer
OutputBaseFilename=StepUp_Setup_v{#MyAppVersion}
"#;
