//! Error types for stepup-release
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Version validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    /// Version string does not have the `x.y.z` shape
    #[error("Invalid version '{version}': expected x.y.z, for example 1.2.5")]
    InvalidFormat { version: String },

    /// A component is too large to represent
    #[error("Invalid version '{version}': component '{component}' is out of range")]
    ComponentOutOfRange { version: String, component: String },
}

/// Manifest and version-carrying file errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest not found
    #[error("Manifest not found at '{path}'")]
    NotFound { path: PathBuf },

    /// No version line present
    #[error("No version line found in '{path}'")]
    MissingVersion { path: PathBuf },

    /// No version pattern present in a file that should carry one
    #[error("No '{pattern}' found in '{path}'")]
    PatternNotFound { path: PathBuf, pattern: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// Every mirror candidate failed
    #[error("All {} source(s) failed for '{url}'", attempts.len())]
    AllCandidatesFailed {
        url: String,
        attempts: Vec<(String, String)>,
    },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to read metadata
    #[error("Failed to read metadata for '{path}': {error}")]
    Metadata { path: PathBuf, error: String },
}

/// Archive creation errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Source directory missing
    #[error("Archive source '{path}' does not exist")]
    SourceMissing { path: PathBuf },

    /// Failed while writing the archive
    #[error("Failed to write archive '{path}': {error}")]
    WriteFailed { path: PathBuf, error: String },
}

/// Release configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: PathBuf, error: String },
}

/// Top-level release error type
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version error
    #[error("{0}")]
    Version(#[from] VersionError),

    /// Manifest error
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Archive error
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Config error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A mandatory toolchain stage failed before any target was built
    #[error("'{command}' failed: {diagnostic}")]
    Toolchain { command: String, diagnostic: String },
}
