//! Release configuration
//!
//! Reads `release.toml` from the project root. Every setting is optional;
//! a missing file yields the defaults from [`crate::config`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{defaults, urls};
use crate::core::mirror::MirrorSet;
use crate::error::ConfigError;
use crate::infra::toolchain::ToolchainEnv;

/// Top-level release configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Name used in artifact file names
    pub app_name: String,

    /// Build toolchain settings
    pub toolchain: ToolchainConfig,

    /// Mirror settings
    pub mirrors: MirrorConfig,

    /// Native dependency prefetch
    pub prefetch: PrefetchConfig,

    /// Installer compiler settings
    pub installer: InstallerConfig,

    /// Website version sync
    pub website: WebsiteConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            app_name: defaults::DEFAULT_APP_NAME.to_string(),
            toolchain: ToolchainConfig::default(),
            mirrors: MirrorConfig::default(),
            prefetch: PrefetchConfig::default(),
            installer: InstallerConfig::default(),
            website: WebsiteConfig::default(),
        }
    }
}

/// Build toolchain settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Flutter executable (name on `PATH` or full path)
    pub program: PathBuf,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(defaults::DEFAULT_TOOLCHAIN),
        }
    }
}

/// Mirror settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Upstream prefix that mirrors stand in for
    pub upstream: String,

    /// Mirror prefixes in the order they are tried
    pub mirrors: Vec<String>,

    /// Per-candidate timeout in seconds
    pub timeout_secs: u64,

    /// Mirror base URLs handed to the toolchain as environment variables
    pub env: BTreeMap<String, String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            upstream: urls::GITHUB_UPSTREAM.to_string(),
            mirrors: urls::GITHUB_MIRRORS.iter().map(|m| (*m).to_string()).collect(),
            timeout_secs: defaults::FETCH_TIMEOUT_SECS,
            env: BTreeMap::from([
                (
                    "FLUTTER_STORAGE_BASE_URL".to_string(),
                    urls::FLUTTER_STORAGE_MIRROR.to_string(),
                ),
                (
                    "PUB_HOSTED_URL".to_string(),
                    urls::PUB_HOSTED_MIRROR.to_string(),
                ),
            ]),
        }
    }
}

/// One native artifact to prefetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchArtifact {
    /// Canonical URL
    pub url: String,
    /// Destination relative to the cache directory
    pub dest: PathBuf,
}

/// Native dependency prefetch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Dependency cache directory; `~/.pub-cache` when unset
    pub cache_dir: Option<PathBuf>,

    /// Artifacts to fetch, in order
    pub artifacts: Vec<PrefetchArtifact>,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            artifacts: urls::NATIVE_ARTIFACTS
                .iter()
                .map(|(url, dest)| PrefetchArtifact {
                    url: (*url).to_string(),
                    dest: PathBuf::from(dest),
                })
                .collect(),
        }
    }
}

/// Installer compiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Inno Setup compiler executable
    pub compiler: PathBuf,

    /// Installer script, relative to the project root
    pub script: PathBuf,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from(defaults::INSTALLER_COMPILER),
            script: PathBuf::from(defaults::INSTALLER_SCRIPT),
        }
    }
}

/// Website version sync settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    /// Script carrying `APP_VERSION`, relative to the project root
    pub script: PathBuf,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from(defaults::WEBSITE_SCRIPT),
        }
    }
}

impl ReleaseConfig {
    /// Load `release.toml` from a project, or an explicit file
    ///
    /// An explicit path must exist; the project default may be absent.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                error: "file does not exist".to_string(),
            }),
            Some(path) => Self::load_from_path(path),
            None => Self::load_from_path(&project_dir.join(defaults::CONFIG_FILE)),
        }
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Mirror set for the resolver
    pub fn mirror_set(&self) -> MirrorSet {
        MirrorSet::new(self.mirrors.upstream.clone(), self.mirrors.mirrors.clone())
    }

    /// Per-candidate fetch timeout
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.mirrors.timeout_secs)
    }

    /// Environment overrides for toolchain invocations
    pub fn toolchain_env(&self) -> ToolchainEnv {
        self.mirrors
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Dependency cache directory, if one can be determined
    pub fn prefetch_cache_dir(&self) -> Option<PathBuf> {
        match &self.prefetch.cache_dir {
            Some(dir) => Some(expand_home(dir)),
            None => dirs::home_dir().map(|home| home.join(defaults::PUB_CACHE_DIR)),
        }
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}
