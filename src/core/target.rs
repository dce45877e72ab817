//! Platform target registry
//!
//! Enumerates the platform targets a release can contain, which host
//! operating system each one needs, and which targets a host builds by
//! default.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Host operating system running the release
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    /// Windows
    Windows,
    /// macOS
    Macos,
    /// Linux
    Linux,
    /// Any other OS, by its `std::env::consts::OS` name
    Other(String),
}

impl HostOs {
    /// Map a `std::env::consts::OS` value to a host
    pub fn from_os_name(name: &str) -> Self {
        match name {
            "windows" => Self::Windows,
            "macos" => Self::Macos,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => f.write_str("windows"),
            Self::Macos => f.write_str("macos"),
            Self::Linux => f.write_str("linux"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Host a target must be built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostRequirement {
    /// Builds anywhere the toolchain runs
    Any,
    /// Windows only
    Windows,
    /// macOS only
    Macos,
    /// Linux only
    Linux,
}

impl HostRequirement {
    /// Whether a host satisfies this requirement
    pub fn is_satisfied_by(self, host: &HostOs) -> bool {
        match self {
            Self::Any => true,
            Self::Windows => *host == HostOs::Windows,
            Self::Macos => *host == HostOs::Macos,
            Self::Linux => *host == HostOs::Linux,
        }
    }
}

impl fmt::Display for HostRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Any => "any",
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Linux => "linux",
        })
    }
}

/// One platform-specific build-and-package unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTarget {
    Windows,
    Android,
    Macos,
    Linux,
    Web,
    Ios,
    Installer,
}

impl PlatformTarget {
    /// Every known target, in enumeration order
    pub const ALL: [PlatformTarget; 7] = [
        Self::Windows,
        Self::Android,
        Self::Macos,
        Self::Linux,
        Self::Web,
        Self::Ios,
        Self::Installer,
    ];

    /// Lower-case target name
    pub fn name(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Android => "android",
            Self::Macos => "macos",
            Self::Linux => "linux",
            Self::Web => "web",
            Self::Ios => "ios",
            Self::Installer => "installer",
        }
    }

    /// Host this target must be built on
    pub fn required_host(self) -> HostRequirement {
        match self {
            Self::Android | Self::Web => HostRequirement::Any,
            Self::Windows | Self::Installer => HostRequirement::Windows,
            Self::Macos | Self::Ios => HostRequirement::Macos,
            Self::Linux => HostRequirement::Linux,
        }
    }

    /// Toolchain arguments for the build phase; `None` if nothing is built
    pub fn build_args(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Windows => Some(&["build", "windows", "--release"]),
            Self::Android => Some(&["build", "apk", "--release"]),
            Self::Macos => Some(&["build", "macos", "--release"]),
            Self::Linux => Some(&["build", "linux", "--release"]),
            Self::Web => Some(&["build", "web", "--release"]),
            Self::Ios => Some(&["build", "ios", "--release", "--no-codesign"]),
            Self::Installer => None,
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlatformTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.name() == s)
            .ok_or_else(|| format!("unknown target '{s}'"))
    }
}

/// Ordered, deduplicated set of targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetSet(Vec<PlatformTarget>);

impl TargetSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target unless already present; returns whether it was added
    pub fn insert(&mut self, target: PlatformTarget) -> bool {
        if self.0.contains(&target) {
            return false;
        }
        self.0.push(target);
        true
    }

    /// Whether the set contains a target
    pub fn contains(&self, target: PlatformTarget) -> bool {
        self.0.contains(&target)
    }

    /// Targets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = PlatformTarget> + '_ {
        self.0.iter().copied()
    }

    /// Targets as a slice
    pub fn as_slice(&self) -> &[PlatformTarget] {
        &self.0
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no targets
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PlatformTarget> for TargetSet {
    fn from_iter<I: IntoIterator<Item = PlatformTarget>>(iter: I) -> Self {
        let mut set = Self::new();
        for target in iter {
            set.insert(target);
        }
        set
    }
}

/// How the operator asked for targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetSelection {
    /// Every known target
    All,
    /// A comma-separated list as typed by the operator
    Explicit(String),
    /// The host's default set
    #[default]
    HostDefault,
}

impl TargetSelection {
    /// Build a selection from CLI flags; `all` wins over a list
    pub fn from_flags(all: bool, list: Option<&str>) -> Self {
        if all {
            Self::All
        } else if let Some(list) = list {
            Self::Explicit(list.to_string())
        } else {
            Self::HostDefault
        }
    }
}

/// Default targets for a host
pub fn default_targets(host: &HostOs) -> TargetSet {
    use PlatformTarget::{Android, Installer, Ios, Linux, Macos, Web, Windows};

    let targets: &[PlatformTarget] = match host {
        HostOs::Windows => &[Windows, Android, Installer],
        HostOs::Macos => &[Macos, Ios, Android],
        HostOs::Linux => &[Linux, Android],
        HostOs::Other(_) => &[Android, Web],
    };
    targets.iter().copied().collect()
}

/// Parse a comma-separated target list
///
/// Names are trimmed and lower-cased. Unknown names are dropped without
/// error; repeated names keep their first position.
pub fn parse_target_list(list: &str) -> TargetSet {
    let mut set = TargetSet::new();
    for raw in list.split(',') {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        match name.parse::<PlatformTarget>() {
            Ok(target) => {
                set.insert(target);
            }
            Err(_) => tracing::debug!("Ignoring unknown target '{name}'"),
        }
    }
    set
}

/// Resolve the working target set for a run
pub fn resolve_targets(selection: &TargetSelection, host: &HostOs) -> TargetSet {
    match selection {
        TargetSelection::All => PlatformTarget::ALL.into_iter().collect(),
        TargetSelection::Explicit(list) => parse_target_list(list),
        TargetSelection::HostDefault => default_targets(host),
    }
}
