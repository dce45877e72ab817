//! Release version handling
//!
//! A release version is exactly `major.minor.patch` with non-negative
//! integer components. Pre-release and build metadata are rejected even
//! though semver would accept them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::VersionError;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid version regex"))
}

/// A validated `x.y.z` release version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReleaseVersion {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
}

impl ReleaseVersion {
    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Validate and parse a user-supplied version string
    ///
    /// # Examples
    /// ```
    /// use stepup_release::core::version::ReleaseVersion;
    ///
    /// let version = ReleaseVersion::parse("1.2.5").unwrap();
    /// assert_eq!(version.to_string(), "1.2.5");
    /// assert!(ReleaseVersion::parse("1.2.5-beta").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if !version_pattern().is_match(input) {
            return Err(VersionError::InvalidFormat {
                version: input.to_string(),
            });
        }

        let mut components = [0u64; 3];
        for (slot, part) in components.iter_mut().zip(input.split('.')) {
            *slot = part
                .parse()
                .map_err(|_| VersionError::ComponentOutOfRange {
                    version: input.to_string(),
                    component: part.to_string(),
                })?;
        }

        Ok(Self::new(components[0], components[1], components[2]))
    }

    /// Directory name used under `releases/`
    pub fn release_dir_name(&self) -> String {
        format!("v{self}")
    }

    /// Semver view of this version
    pub fn to_semver(&self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }

    /// True if `self` sorts before `other` in semver order
    pub fn is_older_than(&self, other: &semver::Version) -> bool {
        self.to_semver() < *other
    }
}

/// Check a version string without keeping the parsed value
pub fn is_valid_version(input: &str) -> bool {
    ReleaseVersion::parse(input).is_ok()
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ReleaseVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
