//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::target::PlatformTarget;

    /// Generate a well-formed `x.y.z` version string without leading zeros
    pub fn release_version() -> impl Strategy<Value = String> {
        (0u32..1000, 0u32..1000, 0u32..1000)
            .prop_map(|(major, minor, patch)| format!("{major}.{minor}.{patch}"))
    }

    /// Generate a string that is not a bare `x.y.z` version
    pub fn malformed_version() -> impl Strategy<Value = String> {
        prop_oneof![
            // Arbitrary text containing at least one non digit/dot character
            "[0-9.]{0,6}[a-zA-Z _+-][0-9a-zA-Z.+-]{0,8}",
            // Wrong number of components
            (0u32..100).prop_map(|a| format!("{a}")),
            (0u32..100, 0u32..100).prop_map(|(a, b)| format!("{a}.{b}")),
            (0u32..100, 0u32..100, 0u32..100, 0u32..100)
                .prop_map(|(a, b, c, d)| format!("{a}.{b}.{c}.{d}")),
            // Semver suffixes
            (0u32..100, 0u32..100, 0u32..100, "[a-z]{1,6}")
                .prop_map(|(a, b, c, pre)| format!("{a}.{b}.{c}-{pre}")),
        ]
    }

    /// Generate any known platform target
    pub fn platform_target() -> impl Strategy<Value = PlatformTarget> {
        proptest::sample::select(PlatformTarget::ALL.to_vec())
    }

    /// Generate a mirror prefix
    pub fn mirror_prefix() -> impl Strategy<Value = String> {
        ("[a-z]{3,10}", "[a-z]{2,5}")
            .prop_map(|(domain, tld)| format!("https://{domain}.{tld}/https://github.com/"))
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_release_version_generator(version in release_version()) {
            let parts: Vec<&str> = version.split('.').collect();
            prop_assert_eq!(parts.len(), 3);
            for part in parts {
                prop_assert!(part.parse::<u32>().is_ok());
            }
        }

        #[test]
        fn test_mirror_prefix_generator(prefix in mirror_prefix()) {
            prop_assert!(prefix.starts_with("https://"));
            prop_assert!(prefix.ends_with("https://github.com/"));
        }
    }
}
