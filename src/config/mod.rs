//! Configuration constants
//!
//! Compile-time defaults and well-known URLs. Runtime configuration
//! (`release.toml`) lives in [`crate::core::config`].

pub mod defaults;
pub mod urls;
