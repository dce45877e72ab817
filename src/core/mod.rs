//! Core release logic
//!
//! Everything that decides what a release does. Side effects go through
//! [`crate::infra`].
//!
//! # Submodules
//!
//! - [`version`] - Release version validation
//! - [`manifest`] - `pubspec.yaml` and script version rewriting
//! - [`target`] - Platform targets and host defaults
//! - [`config`] - `release.toml` loading
//! - [`mirror`] - Mirror-fallback resolution
//! - [`archive`] - Zip and tar.gz release archives
//! - [`package`] - Staging build output into the release directory
//! - [`step`] - Per-target build and package steps
//! - [`outcome`] - Step outcomes and aggregation
//! - [`pipeline`] - The release pipeline

pub mod archive;
pub mod config;
pub mod manifest;
pub mod mirror;
pub mod outcome;
pub mod package;
pub mod pipeline;
pub mod step;
pub mod target;
pub mod version;
