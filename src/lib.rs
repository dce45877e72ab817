//! stepup-release - Release orchestrator for the StepUp client application
//!
//! This library sets the release version, drives the Flutter toolchain once
//! per platform target, and stages the results into a version-stamped
//! release directory.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Release orchestration (targets, steps, pipeline, outcomes)
//! - [`infra`] - Infrastructure layer (network, filesystem, processes)
//! - [`config`] - Configuration constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
