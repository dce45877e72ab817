//! Infrastructure layer
//!
//! Handles all I/O operations: network, filesystem, host detection and
//! external processes. This module is the only place where side effects occur.

pub mod download;
pub mod filesystem;
pub mod host;
pub mod toolchain;
