//! Host platform detection

use crate::core::target::HostOs;

/// Operating system this process runs on
pub fn detect_host() -> HostOs {
    HostOs::from_os_name(std::env::consts::OS)
}
