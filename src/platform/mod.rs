//! Host platform detection
//!
//! The platform is derived from the compile-target OS identifier, so it is
//! deterministic for a given binary and host. Unknown systems map to
//! [`Platform::Unsupported`] instead of an error; the installer decides
//! what to do with them.

mod host;

pub use host::HostContext;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
    Unsupported,
}

impl Platform {
    /// Maps an OS identifier as reported by `std::env::consts::OS`
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOS,
            "windows" => Platform::Windows,
            _ => Platform::Unsupported,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::MacOS => "macOS",
            Platform::Windows => "Windows",
            Platform::Unsupported => "Unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detects the platform this process runs on
pub fn detect() -> Platform {
    Platform::from_os(std::env::consts::OS)
}
