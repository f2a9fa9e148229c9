//! Build information
//!
//! `build.rs` stamps a build counter and compile time into the environment;
//! builds without those stamps report build 0 at an unknown time.

use std::fmt;

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: u64,
    /// UTC compile time in ISO 8601
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::from_stamps(
            option_env!("DIETA_BUILD_NUMBER"),
            option_env!("DIETA_BUILD_TIMESTAMP"),
        )
    }

    fn from_stamps(number: Option<&str>, timestamp: Option<&'static str>) -> Self {
        Self {
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            build_timestamp: timestamp.filter(|t| !t.is_empty()).unwrap_or("unknown"),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} (build {}, {})",
            self.version, self.build_number, self.build_timestamp
        )
    }
}

/// Print the startup banner to stderr (stdout belongs to the MCP transport)
pub fn print_startup_banner() {
    eprintln!("-----------------------------------------------");
    eprintln!("  Dieta - diet log & recipe nutrition");
    eprintln!("  {}", BuildInfo::current());
    eprintln!("-----------------------------------------------");
}
