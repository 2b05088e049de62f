//! Dependency installation
//!
//! Each dependency walks a four-state machine:
//!
//! ```text
//! Unchecked ──probe hit──▶ Satisfied
//!     │
//!     └──probe miss──▶ Installing ──steps ok + verified──▶ Verified
//!                          │
//!                          └──step fails / not verified──▶ Failed
//! ```
//!
//! Nothing is persisted between runs; idempotency comes from probing the
//! host again every time.

mod installer;
mod strategy;

pub use installer::{DependencyInstaller, DependencyReport, InstallFailure, InstallOutcome, InstallState};
pub use strategy::{InstallStep, Strategy, StrategyTable};

use crate::process::CommandSpec;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyId {
    Docker,
    Compose,
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyId::Docker => write!(f, "docker"),
            DependencyId::Compose => write!(f, "compose"),
        }
    }
}

/// Static description of an installable dependency
#[derive(Debug, Clone)]
pub struct Dependency {
    pub id: DependencyId,
    pub name: &'static str,
    /// Present when any of these resolves on the search path
    pub executables: Vec<&'static str>,
    /// Present when any of these docker CLI plugins is installed
    pub cli_plugins: Vec<&'static str>,
    /// Version queries run after installation; the first whose program
    /// resolves decides verification
    pub version_checks: Vec<CommandSpec>,
}

impl Dependency {
    pub fn docker() -> Self {
        Self {
            id: DependencyId::Docker,
            name: "Docker",
            executables: vec!["docker"],
            cli_plugins: Vec::new(),
            version_checks: vec![CommandSpec::new("docker").arg("--version")],
        }
    }

    pub fn compose() -> Self {
        Self {
            id: DependencyId::Compose,
            name: "Docker Compose",
            executables: vec!["docker-compose"],
            cli_plugins: vec!["docker-compose"],
            version_checks: vec![
                CommandSpec::new("docker-compose").arg("--version"),
                CommandSpec::new("docker").args(["compose", "version"]),
            ],
        }
    }

    /// Dependencies in installation order; the runtime comes first
    pub fn all() -> Vec<Self> {
        vec![Self::docker(), Self::compose()]
    }
}
