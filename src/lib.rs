//! dockstrap - idempotent Docker provisioning and project scaffolding
//!
//! This library installs a container runtime (Docker) and its compose tool on
//! a developer machine when they are missing, then scaffolds a minimal
//! containerized project: a `Dockerfile` for the chosen application stack
//! and a `docker-compose.yml` that publishes the port the Dockerfile exposes.
//!
//! # Core Concepts
//!
//! - **Host context**: platform, working directory, user and search path,
//!   captured once at startup and passed down explicitly
//! - **Capability probe**: checks whether an executable resolves without
//!   running it; a present dependency is never reinstalled
//! - **Command runner**: the only path to host mutation, with a scripted
//!   implementation for tests and dry runs
//! - **Templates**: per-stack container definitions (node, django, flask)
//!
//! # Example Usage
//!
//! ```no_run
//! use dockstrap::{
//!     DockstrapConfig, HostContext, PathProbe, RealFileSystem, ScaffoldPlan, SetupOrchestrator,
//!     SetupPlan, SystemRunner,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DockstrapConfig::default();
//! let host = HostContext::from_env(None)?;
//! let orchestrator = SetupOrchestrator::new(
//!     Arc::new(SystemRunner::new(config.step_timeout())),
//!     Arc::new(PathProbe::for_host(&host)),
//!     Arc::new(RealFileSystem),
//!     config,
//!     host,
//! );
//!
//! let report = orchestrator
//!     .run(&SetupPlan {
//!         install: true,
//!         scaffold: Some(ScaffoldPlan {
//!             repo_url: "https://github.com/acme/shop.git".to_string(),
//!             stack: "node".to_string(),
//!             ..Default::default()
//!         }),
//!     })
//!     .await?;
//! println!("Wrote {:?}", report.files);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`install`]: dependency install/verify state machine and strategy table
//! - [`stack`]: stack templates and the Dockerfile renderer
//! - [`compose`]: compose manifest synthesis
//! - [`orchestrator`]: sequencing of a full setup run

pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod fs;
pub mod install;
pub mod orchestrator;
pub mod platform;
pub mod probe;
pub mod process;
pub mod progress;
pub mod stack;
pub mod util;

// Re-export key types for convenient access
pub use compose::ComposeManifest;
pub use config::{ConfigError, DockstrapConfig};
pub use error::SetupError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use install::{Dependency, DependencyInstaller, InstallOutcome, InstallState};
pub use orchestrator::{ScaffoldPlan, SetupOrchestrator, SetupPlan, SetupReport};
pub use platform::{HostContext, Platform};
pub use probe::{CapabilityProbe, PathProbe, StaticProbe};
pub use process::{CommandOutput, CommandRunner, CommandSpec, ScriptedRunner, SystemRunner};
pub use stack::{ContainerDefinition, RenderParams, Stack, TemplateRenderer};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_dockstrap() {
        assert_eq!(NAME, "dockstrap");
    }
}
