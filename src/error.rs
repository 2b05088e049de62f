//! Error taxonomy for provisioning and scaffolding
//!
//! Every fatal condition aborts the whole run. `ProbeFailed` and
//! `MissingDependencyManifest` are the two non-fatal kinds: the first only
//! triggers an install attempt, the second is reported as a warning.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for runtime failures (install, clone, build, I/O)
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for rejected user input
pub const EXIT_INVALID_INPUT: i32 = 2;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Unsupported operating system '{os}'. Please install {dependency} manually")]
    UnsupportedPlatform { os: String, dependency: String },

    #[error("{executable} was not found on the search path")]
    ProbeFailed { executable: String },

    #[error("Installing {dependency} failed at step '{step}': {diagnostic}")]
    InstallStepFailed {
        dependency: String,
        step: String,
        diagnostic: String,
    },

    #[error("Failed to clone repository {url}: {diagnostic}")]
    CloneFailed { url: String, diagnostic: String },

    #[error("Invalid project type '{0}'. Valid options: node, django, flask")]
    InvalidStack(String),

    #[error("'{manifest}' not found in {}. Skipping dependency installation", .dir.display())]
    MissingDependencyManifest { manifest: String, dir: PathBuf },

    #[error("Failed to build Docker image '{image}': {diagnostic}")]
    BuildFailed {
        image: String,
        diagnostic: String,
        hints: Vec<String>,
    },

    #[error("Cannot determine the port to expose: no explicit port and no EXPOSE directive")]
    MissingPort,

    #[error("Repository URL cannot be empty")]
    MissingRepositoryUrl,

    #[error("Invalid port '{0}'. Expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("Invalid service name '{0}'. Use letters, digits, '_', '.' or '-', starting with a letter or digit")]
    InvalidServiceName(String),

    #[error("Failed to serialize compose manifest: {0}")]
    Serialization(String),

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SetupError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::InvalidStack(_)
            | SetupError::MissingRepositoryUrl
            | SetupError::InvalidPort(_)
            | SetupError::InvalidServiceName(_) => EXIT_INVALID_INPUT,
            _ => EXIT_FAILURE,
        }
    }

    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SetupError::ProbeFailed { .. } | SetupError::MissingDependencyManifest { .. }
        )
    }

    /// Remediation hints attached to build failures
    pub fn hints(&self) -> &[String] {
        match self {
            SetupError::BuildFailed { hints, .. } => hints,
            _ => &[],
        }
    }
}
