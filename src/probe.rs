//! Capability probe: is an executable on the search path?
//!
//! Probes only resolve names; they never run the executable. Running a
//! version query is a separate, explicit step of the installer.

use crate::platform::HostContext;
use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::trace;

pub trait CapabilityProbe: Send + Sync {
    fn exists(&self, command: &str) -> bool;

    /// Whether a docker CLI plugin binary (e.g. `docker-compose`) is installed
    fn plugin_exists(&self, plugin: &str) -> bool;
}

/// Probe backed by the `which` crate
#[derive(Debug, Clone, Default)]
pub struct PathProbe {
    search_path: Option<OsString>,
    cwd: Option<PathBuf>,
    plugin_dirs: Vec<PathBuf>,
}

impl PathProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_host(host: &HostContext) -> Self {
        Self {
            search_path: host.search_path.clone(),
            cwd: Some(host.work_dir.clone()),
            plugin_dirs: host.docker_plugin_dirs(),
        }
    }
}

impl CapabilityProbe for PathProbe {
    fn exists(&self, command: &str) -> bool {
        let found = match (&self.search_path, &self.cwd) {
            (Some(paths), Some(cwd)) => which::which_in(command, Some(paths), cwd).is_ok(),
            _ => which::which(command).is_ok(),
        };
        trace!(command, found, "Probed executable");
        found
    }

    fn plugin_exists(&self, plugin: &str) -> bool {
        let Ok(dirs) = env::join_paths(&self.plugin_dirs) else {
            return false;
        };
        let cwd = self.cwd.clone().unwrap_or_else(|| PathBuf::from("/"));
        let found = which::which_in(plugin, Some(dirs), cwd).is_ok();
        trace!(plugin, found, "Probed docker CLI plugin");
        found
    }
}

/// Probe answering from a fixed, mutable set of names
///
/// `mark_present` lets a scripted runner emulate a successful install.
#[derive(Debug, Default)]
pub struct StaticProbe {
    present: RwLock<HashSet<String>>,
    plugins: RwLock<HashSet<String>>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_present<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let probe = Self::new();
        for name in names {
            probe.mark_present(name);
        }
        probe
    }

    pub fn mark_present(&self, name: impl Into<String>) {
        self.present.write().unwrap().insert(name.into());
    }

    pub fn mark_plugin(&self, name: impl Into<String>) {
        self.plugins.write().unwrap().insert(name.into());
    }
}

impl CapabilityProbe for StaticProbe {
    fn exists(&self, command: &str) -> bool {
        self.present.read().unwrap().contains(command)
    }

    fn plugin_exists(&self, plugin: &str) -> bool {
        self.plugins.read().unwrap().contains(plugin)
    }
}
