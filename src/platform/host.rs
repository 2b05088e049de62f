use super::{detect, Platform};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

const SYSTEM_PLUGIN_DIRS: [&str; 3] = [
    "/usr/local/lib/docker/cli-plugins",
    "/usr/libexec/docker/cli-plugins",
    "/usr/lib/docker/cli-plugins",
];

/// Ambient host state captured once per run
///
/// Built in `main` and passed down explicitly; the installer, renderer and
/// synthesizer never consult process globals themselves.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub platform: Platform,
    pub work_dir: PathBuf,
    /// Login name granted docker group membership on Linux
    pub user: Option<String>,
    /// Executable search path; `None` means the process default
    pub search_path: Option<OsString>,
    /// CPU architecture as reported by `std::env::consts::ARCH`
    pub arch: String,
    /// Home directory of the invoking user, for per-user docker CLI plugins
    pub home: Option<PathBuf>,
}

impl HostContext {
    pub fn new(platform: Platform, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            work_dir: work_dir.into(),
            user: None,
            search_path: None,
            arch: env::consts::ARCH.to_string(),
            home: None,
        }
    }

    /// Captures the current process environment
    pub fn from_env(work_dir: Option<PathBuf>) -> std::io::Result<Self> {
        let work_dir = match work_dir {
            Some(dir) => dir,
            None => env::current_dir()?,
        };

        // sudo rewrites USER to root; the invoking user is the one to grant
        let user = ["SUDO_USER", "USER", "USERNAME"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());

        Ok(Self {
            platform: detect(),
            work_dir,
            user,
            search_path: env::var_os("PATH"),
            arch: env::consts::ARCH.to_string(),
            home: ["HOME", "USERPROFILE"]
                .iter()
                .filter_map(|key| env::var_os(key))
                .find(|v| !v.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Directories the docker CLI searches for plugins such as `compose`
    pub fn docker_plugin_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .home
            .iter()
            .map(|home| home.join(".docker").join("cli-plugins"))
            .collect();
        if self.platform == Platform::Linux || self.platform == Platform::MacOS {
            dirs.extend(SYSTEM_PLUGIN_DIRS.iter().map(|dir| PathBuf::from(*dir)));
        }
        dirs
    }

    /// Returns a copy rooted at a different working directory
    pub fn in_dir(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: dir.into(),
            ..self.clone()
        }
    }
}
