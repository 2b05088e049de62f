//! Fixed install strategy table keyed by dependency and platform

use super::DependencyId;
use crate::config::DEFAULT_COMPOSE_VERSION;
use crate::platform::{HostContext, Platform};
use crate::probe::CapabilityProbe;
use crate::process::CommandSpec;
use serde::Serialize;

const DOCKER_GPG_URL: &str = "https://download.docker.com/linux/ubuntu/gpg";
const DOCKER_GPG_DOWNLOAD: &str = "/tmp/dockstrap-docker.gpg";
const DOCKER_KEYRING: &str = "/usr/share/keyrings/docker-archive-keyring.gpg";
const DOCKER_APT_SOURCE: &str = "/etc/apt/sources.list.d/docker.list";
const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";
const DOCKER_DESKTOP_WINDOWS_URL: &str =
    "https://desktop.docker.com/win/stable/Docker%20Desktop%20Installer.exe";
const WINDOWS_INSTALLER_NAME: &str = "DockerDesktopInstaller.exe";
const COMPOSE_INSTALL_PATH: &str = "/usr/local/bin/docker-compose";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallStep {
    pub description: String,
    pub command: CommandSpec,
}

impl InstallStep {
    fn new(description: &str, command: CommandSpec) -> Self {
        Self {
            description: description.to_string(),
            command,
        }
    }
}

/// Ordered steps plus notes shown to the user once they complete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Strategy {
    pub steps: Vec<InstallStep>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StrategyTable {
    compose_version: String,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSE_VERSION)
    }
}

impl StrategyTable {
    pub fn new(compose_version: impl Into<String>) -> Self {
        Self {
            compose_version: compose_version.into(),
        }
    }

    /// Looks up the strategy for a dependency on the host's platform
    ///
    /// Returns `None` for unsupported platforms. The probe is consulted for
    /// prerequisites such as Homebrew on macOS.
    pub fn lookup(
        &self,
        dependency: DependencyId,
        host: &HostContext,
        probe: &dyn CapabilityProbe,
    ) -> Option<Strategy> {
        match (dependency, host.platform) {
            (DependencyId::Docker, Platform::Linux) => Some(docker_linux(host)),
            (DependencyId::Docker, Platform::MacOS) => Some(docker_macos(probe)),
            (DependencyId::Docker, Platform::Windows) => Some(docker_windows(host)),
            (DependencyId::Compose, Platform::Linux) => Some(self.compose_linux(host)),
            (DependencyId::Compose, Platform::MacOS | Platform::Windows) => Some(Strategy {
                steps: Vec::new(),
                notes: vec![format!(
                    "Docker Compose comes bundled with Docker Desktop on {}. It is available after starting Docker Desktop.",
                    host.platform
                )],
            }),
            (_, Platform::Unsupported) => None,
        }
    }

    fn compose_linux(&self, host: &HostContext) -> Strategy {
        let url = format!(
            "https://github.com/docker/compose/releases/download/{}/docker-compose-linux-{}",
            self.compose_version,
            compose_arch(&host.arch)
        );

        Strategy {
            steps: vec![
                InstallStep::new(
                    "Download Docker Compose",
                    CommandSpec::sudo(["curl", "-fL", url.as_str(), "-o", COMPOSE_INSTALL_PATH]),
                ),
                InstallStep::new(
                    "Make Docker Compose executable",
                    CommandSpec::sudo(["chmod", "+x", COMPOSE_INSTALL_PATH]),
                ),
            ],
            notes: Vec::new(),
        }
    }
}

fn docker_linux(host: &HostContext) -> Strategy {
    let mut steps = vec![
        InstallStep::new(
            "Update package index",
            CommandSpec::sudo(["apt-get", "update"]),
        ),
        InstallStep::new(
            "Install prerequisites",
            CommandSpec::sudo([
                "apt-get",
                "install",
                "-y",
                "ca-certificates",
                "curl",
                "gnupg",
                "lsb-release",
            ]),
        ),
        InstallStep::new(
            "Download Docker's official GPG key",
            CommandSpec::new("curl").args(["-fsSL", DOCKER_GPG_URL, "-o", DOCKER_GPG_DOWNLOAD]),
        ),
        InstallStep::new(
            "Add Docker's official GPG key",
            CommandSpec::sudo([
                "gpg",
                "--dearmor",
                "--yes",
                "-o",
                DOCKER_KEYRING,
                DOCKER_GPG_DOWNLOAD,
            ]),
        ),
        InstallStep::new(
            "Set up the stable repository",
            CommandSpec::shell(format!(
                "echo \"deb [arch=$(dpkg --print-architecture) signed-by={}] https://download.docker.com/linux/ubuntu $(lsb_release -cs) stable\" | sudo tee {} > /dev/null",
                DOCKER_KEYRING, DOCKER_APT_SOURCE
            )),
        ),
        InstallStep::new(
            "Update package index",
            CommandSpec::sudo(["apt-get", "update"]),
        ),
        InstallStep::new(
            "Install Docker Engine",
            CommandSpec::sudo([
                "apt-get",
                "install",
                "-y",
                "docker-ce",
                "docker-ce-cli",
                "containerd.io",
            ]),
        ),
    ];

    let mut notes = Vec::new();
    match host.user.as_deref() {
        Some(user) if user != "root" => {
            steps.push(InstallStep::new(
                "Add user to docker group",
                CommandSpec::sudo(["usermod", "-aG", "docker", user]),
            ));
            notes.push(format!(
                "Log out and back in for the docker group membership of '{}' to take effect.",
                user
            ));
        }
        _ => {}
    }

    Strategy { steps, notes }
}

fn docker_macos(probe: &dyn CapabilityProbe) -> Strategy {
    let mut steps = Vec::new();
    if !probe.exists("brew") {
        steps.push(InstallStep::new(
            "Install Homebrew",
            CommandSpec::new("/bin/bash").arg("-c").arg(format!(
                "NONINTERACTIVE=1 /bin/bash -c \"$(curl -fsSL {})\"",
                HOMEBREW_INSTALL_URL
            )),
        ));
    }
    steps.push(InstallStep::new(
        "Install Docker Desktop",
        CommandSpec::new("brew").args(["install", "--cask", "docker"]),
    ));

    Strategy {
        steps,
        notes: vec!["Docker installation initiated on macOS. Please start Docker Desktop manually.".to_string()],
    }
}

fn docker_windows(host: &HostContext) -> Strategy {
    let installer = host.work_dir.join(WINDOWS_INSTALLER_NAME);
    let installer = installer.display().to_string();

    Strategy {
        steps: vec![
            InstallStep::new(
                "Download Docker Desktop installer",
                CommandSpec::new("powershell").args([
                    "-NoProfile".to_string(),
                    "-Command".to_string(),
                    format!(
                        "Invoke-WebRequest -Uri '{}' -OutFile '{}'",
                        DOCKER_DESKTOP_WINDOWS_URL, installer
                    ),
                ]),
            ),
            InstallStep::new("Run Docker Desktop installer", CommandSpec::new(installer)),
        ],
        notes: vec![
            "Docker installation initiated on Windows. Please follow the installer prompts and restart your system if required.".to_string(),
        ],
    }
}

/// Maps `std::env::consts::ARCH` to the compose release asset suffix
fn compose_arch(arch: &str) -> &str {
    match arch {
        "arm" => "armv7",
        "powerpc64" => "ppc64le",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::StaticProbe;

    fn lines(strategy: &Strategy) -> Vec<String> {
        strategy
            .steps
            .iter()
            .map(|s| s.command.command_line())
            .collect()
    }

    #[test]
    fn test_docker_linux_sequence() {
        let host = HostContext::new(Platform::Linux, "/work").with_user("dev");
        let strategy = StrategyTable::default()
            .lookup(DependencyId::Docker, &host, &StaticProbe::new())
            .unwrap();
        let lines = lines(&strategy);

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "sudo apt-get update");
        assert_eq!(
            lines[2],
            format!("curl -fsSL {} -o {}", DOCKER_GPG_URL, DOCKER_GPG_DOWNLOAD)
        );
        assert_eq!(
            lines[3],
            format!(
                "sudo gpg --dearmor --yes -o {} {}",
                DOCKER_KEYRING, DOCKER_GPG_DOWNLOAD
            )
        );
        assert!(lines[4].contains(DOCKER_APT_SOURCE));
        assert_eq!(
            lines[6],
            "sudo apt-get install -y docker-ce docker-ce-cli containerd.io"
        );
        assert_eq!(lines[7], "sudo usermod -aG docker dev");
        assert_eq!(strategy.notes.len(), 1);
    }

    #[test]
    fn test_docker_linux_without_user_skips_group_grant() {
        let host = HostContext::new(Platform::Linux, "/work");
        let strategy = StrategyTable::default()
            .lookup(DependencyId::Docker, &host, &StaticProbe::new())
            .unwrap();

        assert_eq!(strategy.steps.len(), 7);
        assert!(!lines(&strategy).iter().any(|l| l.contains("usermod")));
    }

    #[test]
    fn test_docker_macos_installs_homebrew_when_missing() {
        let host = HostContext::new(Platform::MacOS, "/work");
        let table = StrategyTable::default();

        let without_brew = table
            .lookup(DependencyId::Docker, &host, &StaticProbe::new())
            .unwrap();
        assert_eq!(without_brew.steps.len(), 2);
        assert_eq!(without_brew.steps[0].description, "Install Homebrew");

        let with_brew = table
            .lookup(DependencyId::Docker, &host, &StaticProbe::with_present(["brew"]))
            .unwrap();
        assert_eq!(lines(&with_brew), vec!["brew install --cask docker"]);
    }

    #[test]
    fn test_docker_windows_downloads_into_work_dir() {
        let host = HostContext::new(Platform::Windows, "/work");
        let strategy = StrategyTable::default()
            .lookup(DependencyId::Docker, &host, &StaticProbe::new())
            .unwrap();

        assert_eq!(strategy.steps.len(), 2);
        assert_eq!(strategy.steps[0].command.program, "powershell");
        assert!(strategy.steps[0].command.args[2].contains("Invoke-WebRequest"));
        assert!(strategy.steps[1]
            .command
            .program
            .ends_with(WINDOWS_INSTALLER_NAME));
    }

    #[test]
    fn test_compose_linux_uses_configured_version_and_arch() {
        let host = HostContext::new(Platform::Linux, "/work").with_arch("aarch64");
        let strategy = StrategyTable::new("v2.24.0")
            .lookup(DependencyId::Compose, &host, &StaticProbe::new())
            .unwrap();
        let lines = lines(&strategy);

        assert_eq!(
            lines[0],
            "sudo curl -fL https://github.com/docker/compose/releases/download/v2.24.0/docker-compose-linux-aarch64 -o /usr/local/bin/docker-compose"
        );
        assert_eq!(lines[1], "sudo chmod +x /usr/local/bin/docker-compose");
    }

    #[test]
    fn test_compose_bundled_on_desktop_platforms() {
        for platform in [Platform::MacOS, Platform::Windows] {
            let host = HostContext::new(platform, "/work");
            let strategy = StrategyTable::default()
                .lookup(DependencyId::Compose, &host, &StaticProbe::new())
                .unwrap();
            assert!(strategy.steps.is_empty());
            assert!(strategy.notes[0].contains("bundled with Docker Desktop"));
        }
    }

    #[test]
    fn test_unsupported_platform_has_no_strategy() {
        let host = HostContext::new(Platform::Unsupported, "/work");
        let table = StrategyTable::default();
        assert!(table
            .lookup(DependencyId::Docker, &host, &StaticProbe::new())
            .is_none());
        assert!(table
            .lookup(DependencyId::Compose, &host, &StaticProbe::new())
            .is_none());
    }

    #[test]
    fn test_compose_arch_mapping() {
        assert_eq!(compose_arch("x86_64"), "x86_64");
        assert_eq!(compose_arch("arm"), "armv7");
    }
}
