//! Process boundary
//!
//! Every external effect (package managers, downloads, `git clone`,
//! `docker build`) goes through [`CommandRunner`]. Only exit code zero
//! counts as success.

mod mock;
mod system;

pub use mock::ScriptedRunner;
pub use system::SystemRunner;

use crate::error::SetupError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Runs a pipeline through `sh -c`
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    /// Runs a privileged command through `sudo`
    pub fn sudo<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("sudo").args(args)
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// Completion record of an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best diagnostic text for a failed command
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exited with status {}", self.exit_code)
    }
}

/// Runs external commands
///
/// `Err` means the command could not run to completion (spawn failure or
/// timeout); a non-zero exit is reported through [`CommandOutput`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, SetupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let cmd = CommandSpec::sudo(["apt-get", "install", "-y", "curl"]);
        assert_eq!(cmd.command_line(), "sudo apt-get install -y curl");
        assert_eq!(cmd.to_string(), "sudo apt-get install -y curl");
    }

    #[test]
    fn test_shell_wraps_script() {
        let cmd = CommandSpec::shell("echo deb | sudo tee x");
        assert_eq!(cmd.program, "sh");
        assert_eq!(cmd.args, vec!["-c", "echo deb | sudo tee x"]);
    }

    #[test]
    fn test_current_dir() {
        let cmd = CommandSpec::new("docker").current_dir("/work/app");
        assert_eq!(cmd.cwd, Some(PathBuf::from("/work/app")));
    }

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let output = CommandOutput {
            exit_code: 1,
            stdout: "some progress".to_string(),
            stderr: "E: Unable to locate package\n".to_string(),
        };
        assert_eq!(output.diagnostic(), "E: Unable to locate package");
    }

    #[test]
    fn test_diagnostic_falls_back_to_status() {
        let output = CommandOutput::failure(127, "  ");
        assert_eq!(output.diagnostic(), "exited with status 127");
        assert!(!output.is_success());
        assert!(CommandOutput::success("").is_success());
    }
}
