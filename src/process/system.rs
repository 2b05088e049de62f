use super::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::SetupError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs commands on the host with a per-command timeout
///
/// Output is captured, so interactive prompts of child processes are not
/// shown; every step the engine issues is non-interactive.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, SetupError> {
        debug!(command = %command, cwd = ?command.cwd, "Running command");
        let start = Instant::now();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(SetupError::CommandFailed {
                    command: command.command_line(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                warn!(
                    command = %command,
                    timeout_secs = self.timeout.as_secs(),
                    "Command timed out"
                );
                return Err(SetupError::CommandFailed {
                    command: command.command_line(),
                    message: format!("timed out after {} seconds", self.timeout.as_secs()),
                });
            }
        };

        // Signal-terminated processes have no exit code
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(
            command = %command,
            exit_code,
            elapsed_ms = start.elapsed().as_millis(),
            "Command finished"
        );

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success_captures_stdout() {
        let runner = SystemRunner::new(Duration::from_secs(10));
        let output = runner
            .run(&CommandSpec::shell("echo hello"))
            .await
            .unwrap();

        assert!(output.is_success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_non_zero_exit_is_output_not_error() {
        let runner = SystemRunner::new(Duration::from_secs(10));
        let output = runner
            .run(&CommandSpec::shell("echo broken >&2; exit 3"))
            .await
            .unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.diagnostic(), "broken");
    }

    #[tokio::test]
    async fn test_run_missing_program_is_error() {
        let runner = SystemRunner::new(Duration::from_secs(10));
        let result = runner
            .run(&CommandSpec::new("definitely_not_a_real_command_12345"))
            .await;

        assert!(matches!(result, Err(SetupError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let runner = SystemRunner::new(Duration::from_millis(100));
        let result = runner.run(&CommandSpec::new("sleep").arg("5")).await;

        match result {
            Err(SetupError::CommandFailed { message, .. }) => {
                assert!(message.contains("timed out"))
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_in_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = SystemRunner::new(Duration::from_secs(10));
        let output = runner
            .run(&CommandSpec::new("pwd").current_dir(dir.path()))
            .await
            .unwrap();

        let reported = std::path::PathBuf::from(output.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
