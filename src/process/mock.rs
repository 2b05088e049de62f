use super::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::SetupError;
use crate::fs::MockFileSystem;
use crate::probe::StaticProbe;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Outcome {
    Output(CommandOutput),
    Error(String),
}

#[derive(Debug, Clone)]
enum Effect {
    MarkPresent(String),
    CreateDir(PathBuf),
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    outcome: Outcome,
    effects: Vec<Effect>,
}

/// Runner that records commands and answers from scripted rules
///
/// Rules match on a substring of the command line; the first match wins.
/// Unmatched commands succeed with empty output. Effects let a rule
/// emulate what the real command would change on the host, such as an
/// executable appearing on the search path after an install.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<CommandSpec>>,
    probe: Option<Arc<StaticProbe>>,
    fs: Option<Arc<MockFileSystem>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(mut self, probe: Arc<StaticProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_fs(mut self, fs: Arc<MockFileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Commands containing `pattern` complete with `output`
    pub fn respond(&self, pattern: &str, output: CommandOutput) -> &Self {
        self.push(pattern, Outcome::Output(output), Vec::new());
        self
    }

    /// Commands containing `pattern` exit with `exit_code` and `stderr`
    pub fn fail(&self, pattern: &str, exit_code: i32, stderr: &str) -> &Self {
        self.respond(pattern, CommandOutput::failure(exit_code, stderr))
    }

    /// Commands containing `pattern` cannot be run at all
    pub fn error(&self, pattern: &str, message: &str) -> &Self {
        self.push(pattern, Outcome::Error(message.to_string()), Vec::new());
        self
    }

    /// A successful command containing `pattern` makes `executable` resolvable
    pub fn installs(&self, pattern: &str, executable: &str) -> &Self {
        self.push(
            pattern,
            Outcome::Output(CommandOutput::success("")),
            vec![Effect::MarkPresent(executable.to_string())],
        );
        self
    }

    /// A successful command containing `pattern` creates `dir`
    pub fn creates_dir(&self, pattern: &str, dir: impl Into<PathBuf>) -> &Self {
        self.push(
            pattern,
            Outcome::Output(CommandOutput::success("")),
            vec![Effect::CreateDir(dir.into())],
        );
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::command_line).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, pattern: &str, outcome: Outcome, effects: Vec<Effect>) {
        self.rules.lock().unwrap().push(Rule {
            pattern: pattern.to_string(),
            outcome,
            effects,
        });
    }

    fn apply(&self, effect: &Effect) {
        match effect {
            Effect::MarkPresent(name) => {
                if let Some(probe) = &self.probe {
                    probe.mark_present(name.clone());
                }
            }
            Effect::CreateDir(dir) => {
                if let Some(fs) = &self.fs {
                    fs.add_dir(dir);
                }
            }
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, SetupError> {
        self.calls.lock().unwrap().push(command.clone());
        let line = command.command_line();

        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|rule| line.contains(&rule.pattern))
            .cloned();

        let Some(rule) = rule else {
            return Ok(CommandOutput::success(""));
        };

        match rule.outcome {
            Outcome::Output(output) => {
                if output.is_success() {
                    for effect in &rule.effects {
                        self.apply(effect);
                    }
                }
                Ok(output)
            }
            Outcome::Error(message) => Err(SetupError::CommandFailed {
                command: line,
                message,
            }),
        }
    }
}
