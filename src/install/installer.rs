use super::strategy::{Strategy, StrategyTable};
use super::Dependency;
use crate::error::SetupError;
use crate::platform::HostContext;
use crate::probe::CapabilityProbe;
use crate::process::CommandRunner;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Why a dependency ended in the Failed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstallFailure {
    UnsupportedPlatform { os: String },
    StepFailed { step: String, diagnostic: String },
    VerificationFailed { diagnostic: String },
}

impl fmt::Display for InstallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallFailure::UnsupportedPlatform { os } => {
                write!(f, "unsupported platform ({})", os)
            }
            InstallFailure::StepFailed { step, diagnostic } => {
                write!(f, "step '{}' failed: {}", step, diagnostic)
            }
            InstallFailure::VerificationFailed { diagnostic } => {
                write!(f, "verification failed: {}", diagnostic)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Unchecked,
    Satisfied,
    Installing(Strategy),
    Verified,
    Failed(InstallFailure),
}

impl InstallState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InstallState::Satisfied | InstallState::Verified | InstallState::Failed(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallOutcome {
    AlreadySatisfied,
    Installed,
    Failed { reason: InstallFailure },
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, InstallOutcome::Failed { .. })
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::AlreadySatisfied => write!(f, "already installed"),
            InstallOutcome::Installed => write!(f, "installed"),
            InstallOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Result of driving one dependency to a terminal state
#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport {
    pub dependency: String,
    pub outcome: InstallOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl DependencyReport {
    /// Converts a failed outcome into the run-aborting error
    pub fn into_result(self) -> Result<Self, SetupError> {
        match &self.outcome {
            InstallOutcome::Failed {
                reason: InstallFailure::UnsupportedPlatform { os },
            } => Err(SetupError::UnsupportedPlatform {
                os: os.clone(),
                dependency: self.dependency.clone(),
            }),
            InstallOutcome::Failed {
                reason: InstallFailure::StepFailed { step, diagnostic },
            } => Err(SetupError::InstallStepFailed {
                dependency: self.dependency.clone(),
                step: step.clone(),
                diagnostic: diagnostic.clone(),
            }),
            InstallOutcome::Failed {
                reason: InstallFailure::VerificationFailed { diagnostic },
            } => Err(SetupError::InstallStepFailed {
                dependency: self.dependency.clone(),
                step: "verify".to_string(),
                diagnostic: diagnostic.clone(),
            }),
            _ => Ok(self),
        }
    }
}

/// Drives dependencies through the install state machine
///
/// All host mutation goes through the injected [`CommandRunner`]; a
/// scripted runner turns the installer into a dry run.
pub struct DependencyInstaller<'a> {
    runner: &'a dyn CommandRunner,
    probe: &'a dyn CapabilityProbe,
    host: &'a HostContext,
    table: StrategyTable,
    progress: &'a dyn ProgressHandler,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        probe: &'a dyn CapabilityProbe,
        host: &'a HostContext,
        table: StrategyTable,
    ) -> Self {
        Self {
            runner,
            probe,
            host,
            table,
            progress: &NoOpHandler,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressHandler) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the state machine for `dependency` until it reaches a terminal state
    pub async fn install(&self, dependency: &Dependency) -> DependencyReport {
        let mut state = InstallState::Unchecked;
        let mut notes = Vec::new();

        let outcome = loop {
            match state {
                InstallState::Satisfied => break InstallOutcome::AlreadySatisfied,
                InstallState::Verified => break InstallOutcome::Installed,
                InstallState::Failed(reason) => {
                    notes.clear();
                    break InstallOutcome::Failed { reason };
                }
                pending => {
                    if let InstallState::Installing(strategy) = &pending {
                        notes = strategy.notes.clone();
                    }
                    state = self.advance(dependency, pending).await;
                }
            }
        };

        self.progress.on_progress(&ProgressEvent::DependencyResolved {
            dependency: dependency.name.to_string(),
            outcome: outcome.to_string(),
        });

        DependencyReport {
            dependency: dependency.name.to_string(),
            outcome,
            notes,
        }
    }

    /// Performs a single transition
    pub async fn advance(&self, dependency: &Dependency, state: InstallState) -> InstallState {
        match state {
            InstallState::Unchecked => self.check(dependency),
            InstallState::Installing(strategy) => self.run_strategy(dependency, &strategy).await,
            terminal => terminal,
        }
    }

    /// Steps that `install` would run, without running them
    ///
    /// `Ok(None)` means the dependency is already present.
    pub fn plan(&self, dependency: &Dependency) -> Result<Option<Strategy>, InstallFailure> {
        match self.check(dependency) {
            InstallState::Satisfied => Ok(None),
            InstallState::Installing(strategy) => Ok(Some(strategy)),
            InstallState::Failed(reason) => Err(reason),
            _ => Ok(None),
        }
    }

    /// Any executable on the search path or any docker CLI plugin counts
    fn resolves(&self, dependency: &Dependency) -> bool {
        dependency
            .executables
            .iter()
            .any(|exe| self.probe.exists(exe))
            || dependency
                .cli_plugins
                .iter()
                .any(|plugin| self.probe.plugin_exists(plugin))
    }

    fn check(&self, dependency: &Dependency) -> InstallState {
        let present = self.resolves(dependency);

        self.progress.on_progress(&ProgressEvent::DependencyProbed {
            dependency: dependency.name.to_string(),
            present,
        });

        if present {
            info!(dependency = dependency.name, "Already installed");
            return InstallState::Satisfied;
        }

        let probe_miss = SetupError::ProbeFailed {
            executable: dependency.executables.join(" / "),
        };
        debug!(dependency = dependency.name, "{}", probe_miss);

        match self.table.lookup(dependency.id, self.host, self.probe) {
            Some(strategy) => InstallState::Installing(strategy),
            None => {
                warn!(
                    dependency = dependency.name,
                    platform = %self.host.platform,
                    "Unsupported operating system"
                );
                InstallState::Failed(InstallFailure::UnsupportedPlatform {
                    os: self.host.platform.to_string(),
                })
            }
        }
    }

    async fn run_strategy(&self, dependency: &Dependency, strategy: &Strategy) -> InstallState {
        info!(
            dependency = dependency.name,
            steps = strategy.steps.len(),
            "Installing"
        );

        let total = strategy.steps.len();
        for (index, step) in strategy.steps.iter().enumerate() {
            self.progress.on_progress(&ProgressEvent::InstallStepStarted {
                dependency: dependency.name.to_string(),
                step: step.description.clone(),
                index,
                total,
            });

            let diagnostic = match self.runner.run(&step.command).await {
                Ok(output) if output.is_success() => continue,
                Ok(output) => output.diagnostic(),
                Err(e) => e.to_string(),
            };

            warn!(
                dependency = dependency.name,
                step = %step.description,
                "Install step failed"
            );
            return InstallState::Failed(InstallFailure::StepFailed {
                step: step.description.clone(),
                diagnostic,
            });
        }

        match self.verify(dependency).await {
            Ok(()) => InstallState::Verified,
            Err(diagnostic) => {
                InstallState::Failed(InstallFailure::VerificationFailed { diagnostic })
            }
        }
    }

    async fn verify(&self, dependency: &Dependency) -> Result<(), String> {
        let mut last_error = None;

        for check in &dependency.version_checks {
            if !self.probe.exists(&check.program) {
                continue;
            }
            match self.runner.run(check).await {
                Ok(output) if output.is_success() => {
                    info!(
                        dependency = dependency.name,
                        version = output.stdout.trim(),
                        "Verified installation"
                    );
                    return Ok(());
                }
                Ok(output) => last_error = Some(output.diagnostic()),
                Err(e) => last_error = Some(e.to_string()),
            }
        }

        if self.resolves(dependency) {
            debug!(
                dependency = dependency.name,
                "Version query failed but executable resolves"
            );
            return Ok(());
        }

        Err(last_error.unwrap_or_else(|| {
            format!(
                "{} not found on the search path after installation",
                dependency.executables.join(" / ")
            )
        }))
    }
}
