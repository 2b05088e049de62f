//! Setup orchestration
//!
//! Sequences dependency installation, repository clone, container
//! definition rendering, image build and compose synthesis. The first fatal
//! failure aborts the run; nothing is retried or rolled back.

mod hints;
mod report;

pub use hints::remediation_hints;
pub use report::{InstallPlan, SetupReport};

use crate::compose::{self, COMPOSE_FILE_NAME, DOCKERFILE_NAME};
use crate::config::DockstrapConfig;
use crate::error::SetupError;
use crate::fs::FileSystem;
use crate::install::{Dependency, DependencyInstaller, InstallFailure, StrategyTable};
use crate::platform::HostContext;
use crate::probe::CapabilityProbe;
use crate::process::{CommandRunner, CommandSpec};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler, Stage};
use crate::stack::{parse_port, RenderParams, Stack, TemplateRenderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Answers that drive a run
#[derive(Debug, Clone, Default)]
pub struct SetupPlan {
    pub install: bool,
    pub scaffold: Option<ScaffoldPlan>,
}

/// Project scaffolding inputs, as typed by the user
///
/// Values are validated when the run starts, before anything is cloned.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldPlan {
    pub repo_url: String,
    pub stack: String,
    pub runtime_version: Option<String>,
    pub port: Option<String>,
    pub image_name: Option<String>,
    pub service_name: Option<String>,
    /// Published port; defaults to the Dockerfile's exposed port
    pub compose_port: Option<String>,
}

pub struct SetupOrchestrator {
    runner: Arc<dyn CommandRunner>,
    probe: Arc<dyn CapabilityProbe>,
    fs: Arc<dyn FileSystem>,
    config: DockstrapConfig,
    host: HostContext,
    progress: Arc<dyn ProgressHandler>,
}

impl SetupOrchestrator {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        probe: Arc<dyn CapabilityProbe>,
        fs: Arc<dyn FileSystem>,
        config: DockstrapConfig,
        host: HostContext,
    ) -> Self {
        Self {
            runner,
            probe,
            fs,
            config,
            host,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub async fn run(&self, plan: &SetupPlan) -> Result<SetupReport, SetupError> {
        let start = Instant::now();
        info!(
            work_dir = %self.host.work_dir.display(),
            platform = %self.host.platform,
            "Starting setup"
        );
        self.progress.on_progress(&ProgressEvent::Started {
            work_dir: self.host.work_dir.display().to_string(),
        });

        let mut report = SetupReport::new(self.host.platform, &self.host.work_dir);
        match self.execute(plan, &mut report).await {
            Ok(()) => {
                self.progress.on_progress(&ProgressEvent::Completed {
                    total_time: start.elapsed(),
                });
                Ok(report)
            }
            Err(e) => {
                self.progress.on_progress(&ProgressEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn execute(&self, plan: &SetupPlan, report: &mut SetupReport) -> Result<(), SetupError> {
        if plan.install {
            self.install_dependencies(report).await?;
        } else {
            info!("Skipping Docker installation");
        }

        match &plan.scaffold {
            Some(scaffold) => self.scaffold(scaffold, report).await,
            None => {
                info!("Skipping project scaffolding");
                Ok(())
            }
        }
    }

    /// Installs docker, then compose; the first failure aborts
    pub async fn install_dependencies(&self, report: &mut SetupReport) -> Result<(), SetupError> {
        let started = self.stage_started(Stage::Install);
        let installer = self.installer();

        for dependency in Dependency::all() {
            let outcome = installer.install(&dependency).await;
            if !outcome.outcome.is_success() {
                for done in &report.dependencies {
                    warn!(
                        dependency = %done.dependency,
                        outcome = %done.outcome,
                        failed = %outcome.dependency,
                        "Kept earlier dependency despite the failure"
                    );
                }
            }
            report.dependencies.push(outcome.into_result()?);
        }

        self.stage_complete(Stage::Install, started);
        Ok(())
    }

    /// Steps `install_dependencies` would run, without running any
    pub fn plan_install(&self) -> Result<Vec<InstallPlan>, SetupError> {
        let installer = self.installer();

        Dependency::all()
            .into_iter()
            .map(|dependency| match installer.plan(&dependency) {
                Ok(None) => Ok(InstallPlan {
                    dependency: dependency.name.to_string(),
                    satisfied: true,
                    steps: Vec::new(),
                    notes: Vec::new(),
                }),
                Ok(Some(strategy)) => Ok(InstallPlan {
                    dependency: dependency.name.to_string(),
                    satisfied: false,
                    steps: strategy.steps,
                    notes: strategy.notes,
                }),
                Err(InstallFailure::UnsupportedPlatform { os }) => {
                    Err(SetupError::UnsupportedPlatform {
                        os,
                        dependency: dependency.name.to_string(),
                    })
                }
                Err(other) => Err(SetupError::InstallStepFailed {
                    dependency: dependency.name.to_string(),
                    step: "plan".to_string(),
                    diagnostic: other.to_string(),
                }),
            })
            .collect()
    }

    async fn scaffold(&self, plan: &ScaffoldPlan, report: &mut SetupReport) -> Result<(), SetupError> {
        let repo_url = plan.repo_url.trim();
        if repo_url.is_empty() {
            return Err(SetupError::MissingRepositoryUrl);
        }
        let stack: Stack = plan.stack.parse()?;

        let params = RenderParams {
            runtime_version: plan.runtime_version.clone(),
            port: plan.port.clone(),
            has_dependency_manifest: None,
        };
        params.resolve_port(stack)?;
        if let Some(port) = non_blank(plan.compose_port.as_deref()) {
            parse_port(port)?;
        }
        if repo_url.starts_with('-') {
            return Err(SetupError::CloneFailed {
                url: repo_url.to_string(),
                diagnostic: "repository URL cannot start with '-'".to_string(),
            });
        }
        let project_name = repository_name(repo_url).ok_or_else(|| SetupError::CloneFailed {
            url: repo_url.to_string(),
            diagnostic: "cannot derive a project directory from the URL".to_string(),
        })?;

        let image = non_blank(plan.image_name.as_deref())
            .unwrap_or(self.config.default_image_name.as_str())
            .to_string();
        let service = compose::validate_service_name(
            non_blank(plan.service_name.as_deref())
                .unwrap_or(self.config.default_service_name.as_str()),
        )?
        .to_string();

        let project_dir = self.clone_repository(repo_url, project_name).await?;
        report.project_dir = Some(project_dir.clone());
        report.stack = Some(stack);

        let started = self.stage_started(Stage::Render);
        let rendered = TemplateRenderer::new(self.fs.as_ref()).render(stack, &params, &project_dir)?;
        for warning in &rendered.warnings {
            self.progress.on_progress(&ProgressEvent::Warning {
                message: warning.to_string(),
            });
            report.warnings.push(warning.to_string());
        }
        let dockerfile = project_dir.join(DOCKERFILE_NAME);
        self.write_file(&dockerfile, &rendered.definition.text())?;
        report.files.push(dockerfile);
        self.stage_complete(Stage::Render, started);

        self.build_image(&image, &project_dir).await?;
        report.image = Some(image);

        let started = self.stage_started(Stage::Compose);
        let manifest = compose::synthesize(
            &service,
            plan.compose_port.as_deref(),
            Some(&rendered.definition),
        )?;
        let compose_file = project_dir.join(COMPOSE_FILE_NAME);
        self.write_file(&compose_file, &manifest.to_yaml()?)?;
        report.files.push(compose_file);
        report.service = Some(manifest.service_name);
        report.port = Some(manifest.port);
        self.stage_complete(Stage::Compose, started);

        Ok(())
    }

    async fn clone_repository(&self, url: &str, project_name: &str) -> Result<PathBuf, SetupError> {
        let started = self.stage_started(Stage::Clone);
        let command = CommandSpec::new("git")
            .args(["clone", "--", url])
            .current_dir(&self.host.work_dir);
        debug!(command = %command, "Cloning repository");

        let failure = match self.runner.run(&command).await {
            Ok(output) if output.is_success() => None,
            Ok(output) => Some(output.diagnostic()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(diagnostic) = failure {
            return Err(SetupError::CloneFailed {
                url: url.to_string(),
                diagnostic,
            });
        }

        let project_dir = self.host.work_dir.join(project_name);
        info!(project = project_name, "Repository cloned");
        self.stage_complete(Stage::Clone, started);
        Ok(project_dir)
    }

    async fn build_image(&self, image: &str, project_dir: &Path) -> Result<(), SetupError> {
        let started = self.stage_started(Stage::Build);
        let command = CommandSpec::new("docker")
            .args(["build", "-t", image, "."])
            .current_dir(project_dir);
        info!(image, "Building Docker image");

        let diagnostic = match self.runner.run(&command).await {
            Ok(output) if output.is_success() => {
                info!(image, "Docker image built");
                self.stage_complete(Stage::Build, started);
                return Ok(());
            }
            Ok(output) => output.diagnostic(),
            Err(e) => e.to_string(),
        };

        let hints = remediation_hints(&diagnostic);
        warn!(image, hints = hints.len(), "Docker build failed");
        Err(SetupError::BuildFailed {
            image: image.to_string(),
            diagnostic,
            hints,
        })
    }

    fn installer(&self) -> DependencyInstaller<'_> {
        DependencyInstaller::new(
            self.runner.as_ref(),
            self.probe.as_ref(),
            &self.host,
            StrategyTable::new(self.config.compose_version.clone()),
        )
        .with_progress(self.progress.as_ref())
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), SetupError> {
        self.fs.write(path, contents).map_err(|e| SetupError::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;
        info!(path = %path.display(), "Wrote file");
        Ok(())
    }

    fn stage_started(&self, stage: Stage) -> Instant {
        self.progress.on_progress(&ProgressEvent::StageStarted { stage });
        Instant::now()
    }

    fn stage_complete(&self, stage: Stage, started: Instant) {
        self.progress.on_progress(&ProgressEvent::StageComplete {
            stage,
            duration: started.elapsed(),
        });
    }
}

/// Directory `git clone` creates for `url`: the last path segment without `.git`
pub fn repository_name(url: &str) -> Option<&str> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
