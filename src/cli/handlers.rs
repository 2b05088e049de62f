//! Command handlers
//!
//! Each handler returns the process exit code. Failures are logged and
//! printed to stderr; results go to stdout.

use super::commands::{ComposeArgs, DockerfileArgs, FormatArgs, InstallArgs, ScaffoldArgs};
use super::output::{HostReport, OutputFormat, OutputFormatter};
use super::prompt::Prompter;
use crate::compose::{self, COMPOSE_FILE_NAME, DOCKERFILE_NAME};
use crate::config::DockstrapConfig;
use crate::error::{SetupError, EXIT_FAILURE};
use crate::fs::{FileSystem, RealFileSystem};
use crate::orchestrator::{ScaffoldPlan, SetupOrchestrator, SetupPlan};
use crate::platform::{HostContext, Platform};
use crate::probe::{CapabilityProbe, PathProbe};
use crate::process::{CommandRunner, SystemRunner};
use crate::progress::LoggingHandler;
use crate::stack::{RenderParams, Stack, TemplateRenderer};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Everything a handler needs, built once in `main`
pub struct CliContext {
    pub config: DockstrapConfig,
    pub host: HostContext,
    pub runner: Arc<dyn CommandRunner>,
    pub probe: Arc<dyn CapabilityProbe>,
    pub fs: Arc<dyn FileSystem>,
    pub quiet: bool,
}

impl CliContext {
    /// Captures the host and wires the real process, probe and filesystem
    pub fn from_env(config: DockstrapConfig, work_dir: Option<PathBuf>, quiet: bool) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let host = HostContext::from_env(work_dir).context("Failed to determine working directory")?;
        if !host.work_dir.is_dir() {
            bail!(
                "Working directory does not exist: {}",
                host.work_dir.display()
            );
        }
        debug!(
            platform = %host.platform,
            arch = %host.arch,
            work_dir = %host.work_dir.display(),
            "Host captured"
        );

        Ok(Self {
            runner: Arc::new(SystemRunner::new(config.step_timeout())),
            probe: Arc::new(PathProbe::for_host(&host)),
            fs: Arc::new(RealFileSystem),
            config,
            host,
            quiet,
        })
    }

    fn orchestrator(&self) -> SetupOrchestrator {
        SetupOrchestrator::new(
            self.runner.clone(),
            self.probe.clone(),
            self.fs.clone(),
            self.config.clone(),
            self.host.clone(),
        )
        .with_progress(Arc::new(LoggingHandler))
    }

    fn resolve_dir(&self, path: Option<&PathBuf>) -> PathBuf {
        match path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.host.work_dir.join(p),
            None => self.host.work_dir.clone(),
        }
    }

    fn say(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

pub async fn handle_setup(ctx: &CliContext, prompter: &dyn Prompter) -> i32 {
    if !ctx.quiet {
        print_banner();
    }

    let plan = match ask_setup_plan(ctx, prompter) {
        Ok(plan) => plan,
        Err(code) => return code,
    };
    let scaffolding = plan.scaffold.is_some();

    match ctx.orchestrator().run(&plan).await {
        Ok(report) => {
            if let Some(code) = print(OutputFormatter::new(OutputFormat::Human).format_report(&report)) {
                return code;
            }
            if !scaffolding {
                ctx.say("Exiting setup. Goodbye!");
            }
            0
        }
        Err(e) => report_setup_error(&e),
    }
}

/// Collects the interactive answers; `Err` carries the exit code
fn ask_setup_plan(ctx: &CliContext, prompter: &dyn Prompter) -> Result<SetupPlan, i32> {
    let io_failure = |e: std::io::Error| {
        error!("Failed to read input: {}", e);
        EXIT_FAILURE
    };

    let install = prompter
        .confirm("Do you want to install Docker and Docker Compose?")
        .map_err(io_failure)?;
    if !install {
        ctx.say("Skipping Docker installation.");
    }

    let scaffold = prompter
        .confirm("Do you want to set up a Dockerized project now?")
        .map_err(io_failure)?;
    if !scaffold {
        return Ok(SetupPlan {
            install,
            scaffold: None,
        });
    }

    let repo_url = prompter
        .ask("Enter the Git repository URL to clone: ")
        .map_err(io_failure)?
        .unwrap_or_default();
    if repo_url.is_empty() {
        return Err(report_setup_error(&SetupError::MissingRepositoryUrl));
    }

    let stack_token = prompter
        .ask("Select project type (node/django/flask): ")
        .map_err(io_failure)?
        .unwrap_or_default();
    let stack: Stack = match stack_token.parse() {
        Ok(stack) => stack,
        Err(e) => return Err(report_setup_error(&e)),
    };

    let template = stack.template();
    let runtime_version = prompter
        .ask_optional(&format!(
            "Enter {} image version (e.g., {}) or leave blank for latest: ",
            template.base_image(),
            version_examples(stack)
        ))
        .map_err(io_failure)?;
    let port = prompter
        .ask_optional(&format!(
            "Enter the application port (default {}): ",
            stack.default_port()
        ))
        .map_err(io_failure)?;
    let image_name = prompter
        .ask_optional(&format!(
            "Enter the Docker image name (default: {}): ",
            ctx.config.default_image_name
        ))
        .map_err(io_failure)?;
    let service_name = prompter
        .ask_optional(&format!(
            "Enter the service name (default: {}): ",
            ctx.config.default_service_name
        ))
        .map_err(io_failure)?;
    if let Some(name) = service_name.as_deref() {
        compose::validate_service_name(name).map_err(|e| report_setup_error(&e))?;
    }
    let compose_port = prompter
        .ask_optional("Enter the port to expose (default: same as application port): ")
        .map_err(io_failure)?;

    Ok(SetupPlan {
        install,
        scaffold: Some(ScaffoldPlan {
            repo_url,
            stack: stack.to_string(),
            runtime_version,
            port,
            image_name,
            service_name,
            compose_port,
        }),
    })
}

fn version_examples(stack: Stack) -> &'static str {
    match stack {
        Stack::Node => "16, 18, 20",
        Stack::Django | Stack::Flask => "3.10, 3.11, 3.12",
    }
}

pub async fn handle_install(ctx: &CliContext, args: &InstallArgs) -> i32 {
    let formatter = OutputFormatter::new(args.format.into());
    let orchestrator = ctx.orchestrator();

    if args.dry_run {
        info!("Planning installation (dry run)");
        return match orchestrator.plan_install() {
            Ok(plans) => print(formatter.format_plan(&plans)).unwrap_or(0),
            Err(e) => report_setup_error(&e),
        };
    }

    let plan = SetupPlan {
        install: true,
        scaffold: None,
    };
    match orchestrator.run(&plan).await {
        Ok(report) => print(formatter.format_report(&report)).unwrap_or(0),
        Err(e) => report_setup_error(&e),
    }
}

pub async fn handle_scaffold(ctx: &CliContext, args: &ScaffoldArgs) -> i32 {
    let plan = SetupPlan {
        install: false,
        scaffold: Some(ScaffoldPlan {
            repo_url: args.repo.clone(),
            stack: args.stack.clone(),
            runtime_version: args.template.runtime_version.clone(),
            port: args.template.port.clone(),
            image_name: args.image.clone(),
            service_name: args.service.clone(),
            compose_port: args.compose_port.clone(),
        }),
    };

    match ctx.orchestrator().run(&plan).await {
        Ok(report) => print(OutputFormatter::new(args.format.into()).format_report(&report))
            .unwrap_or(0),
        Err(e) => report_setup_error(&e),
    }
}

pub fn handle_dockerfile(ctx: &CliContext, args: &DockerfileArgs) -> i32 {
    let dir = ctx.resolve_dir(args.path.as_ref());
    let result = args.stack.parse::<Stack>().and_then(|stack| {
        let params = RenderParams {
            runtime_version: args.template.runtime_version.clone(),
            port: args.template.port.clone(),
            has_dependency_manifest: None,
        };
        TemplateRenderer::new(ctx.fs.as_ref()).render(stack, &params, &dir)
    });

    let rendered = match result {
        Ok(rendered) => rendered,
        Err(e) => return report_setup_error(&e),
    };
    for warning in &rendered.warnings {
        eprintln!("\u{26A0} Warning: {}", warning);
    }

    let text = rendered.definition.text();
    if args.stdout {
        print!("{}", text);
        return 0;
    }
    write_output(ctx, &dir.join(DOCKERFILE_NAME), &text)
}

pub fn handle_compose(ctx: &CliContext, args: &ComposeArgs) -> i32 {
    let dir = ctx.resolve_dir(args.path.as_ref());
    let service = args
        .service
        .as_deref()
        .unwrap_or(ctx.config.default_service_name.as_str());

    let manifest = match compose::synthesize_from_dockerfile(
        ctx.fs.as_ref(),
        &dir,
        service,
        args.port.as_deref(),
    ) {
        Ok(manifest) => manifest,
        Err(e) => return report_setup_error(&e),
    };

    let yaml = match manifest.to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => return report_setup_error(&e),
    };
    if args.stdout {
        print!("{}", yaml);
        return 0;
    }
    write_output(ctx, &dir.join(COMPOSE_FILE_NAME), &yaml)
}

pub fn handle_detect(ctx: &CliContext, args: &FormatArgs) -> i32 {
    let mut tools = BTreeMap::new();
    for tool in tools_for(ctx.host.platform) {
        tools.insert(tool.to_string(), ctx.probe.exists(tool));
    }
    tools.insert(
        "docker compose (plugin)".to_string(),
        ctx.probe.plugin_exists("docker-compose"),
    );

    let report = HostReport {
        platform: ctx.host.platform,
        arch: ctx.host.arch.clone(),
        work_dir: ctx.host.work_dir.clone(),
        user: ctx.host.user.clone(),
        tools,
    };
    print(OutputFormatter::new(args.format.into()).format_host(&report)).unwrap_or(0)
}

fn tools_for(platform: Platform) -> Vec<&'static str> {
    let mut tools = vec!["docker", "docker-compose", "git"];
    match platform {
        Platform::Linux => tools.extend(["sudo", "curl", "apt-get"]),
        Platform::MacOS => tools.push("brew"),
        Platform::Windows => tools.push("powershell"),
        Platform::Unsupported => {}
    }
    tools
}

/// Shows the configuration without requiring it to be valid
pub fn handle_config(config: &DockstrapConfig, args: &FormatArgs) -> i32 {
    let code = print(OutputFormatter::new(args.format.into()).format_config(config)).unwrap_or(0);
    if let Err(e) = config.validate() {
        eprintln!("\u{26A0} {}", e);
        return EXIT_FAILURE;
    }
    code
}

fn write_output(ctx: &CliContext, path: &Path, contents: &str) -> i32 {
    if let Err(e) = ctx.fs.write(path, contents) {
        error!("{:#}", e);
        eprintln!("\u{2717} {:#}", e);
        return EXIT_FAILURE;
    }
    info!(path = %path.display(), "Wrote file");
    ctx.say(&format!("\u{2713} Wrote {}", path.display()));
    0
}

/// Prints formatted output; `Some(code)` when formatting failed
fn print(output: Result<String>) -> Option<i32> {
    match output {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            None
        }
        Err(e) => {
            error!("{:#}", e);
            Some(EXIT_FAILURE)
        }
    }
}

fn report_setup_error(err: &SetupError) -> i32 {
    error!("{}", err);
    eprintln!("\u{2717} {}", err);

    let hints = err.hints();
    if !hints.is_empty() {
        eprintln!("\nPossible fixes:");
        for hint in hints {
            eprintln!("  - {}", hint);
        }
    }
    err.exit_code()
}

fn print_banner() {
    println!("\n######################################################");
    println!("#                                                    #");
    println!("#       Docker & Docker Compose Setup Script         #");
    println!("#                                                    #");
    println!("######################################################\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormatArg;
    use crate::cli::prompt::ScriptedPrompter;
    use crate::error::EXIT_INVALID_INPUT;
    use crate::fs::MockFileSystem;
    use crate::probe::StaticProbe;
    use crate::process::ScriptedRunner;

    fn context(runner: Arc<ScriptedRunner>, fs: Arc<MockFileSystem>) -> CliContext {
        CliContext {
            config: DockstrapConfig {
                log_level: "info".to_string(),
                step_timeout_secs: 60,
                compose_version: "v2.20.2".to_string(),
                default_image_name: "my-app".to_string(),
                default_service_name: "app".to_string(),
            },
            host: HostContext::new(Platform::Linux, "/mock"),
            runner,
            probe: Arc::new(StaticProbe::with_present(["docker", "docker-compose"])),
            fs,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_setup_declining_everything_runs_nothing() {
        let runner = Arc::new(ScriptedRunner::new());
        let ctx = context(runner.clone(), Arc::new(MockFileSystem::new()));
        let prompter = ScriptedPrompter::new(["n", "n"]);

        assert_eq!(handle_setup(&ctx, &prompter).await, 0);
        assert_eq!(runner.call_count(), 0);
        assert_eq!(prompter.questions().len(), 2);
    }

    #[tokio::test]
    async fn test_setup_invalid_stack_exits_with_input_error() {
        let runner = Arc::new(ScriptedRunner::new());
        let fs = Arc::new(MockFileSystem::new());
        let ctx = context(runner.clone(), fs.clone());
        let prompter = ScriptedPrompter::new(["y", "y", "https://github.com/acme/shop.git", "rails"]);

        assert_eq!(handle_setup(&ctx, &prompter).await, EXIT_INVALID_INPUT);
        assert_eq!(runner.call_count(), 0);
        assert!(fs.file_paths().is_empty());
    }

    #[tokio::test]
    async fn test_setup_invalid_service_name_exits_before_installing() {
        let runner = Arc::new(ScriptedRunner::new());
        let fs = Arc::new(MockFileSystem::new());
        let ctx = context(runner.clone(), fs.clone());
        let prompter = ScriptedPrompter::new([
            "y",
            "y",
            "https://github.com/acme/shop.git",
            "node",
            "",
            "",
            "",
            "web: {evil",
        ]);

        assert_eq!(handle_setup(&ctx, &prompter).await, EXIT_INVALID_INPUT);
        assert_eq!(runner.call_count(), 0);
        assert!(fs.file_paths().is_empty());
    }

    #[tokio::test]
    async fn test_setup_full_flow() {
        let fs = Arc::new(MockFileSystem::new());
        let runner = Arc::new(ScriptedRunner::new().with_fs(fs.clone()));
        runner.creates_dir("git clone", "/mock/shop");
        let ctx = context(runner.clone(), fs.clone());
        let prompter = ScriptedPrompter::new([
            "yes",
            "y",
            "https://github.com/acme/shop.git",
            "Django",
            "3.11",
            "",
            "",
            "web",
            "",
        ]);

        assert_eq!(handle_setup(&ctx, &prompter).await, 0);
        assert_eq!(
            runner.command_lines(),
            vec![
                "git clone -- https://github.com/acme/shop.git",
                "docker build -t my-app .",
            ]
        );
        let compose = fs
            .read_to_string(Path::new("/mock/shop/docker-compose.yml"))
            .unwrap();
        assert!(compose.contains("  web:\n"));
        assert!(compose.contains("\"8000:8000\""));
        assert!(prompter.questions()[4].contains("python image version"));
    }

    #[test]
    fn test_dockerfile_writes_into_project_dir() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/mock/web/package.json", "{}");
        let ctx = context(Arc::new(ScriptedRunner::new()), fs.clone());
        let args = DockerfileArgs {
            stack: "node".to_string(),
            template: crate::cli::commands::TemplateArgs {
                runtime_version: Some("18".to_string()),
                port: None,
            },
            stdout: false,
            path: Some(PathBuf::from("web")),
        };

        assert_eq!(handle_dockerfile(&ctx, &args), 0);
        let text = fs.read_to_string(Path::new("/mock/web/Dockerfile")).unwrap();
        assert!(text.contains("FROM node:18"));
    }

    #[test]
    fn test_dockerfile_invalid_stack() {
        let fs = Arc::new(MockFileSystem::new());
        let ctx = context(Arc::new(ScriptedRunner::new()), fs.clone());
        let args = DockerfileArgs {
            stack: "rails".to_string(),
            template: crate::cli::commands::TemplateArgs {
                runtime_version: None,
                port: None,
            },
            stdout: false,
            path: None,
        };

        assert_eq!(handle_dockerfile(&ctx, &args), EXIT_INVALID_INPUT);
        assert!(fs.file_paths().is_empty());
    }

    #[test]
    fn test_compose_without_port_source_fails() {
        let fs = Arc::new(MockFileSystem::new());
        let ctx = context(Arc::new(ScriptedRunner::new()), fs.clone());
        let args = ComposeArgs {
            service: None,
            port: None,
            stdout: false,
            path: None,
        };

        assert_eq!(handle_compose(&ctx, &args), EXIT_FAILURE);
        assert!(fs.file_paths().is_empty());
    }

    #[test]
    fn test_compose_reads_exposed_port() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/mock/Dockerfile", "FROM python:3.11\nEXPOSE 5000\n");
        let ctx = context(Arc::new(ScriptedRunner::new()), fs.clone());
        let args = ComposeArgs {
            service: Some("api".to_string()),
            port: None,
            stdout: false,
            path: None,
        };

        assert_eq!(handle_compose(&ctx, &args), 0);
        let yaml = fs
            .read_to_string(Path::new("/mock/docker-compose.yml"))
            .unwrap();
        assert!(yaml.contains("- \"5000:5000\""));
    }

    #[tokio::test]
    async fn test_install_dry_run_executes_nothing() {
        let runner = Arc::new(ScriptedRunner::new());
        let ctx = context(runner.clone(), Arc::new(MockFileSystem::new()));
        let args = InstallArgs {
            dry_run: true,
            format: OutputFormatArg::Json,
        };

        assert_eq!(handle_install(&ctx, &args).await, 0);
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_tools_per_platform() {
        assert!(tools_for(Platform::MacOS).contains(&"brew"));
        assert!(tools_for(Platform::Linux).contains(&"apt-get"));
        assert_eq!(tools_for(Platform::Unsupported).len(), 3);
    }
}
