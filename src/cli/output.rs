//! Output formatting for multiple formats
//!
//! Reports render as JSON, YAML or human-readable text. Human output uses
//! the same header rule and tree connectors everywhere.
//!
//! # Example
//!
//! ```no_run
//! use dockstrap::cli::output::{OutputFormat, OutputFormatter};
//! use dockstrap::config::DockstrapConfig;
//!
//! let formatter = OutputFormatter::new(OutputFormat::Yaml);
//! let output = formatter.format_config(&DockstrapConfig::default()).unwrap();
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::DockstrapConfig;
use crate::install::InstallOutcome;
use crate::orchestrator::{InstallPlan, SetupReport};
use crate::platform::Platform;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";
const CHECK: &str = "\u{2713}";
const CROSS: &str = "\u{2717}";
const WARN: &str = "\u{26A0}";
const BRANCH: &str = "\u{251C}\u{2500}";
const LAST: &str = "\u{2514}\u{2500}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Platform and tool availability, as shown by `dockstrap detect`
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub platform: Platform,
    pub arch: String,
    pub work_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Executable name to whether it resolves on the search path
    pub tools: BTreeMap<String, bool>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &SetupReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "setup report"),
            OutputFormat::Yaml => to_yaml(report, "setup report"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_plan(&self, plans: &[InstallPlan]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&plans, "install plan"),
            OutputFormat::Yaml => to_yaml(&plans, "install plan"),
            OutputFormat::Human => Ok(self.format_plan_human(plans)),
        }
    }

    pub fn format_host(&self, host: &HostReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(host, "host report"),
            OutputFormat::Yaml => to_yaml(host, "host report"),
            OutputFormat::Human => Ok(self.format_host_human(host)),
        }
    }

    pub fn format_config(&self, config: &DockstrapConfig) -> Result<String> {
        // BTreeMap keeps the keys sorted in serialized output
        let map: BTreeMap<_, _> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => to_json(&map, "config"),
            OutputFormat::Yaml => to_yaml(&map, "config"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_report_human(&self, report: &SetupReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("{} Setup Complete\n", CHECK));
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Platform:  {}\n", report.platform));
        output.push_str(&format!("Directory: {}\n", report.work_dir.display()));

        if !report.dependencies.is_empty() {
            output.push_str("\nDependencies:\n");
            let last = report.dependencies.len() - 1;
            for (i, dep) in report.dependencies.iter().enumerate() {
                let connector = if i == last { LAST } else { BRANCH };
                let symbol = match dep.outcome {
                    InstallOutcome::Failed { .. } => CROSS,
                    _ => CHECK,
                };
                output.push_str(&format!(
                    "{} {} {}: {}\n",
                    connector, symbol, dep.dependency, dep.outcome
                ));
                for note in &dep.notes {
                    output.push_str(&format!("     {}\n", note));
                }
            }
        }

        if let Some(project_dir) = &report.project_dir {
            output.push_str("\nProject:\n");
            output.push_str(&format!("{} Directory: {}\n", BRANCH, project_dir.display()));
            if let Some(stack) = report.stack {
                output.push_str(&format!("{} Stack:     {}\n", BRANCH, stack));
            }
            if let Some(image) = &report.image {
                output.push_str(&format!("{} Image:     {}\n", BRANCH, image));
            }
            if let (Some(service), Some(port)) = (&report.service, report.port) {
                output.push_str(&format!("{} Service:   {} ({}:{})\n", BRANCH, service, port, port));
            }
            output.push_str(&format!("{} Files:\n", LAST));
            for file in &report.files {
                output.push_str(&format!("     {}\n", file.display()));
            }
        }

        if !report.warnings.is_empty() {
            output.push_str(&format!("\n{} Warnings:\n", WARN));
            for warning in &report.warnings {
                output.push_str(&format!("  - {}\n", warning));
            }
        }

        if report.scaffolded() {
            output.push_str("\nAll set! You can now run your application using Docker Compose:\n");
            output.push_str("  docker-compose up -d\n");
        }

        output
    }

    fn format_plan_human(&self, plans: &[InstallPlan]) -> String {
        let mut output = String::new();

        output.push_str("Install Plan (dry run)\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for plan in plans {
            if plan.satisfied {
                output.push_str(&format!("{} {}: already installed\n\n", CHECK, plan.dependency));
                continue;
            }

            output.push_str(&format!("{}:\n", plan.dependency));
            if plan.steps.is_empty() {
                output.push_str(&format!("{} (no steps)\n", LAST));
            }
            let last = plan.steps.len().saturating_sub(1);
            for (i, step) in plan.steps.iter().enumerate() {
                let connector = if i == last { LAST } else { BRANCH };
                output.push_str(&format!("{} {}\n", connector, step.description));
                output.push_str(&format!("     $ {}\n", step.command));
            }
            for note in &plan.notes {
                output.push_str(&format!("  Note: {}\n", note));
            }
            output.push('\n');
        }

        output
    }

    fn format_host_human(&self, host: &HostReport) -> String {
        let mut output = String::new();

        output.push_str("Host\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Platform:     {}\n", host.platform));
        output.push_str(&format!("Architecture: {}\n", host.arch));
        output.push_str(&format!("Directory:    {}\n", host.work_dir.display()));
        if let Some(user) = &host.user {
            output.push_str(&format!("User:         {}\n", user));
        }

        output.push_str("\nTools:\n");
        for (tool, present) in &host.tools {
            let (symbol, status) = if *present {
                (CHECK, "installed")
            } else {
                (CROSS, "not found")
            };
            output.push_str(&format!("{} {}: {}\n", symbol, tool, status));
        }

        if !host.platform.is_supported() {
            output.push_str(&format!(
                "\n{} Unsupported operating system. Please install Docker manually.\n",
                WARN
            ));
        }

        output
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::{DependencyReport, InstallStep};
    use crate::process::CommandSpec;
    use crate::stack::Stack;

    fn scaffolded_report() -> SetupReport {
        let mut report = SetupReport::new(Platform::Linux, "/work");
        report.dependencies.push(DependencyReport {
            dependency: "Docker".to_string(),
            outcome: InstallOutcome::AlreadySatisfied,
            notes: Vec::new(),
        });
        report.project_dir = Some(PathBuf::from("/work/shop"));
        report.stack = Some(Stack::Flask);
        report.files = vec![
            PathBuf::from("/work/shop/Dockerfile"),
            PathBuf::from("/work/shop/docker-compose.yml"),
        ];
        report.image = Some("my-app".to_string());
        report.service = Some("app".to_string());
        report.port = Some(5000);
        report.warnings.push("'requirements.txt' not found".to_string());
        report
    }

    #[test]
    fn test_report_json() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_report(&scaffolded_report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["platform"], "linux");
        assert_eq!(value["stack"], "flask");
        assert_eq!(value["port"], 5000);
        assert_eq!(value["dependencies"][0]["outcome"]["status"], "already_satisfied");
    }

    #[test]
    fn test_report_yaml() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_report(&scaffolded_report())
            .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(value["service"].as_str(), Some("app"));
    }

    #[test]
    fn test_report_human() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&scaffolded_report())
            .unwrap();

        assert!(output.contains("Setup Complete"));
        assert!(output.contains("Docker: already installed"));
        assert!(output.contains("Service:   app (5000:5000)"));
        assert!(output.contains("requirements.txt"));
        assert!(output.contains("docker-compose up -d"));
    }

    #[test]
    fn test_install_only_report_has_no_compose_hint() {
        let report = SetupReport::new(Platform::MacOS, "/work");
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report)
            .unwrap();
        assert!(!output.contains("docker-compose up"));
    }

    #[test]
    fn test_plan_human() {
        let plans = vec![
            InstallPlan {
                dependency: "Docker".to_string(),
                satisfied: true,
                steps: Vec::new(),
                notes: Vec::new(),
            },
            InstallPlan {
                dependency: "Docker Compose".to_string(),
                satisfied: false,
                steps: vec![InstallStep {
                    description: "Make Docker Compose executable".to_string(),
                    command: CommandSpec::sudo(["chmod", "+x", "/usr/local/bin/docker-compose"]),
                }],
                notes: Vec::new(),
            },
        ];

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_plan(&plans)
            .unwrap();
        assert!(output.contains("Docker: already installed"));
        assert!(output.contains("$ sudo chmod +x /usr/local/bin/docker-compose"));

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_plan(&plans)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["steps"][0]["command"]["program"], "sudo");
    }

    #[test]
    fn test_host_human() {
        let mut tools = BTreeMap::new();
        tools.insert("docker".to_string(), true);
        tools.insert("docker-compose".to_string(), false);
        let host = HostReport {
            platform: Platform::Unsupported,
            arch: "x86_64".to_string(),
            work_dir: PathBuf::from("/work"),
            user: None,
            tools,
        };

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_host(&host)
            .unwrap();
        assert!(output.contains("docker: installed"));
        assert!(output.contains("docker-compose: not found"));
        assert!(output.contains("Unsupported operating system"));
    }

    #[test]
    fn test_config_json_is_sorted_map() {
        let config = DockstrapConfig {
            log_level: "info".to_string(),
            step_timeout_secs: 900,
            compose_version: "v2.20.2".to_string(),
            default_image_name: "my-app".to_string(),
            default_service_name: "app".to_string(),
        };
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_config(&config)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["compose_version"], "v2.20.2");
        assert_eq!(value["step_timeout_secs"], "900");

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_config(&config)
            .unwrap();
        assert!(human.starts_with("Dockstrap Configuration:"));
    }
}
