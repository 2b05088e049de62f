use crate::install::{DependencyReport, InstallStep};
use crate::platform::Platform;
use crate::stack::Stack;
use serde::Serialize;
use std::path::PathBuf;

/// Summary of a setup run
#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub platform: Platform,
    pub work_dir: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Stack>,
    /// Files written, in order
    pub files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub warnings: Vec<String>,
}

impl SetupReport {
    pub fn new(platform: Platform, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            work_dir: work_dir.into(),
            dependencies: Vec::new(),
            project_dir: None,
            stack: None,
            files: Vec::new(),
            image: None,
            service: None,
            port: None,
            warnings: Vec::new(),
        }
    }

    /// True when a project was scaffolded and a manifest written
    pub fn scaffolded(&self) -> bool {
        self.service.is_some()
    }
}

/// Dry-run view of one dependency
#[derive(Debug, Clone, Serialize)]
pub struct InstallPlan {
    pub dependency: String,
    pub satisfied: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<InstallStep>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}
