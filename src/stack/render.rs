use super::dockerfile::{ContainerDefinition, Directive};
use super::{parse_port, Stack};
use crate::error::SetupError;
use crate::fs::FileSystem;
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_RUNTIME_VERSION: &str = "latest";

/// Inputs for rendering a container definition
///
/// Blank values fall back to the stack defaults.
#[derive(Debug, Clone, Default)]
pub struct RenderParams {
    pub runtime_version: Option<String>,
    pub port: Option<String>,
    /// `None` checks the project directory for the manifest
    pub has_dependency_manifest: Option<bool>,
}

impl RenderParams {
    pub fn with_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = Some(version.into());
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn with_dependency_manifest(mut self, present: bool) -> Self {
        self.has_dependency_manifest = Some(present);
        self
    }

    pub fn runtime_version(&self) -> &str {
        non_blank(self.runtime_version.as_deref()).unwrap_or(DEFAULT_RUNTIME_VERSION)
    }

    pub fn resolve_port(&self, stack: Stack) -> Result<u16, SetupError> {
        match non_blank(self.port.as_deref()) {
            Some(raw) => parse_port(raw),
            None => Ok(stack.default_port()),
        }
    }
}

#[derive(Debug)]
pub struct Rendered {
    pub definition: ContainerDefinition,
    /// Non-fatal conditions, currently only a missing dependency manifest
    pub warnings: Vec<SetupError>,
}

pub struct TemplateRenderer<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn render(
        &self,
        stack: Stack,
        params: &RenderParams,
        project_dir: &Path,
    ) -> Result<Rendered, SetupError> {
        let template = stack.template();
        let port = params.resolve_port(stack)?;
        let manifest = template.dependency_manifest();
        let has_manifest = match params.has_dependency_manifest {
            Some(present) => present,
            None => self.fs.is_file(&project_dir.join(manifest)),
        };

        let mut warnings = Vec::new();
        let mut directives = vec![
            Directive::Comment(format!(
                "Dockerfile for {} Application",
                template.display_name()
            )),
            Directive::From {
                image: template.base_image().to_string(),
                tag: params.runtime_version().to_string(),
            },
        ];
        directives.extend(template.environment().into_iter().map(|(key, value)| {
            Directive::Env {
                key: key.to_string(),
                value: value.to_string(),
            }
        }));
        directives.push(Directive::Workdir("/app".to_string()));

        if has_manifest {
            directives.extend(template.install_block());
        } else {
            let warning = SetupError::MissingDependencyManifest {
                manifest: manifest.to_string(),
                dir: project_dir.to_path_buf(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        directives.push(template.source_copy());
        directives.push(Directive::Expose(port));
        directives.push(Directive::Cmd(template.start_command(port)));

        debug!(
            stack = %stack,
            port,
            runtime_version = params.runtime_version(),
            has_manifest,
            "Rendered container definition"
        );

        Ok(Rendered {
            definition: ContainerDefinition {
                stack,
                directives,
                exposed_port: port,
            },
            warnings,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
