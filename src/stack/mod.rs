//! Application stacks and container definition templates
//!
//! Each supported stack implements [`StackTemplate`], which declares the
//! base image, default port, dependency manifest and start command. The
//! [`TemplateRenderer`] turns a template plus [`RenderParams`] into a
//! [`ContainerDefinition`].
//!
//! # Example
//!
//! ```no_run
//! use dockstrap::fs::RealFileSystem;
//! use dockstrap::stack::{RenderParams, Stack, TemplateRenderer};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), dockstrap::SetupError> {
//! let stack: Stack = "flask".parse()?;
//! let fs = RealFileSystem;
//! let rendered = TemplateRenderer::new(&fs).render(
//!     stack,
//!     &RenderParams::default().with_runtime_version("3.11"),
//!     Path::new("."),
//! )?;
//! println!("{}", rendered.definition.text());
//! # Ok(())
//! # }
//! ```

pub mod django;
pub mod dockerfile;
pub mod flask;
pub mod node;
pub mod render;

pub use django::DjangoTemplate;
pub use dockerfile::{ContainerDefinition, Directive};
pub use flask::FlaskTemplate;
pub use node::NodeTemplate;
pub use render::{RenderParams, Rendered, TemplateRenderer};

use crate::error::SetupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-stack template description
pub trait StackTemplate: Send + Sync {
    fn stack(&self) -> Stack;

    /// Human readable name used in the Dockerfile header
    fn display_name(&self) -> &'static str;

    /// Base image repository; the runtime version becomes its tag
    fn base_image(&self) -> &'static str;

    fn default_port(&self) -> u16;

    /// File whose presence enables the dependency install block
    fn dependency_manifest(&self) -> &'static str;

    /// Environment variables set right after `FROM`
    fn environment(&self) -> Vec<(&'static str, &'static str)> {
        vec![]
    }

    /// Directives installing dependencies from the manifest
    fn install_block(&self) -> Vec<Directive>;

    /// Directive copying the application source into the image
    fn source_copy(&self) -> Directive;

    fn start_command(&self, port: u16) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    Node,
    Django,
    Flask,
}

impl Stack {
    pub fn all() -> [Stack; 3] {
        [Stack::Node, Stack::Django, Stack::Flask]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stack::Node => "node",
            Stack::Django => "django",
            Stack::Flask => "flask",
        }
    }

    pub fn template(&self) -> &'static dyn StackTemplate {
        match self {
            Stack::Node => &NodeTemplate,
            Stack::Django => &DjangoTemplate,
            Stack::Flask => &FlaskTemplate,
        }
    }

    pub fn default_port(&self) -> u16 {
        self.template().default_port()
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Stack {
    type Err = SetupError;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        Stack::all()
            .into_iter()
            .find(|stack| stack.name() == token)
            .ok_or_else(|| SetupError::InvalidStack(s.trim().to_string()))
    }
}

/// Parses a user supplied port in 1..=65535
pub fn parse_port(raw: &str) -> Result<u16, SetupError> {
    let trimmed = raw.trim();
    match trimmed.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(SetupError::InvalidPort(trimmed.to_string())),
    }
}
