//! Structured Dockerfile model

use super::Stack;
use serde::Serialize;
use std::fmt;

/// One line of a Dockerfile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Directive {
    Comment(String),
    From { image: String, tag: String },
    Env { key: String, value: String },
    Workdir(String),
    Copy { sources: Vec<String>, dest: String },
    Run(String),
    Expose(u16),
    Cmd(Vec<String>),
}

impl Directive {
    pub fn copy<I, S>(sources: I, dest: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Directive::Copy {
            sources: sources.into_iter().map(Into::into).collect(),
            dest: dest.to_string(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Comment(text) => write!(f, "# {}", text),
            Directive::From { image, tag } => write!(f, "FROM {}:{}", image, tag),
            Directive::Env { key, value } => write!(f, "ENV {}={}", key, value),
            Directive::Workdir(dir) => write!(f, "WORKDIR {}", dir),
            Directive::Copy { sources, dest } => {
                write!(f, "COPY {} {}", sources.join(" "), dest)
            }
            Directive::Run(command) => write!(f, "RUN {}", command),
            Directive::Expose(port) => write!(f, "EXPOSE {}", port),
            // exec form, each argument JSON-quoted
            Directive::Cmd(args) => {
                let quoted: Vec<String> = args
                    .iter()
                    .map(|arg| serde_json::Value::String(arg.clone()).to_string())
                    .collect();
                write!(f, "CMD [{}]", quoted.join(", "))
            }
        }
    }
}

/// Rendered container definition
///
/// The exposed port is kept alongside the directives so consumers do not
/// have to parse the text back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerDefinition {
    pub stack: Stack,
    pub directives: Vec<Directive>,
    pub exposed_port: u16,
}

impl ContainerDefinition {
    /// Dockerfile text, LF terminated
    pub fn text(&self) -> String {
        let mut out = String::new();
        for directive in &self.directives {
            out.push_str(&directive.to_string());
            out.push('\n');
        }
        out
    }

    pub fn has_directive(&self, predicate: impl Fn(&Directive) -> bool) -> bool {
        self.directives.iter().any(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_rendering() {
        let from = Directive::From {
            image: "node".to_string(),
            tag: "18".to_string(),
        };
        assert_eq!(from.to_string(), "FROM node:18");
        assert_eq!(
            Directive::copy(["package*.json"], "./").to_string(),
            "COPY package*.json ./"
        );
        assert_eq!(Directive::Expose(3000).to_string(), "EXPOSE 3000");
        assert_eq!(
            Directive::Env {
                key: "PYTHONUNBUFFERED".to_string(),
                value: "1".to_string()
            }
            .to_string(),
            "ENV PYTHONUNBUFFERED=1"
        );
    }

    #[test]
    fn test_cmd_uses_exec_form() {
        let cmd = Directive::Cmd(vec![
            "python".to_string(),
            "manage.py".to_string(),
            "runserver".to_string(),
            "0.0.0.0:8000".to_string(),
        ]);
        assert_eq!(
            cmd.to_string(),
            r#"CMD ["python", "manage.py", "runserver", "0.0.0.0:8000"]"#
        );
    }

    #[test]
    fn test_text_is_line_per_directive() {
        let definition = ContainerDefinition {
            stack: Stack::Node,
            directives: vec![
                Directive::Workdir("/app".to_string()),
                Directive::Expose(3000),
            ],
            exposed_port: 3000,
        };
        assert_eq!(definition.text(), "WORKDIR /app\nEXPOSE 3000\n");
        assert!(definition.has_directive(|d| matches!(d, Directive::Expose(3000))));
    }
}
