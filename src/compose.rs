//! Compose manifest synthesis
//!
//! The published port comes from an explicit override when given,
//! otherwise from the first `EXPOSE` line of the container definition. A
//! manifest synthesized without an override always maps that port to
//! itself.

use crate::config::DEFAULT_SERVICE_NAME;
use crate::error::SetupError;
use crate::fs::FileSystem;
use crate::stack::{parse_port, ContainerDefinition};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";
pub const DOCKERFILE_NAME: &str = "Dockerfile";

const COMPOSE_FILE_VERSION: &str = "3.8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeManifest {
    pub service_name: String,
    pub port: u16,
    pub build: String,
    pub volume: String,
    pub restart: String,
}

/// On-disk shape of `docker-compose.yml`
#[derive(Debug, Serialize)]
struct ComposeFile<'a> {
    version: &'a str,
    services: BTreeMap<&'a str, ComposeService<'a>>,
}

#[derive(Debug, Serialize)]
struct ComposeService<'a> {
    build: &'a str,
    ports: Vec<String>,
    volumes: Vec<&'a str>,
    restart: &'a str,
}

impl ComposeManifest {
    pub fn new(service_name: impl Into<String>, port: u16) -> Self {
        Self {
            service_name: service_name.into(),
            port,
            build: ".".to_string(),
            volume: ".:/app".to_string(),
            restart: "unless-stopped".to_string(),
        }
    }

    /// Port mapping publishing the service port on the same host port
    pub fn port_mapping(&self) -> String {
        format!("{}:{}", self.port, self.port)
    }

    /// Renders the manifest as compose YAML
    pub fn to_yaml(&self) -> Result<String, SetupError> {
        let service = ComposeService {
            build: self.build.as_str(),
            ports: vec![self.port_mapping()],
            volumes: vec![self.volume.as_str()],
            restart: self.restart.as_str(),
        };
        let file = ComposeFile {
            version: COMPOSE_FILE_VERSION,
            services: BTreeMap::from([(self.service_name.as_str(), service)]),
        };
        serde_yaml::to_string(&file).map_err(|e| SetupError::Serialization(e.to_string()))
    }
}

fn service_name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").ok())
        .as_ref()
}

/// Trims `raw` and checks it is a valid compose service name
///
/// Blank input falls back to the default service name.
pub fn validate_service_name(raw: &str) -> Result<&str, SetupError> {
    let name = match raw.trim() {
        "" => DEFAULT_SERVICE_NAME,
        name => name,
    };
    if service_name_pattern().is_some_and(|re| re.is_match(name)) {
        Ok(name)
    } else {
        Err(SetupError::InvalidServiceName(raw.to_string()))
    }
}

/// Builds a manifest from an explicit port or a container definition
pub fn synthesize(
    service_name: &str,
    explicit_port: Option<&str>,
    definition: Option<&ContainerDefinition>,
) -> Result<ComposeManifest, SetupError> {
    let text = definition.map(ContainerDefinition::text);
    synthesize_from_text(service_name, explicit_port, text.as_deref())
}

/// Reads `Dockerfile` from `dir` and builds a manifest from it
///
/// A missing Dockerfile is only an error when no explicit port is given.
pub fn synthesize_from_dockerfile(
    fs: &dyn FileSystem,
    dir: &Path,
    service_name: &str,
    explicit_port: Option<&str>,
) -> Result<ComposeManifest, SetupError> {
    let path = dir.join(DOCKERFILE_NAME);
    let text = if fs.is_file(&path) {
        Some(fs.read_to_string(&path).map_err(|e| SetupError::Io {
            path: path.clone(),
            message: format!("{:#}", e),
        })?)
    } else {
        debug!(path = %path.display(), "No Dockerfile to read the port from");
        None
    };

    synthesize_from_text(service_name, explicit_port, text.as_deref())
}

fn synthesize_from_text(
    service_name: &str,
    explicit_port: Option<&str>,
    dockerfile: Option<&str>,
) -> Result<ComposeManifest, SetupError> {
    let service_name = validate_service_name(service_name)?;

    let port = match explicit_port.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => parse_port(raw)?,
        None => {
            let raw = dockerfile
                .and_then(exposed_port)
                .ok_or(SetupError::MissingPort)?;
            parse_port(raw)?
        }
    };

    info!(service = service_name, port, "Synthesized compose manifest");
    Ok(ComposeManifest::new(service_name, port))
}

/// Argument of the first line starting with `EXPOSE`
///
/// Only the first token is used, so `EXPOSE 8080/tcp 9090` yields `8080`.
pub fn exposed_port(dockerfile: &str) -> Option<&str> {
    dockerfile
        .lines()
        .find(|line| line.starts_with("EXPOSE"))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(|arg| arg.split('/').next().unwrap_or(arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::stack::{RenderParams, Stack, TemplateRenderer};
    use std::path::PathBuf;

    fn rendered(stack: Stack, port: &str) -> ContainerDefinition {
        let fs = MockFileSystem::new();
        TemplateRenderer::new(&fs)
            .render(
                stack,
                &RenderParams::default()
                    .with_port(port)
                    .with_dependency_manifest(true),
                &PathBuf::from("/mock"),
            )
            .unwrap()
            .definition
    }

    #[test]
    fn test_explicit_port_and_service() {
        let manifest = synthesize("web", Some("8080"), None).unwrap();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&manifest.to_yaml().unwrap()).unwrap();

        assert_eq!(yaml["version"].as_str(), Some("3.8"));
        let web = &yaml["services"]["web"];
        assert_eq!(web["build"].as_str(), Some("."));
        assert_eq!(web["ports"][0].as_str(), Some("8080:8080"));
        assert_eq!(web["volumes"][0].as_str(), Some(".:/app"));
        assert_eq!(web["restart"].as_str(), Some("unless-stopped"));
    }

    #[test]
    fn test_port_follows_definition() {
        for stack in Stack::all() {
            let definition = rendered(stack, "4321");
            let manifest = synthesize("app", None, Some(&definition)).unwrap();
            assert_eq!(manifest.port, definition.exposed_port);
            assert_eq!(manifest.port_mapping(), "4321:4321");
        }
    }

    #[test]
    fn test_explicit_port_overrides_definition() {
        let definition = rendered(Stack::Flask, "5000");
        let manifest = synthesize("app", Some("80"), Some(&definition)).unwrap();
        assert_eq!(manifest.port, 80);
    }

    #[test]
    fn test_missing_port() {
        assert!(matches!(
            synthesize("app", None, None),
            Err(SetupError::MissingPort)
        ));
        assert!(matches!(
            synthesize("app", Some("  "), None),
            Err(SetupError::MissingPort)
        ));
        assert!(matches!(
            synthesize_from_text("app", None, Some("FROM scratch\n")),
            Err(SetupError::MissingPort)
        ));
    }

    #[test]
    fn test_blank_service_name_defaults() {
        let manifest = synthesize("  ", Some("3000"), None).unwrap();
        assert_eq!(manifest.service_name, "app");
        let yaml: serde_yaml::Value = serde_yaml::from_str(&manifest.to_yaml().unwrap()).unwrap();
        assert_eq!(yaml["services"]["app"]["ports"][0].as_str(), Some("3000:3000"));
    }

    #[test]
    fn test_service_name_rules() {
        assert_eq!(validate_service_name(" web ").unwrap(), "web");
        assert_eq!(validate_service_name("api_v2.internal-1").unwrap(), "api_v2.internal-1");
        assert_eq!(validate_service_name("").unwrap(), "app");

        for bad in ["web: {evil", "my app #1", "web\n  injected: true", "-web", ".hidden"] {
            let err = validate_service_name(bad).unwrap_err();
            assert!(matches!(err, SetupError::InvalidServiceName(ref name) if name == bad));
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn test_unsafe_service_name_never_reaches_yaml() {
        let result = synthesize("web: {evil", Some("8080"), None);
        assert!(matches!(result, Err(SetupError::InvalidServiceName(_))));
    }

    #[test]
    fn test_yaml_keeps_mapping_and_version_as_strings() {
        let text = ComposeManifest::new("web", 22).to_yaml().unwrap();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();

        assert_eq!(yaml["version"].as_str(), Some("3.8"));
        assert_eq!(yaml["services"]["web"]["ports"][0].as_str(), Some("22:22"));
        assert_eq!(
            yaml["services"].as_mapping().map(|m| m.len()),
            Some(1)
        );
    }

    #[test]
    fn test_exposed_port_scanning() {
        assert_eq!(exposed_port("FROM x\nEXPOSE 8000\nEXPOSE 9000\n"), Some("8000"));
        assert_eq!(exposed_port("EXPOSE 8080/tcp\n"), Some("8080"));
        assert_eq!(exposed_port("  EXPOSE 8000\n"), None);
        assert_eq!(exposed_port("EXPOSE\n"), None);
    }

    #[test]
    fn test_from_dockerfile_on_disk() {
        let fs = MockFileSystem::new();
        fs.add_file("/mock/api/Dockerfile", "FROM node:18\nEXPOSE 3000\n");

        let manifest =
            synthesize_from_dockerfile(&fs, Path::new("/mock/api"), "api", None).unwrap();
        assert_eq!(manifest, ComposeManifest::new("api", 3000));

        let missing = synthesize_from_dockerfile(&fs, Path::new("/mock/none"), "api", None);
        assert!(matches!(missing, Err(SetupError::MissingPort)));

        let explicit =
            synthesize_from_dockerfile(&fs, Path::new("/mock/none"), "api", Some("81")).unwrap();
        assert_eq!(explicit.port, 81);
    }

    #[test]
    fn test_non_numeric_expose_is_invalid_port() {
        let result = synthesize_from_text("app", None, Some("EXPOSE ${PORT}\n"));
        assert!(matches!(result, Err(SetupError::InvalidPort(_))));
    }
}
