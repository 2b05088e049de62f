//! Configuration management for dockstrap
//!
//! Settings are loaded from environment variables with sensible defaults.
//! The environment is read exactly once, when the configuration is built in
//! `main`; everything downstream receives the resulting values explicitly.
//!
//! # Environment Variables
//!
//! - `DOCKSTRAP_LOG_LEVEL`: Logging level - default: "info"
//! - `DOCKSTRAP_STEP_TIMEOUT`: Timeout in seconds for each external command - default: "900"
//! - `DOCKSTRAP_COMPOSE_VERSION`: Docker Compose release installed on Linux - default: "v2.20.2"
//! - `DOCKSTRAP_IMAGE_NAME`: Default image name for builds - default: "my-app"
//! - `DOCKSTRAP_SERVICE_NAME`: Default compose service name - default: "app"
//!
//! # Example
//!
//! ```no_run
//! use dockstrap::DockstrapConfig;
//!
//! let config = DockstrapConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_STEP_TIMEOUT_SECS: u64 = 900;
const MAX_STEP_TIMEOUT_SECS: u64 = 7200;
pub const DEFAULT_COMPOSE_VERSION: &str = "v2.20.2";
pub const DEFAULT_IMAGE_NAME: &str = "my-app";
pub const DEFAULT_SERVICE_NAME: &str = "app";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for dockstrap
#[derive(Debug, Clone)]
pub struct DockstrapConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Timeout applied to every external command, in seconds
    pub step_timeout_secs: u64,

    /// Docker Compose release tag downloaded on Linux
    pub compose_version: String,

    /// Image name used when none is given
    pub default_image_name: String,

    /// Compose service name used when none is given
    pub default_service_name: String,
}

impl Default for DockstrapConfig {
    /// Creates a new configuration by loading from environment variables with defaults
    fn default() -> Self {
        let log_level = env::var("DOCKSTRAP_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let step_timeout_secs = env::var("DOCKSTRAP_STEP_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_STEP_TIMEOUT_SECS);

        let compose_version = non_empty_var("DOCKSTRAP_COMPOSE_VERSION")
            .unwrap_or_else(|| DEFAULT_COMPOSE_VERSION.to_string());

        let default_image_name =
            non_empty_var("DOCKSTRAP_IMAGE_NAME").unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_string());

        let default_service_name = non_empty_var("DOCKSTRAP_SERVICE_NAME")
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        Self {
            log_level,
            step_timeout_secs,
            compose_version,
            default_image_name,
            default_service_name,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DockstrapConfig {
    /// Validates the configuration
    ///
    /// Checks that:
    /// - The step timeout is between 1 second and 2 hours
    /// - Log level is valid
    /// - The compose version looks like a release tag
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Step timeout must be at least 1 second".to_string(),
            ));
        }
        if self.step_timeout_secs > MAX_STEP_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Step timeout cannot exceed 2 hours".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if !self.compose_version.starts_with('v') {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid compose version: {}. Expected a release tag such as {}",
                self.compose_version, DEFAULT_COMPOSE_VERSION
            )));
        }

        Ok(())
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert(
            "step_timeout_secs".to_string(),
            self.step_timeout_secs.to_string(),
        );
        map.insert("compose_version".to_string(), self.compose_version.clone());
        map.insert(
            "default_image_name".to_string(),
            self.default_image_name.clone(),
        );
        map.insert(
            "default_service_name".to_string(),
            self.default_service_name.clone(),
        );

        map
    }
}

impl fmt::Display for DockstrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dockstrap Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Step Timeout: {}s", self.step_timeout_secs)?;
        writeln!(f, "  Compose Version: {}", self.compose_version)?;
        writeln!(f, "  Default Image: {}", self.default_image_name)?;
        writeln!(f, "  Default Service: {}", self.default_service_name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn valid_config() -> DockstrapConfig {
        DockstrapConfig {
            log_level: "info".to_string(),
            step_timeout_secs: 60,
            compose_version: DEFAULT_COMPOSE_VERSION.to_string(),
            default_image_name: DEFAULT_IMAGE_NAME.to_string(),
            default_service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("DOCKSTRAP_LOG_LEVEL"),
            EnvGuard::unset("DOCKSTRAP_STEP_TIMEOUT"),
            EnvGuard::unset("DOCKSTRAP_COMPOSE_VERSION"),
            EnvGuard::unset("DOCKSTRAP_IMAGE_NAME"),
            EnvGuard::unset("DOCKSTRAP_SERVICE_NAME"),
        ];

        let config = DockstrapConfig::default();

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.step_timeout_secs, DEFAULT_STEP_TIMEOUT_SECS);
        assert_eq!(config.compose_version, DEFAULT_COMPOSE_VERSION);
        assert_eq!(config.default_image_name, "my-app");
        assert_eq!(config.default_service_name, "app");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("DOCKSTRAP_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("DOCKSTRAP_STEP_TIMEOUT", "120"),
            EnvGuard::set("DOCKSTRAP_COMPOSE_VERSION", "v2.24.0"),
            EnvGuard::set("DOCKSTRAP_IMAGE_NAME", "shop"),
            EnvGuard::set("DOCKSTRAP_SERVICE_NAME", "  "),
        ];

        let config = DockstrapConfig::default();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.step_timeout_secs, 120);
        assert_eq!(config.step_timeout(), Duration::from_secs(120));
        assert_eq!(config.compose_version, "v2.24.0");
        assert_eq!(config.default_image_name, "shop");
        assert_eq!(config.default_service_name, DEFAULT_SERVICE_NAME);
    }

    #[test]
    #[serial]
    fn test_unparseable_timeout_falls_back() {
        let _guard = EnvGuard::set("DOCKSTRAP_STEP_TIMEOUT", "soon");
        let config = DockstrapConfig::default();
        assert_eq!(config.step_timeout_secs, DEFAULT_STEP_TIMEOUT_SECS);
    }

    #[test]
    fn test_configuration_validation_invalid_timeout() {
        let mut config = valid_config();
        config.step_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.step_timeout_secs = MAX_STEP_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_invalid_log_level() {
        let mut config = valid_config();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_invalid_compose_version() {
        let mut config = valid_config();
        config.compose_version = "2.20.2".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("2.20.2"));
    }

    #[test]
    fn test_display_map() {
        let map = valid_config().to_display_map();
        assert_eq!(map.get("compose_version").unwrap(), DEFAULT_COMPOSE_VERSION);
        assert_eq!(map.get("step_timeout_secs").unwrap(), "60");
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", valid_config());
        assert!(display.contains("Dockstrap Configuration:"));
        assert!(display.contains("Compose Version: v2.20.2"));
    }
}
