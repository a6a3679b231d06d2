//! Configuration management for mcpforge
//!
//! Settings are loaded from environment variables with fallback defaults and
//! validated before any command runs.
//!
//! # Environment Variables
//!
//! - `MCPFORGE_IMAGE_PREFIX`: Image tag prefix for `build` - default: "mcp_server"
//! - `MCPFORGE_DEFAULT_PORT`: Port used when a unit has no configured port - default: "8000"
//! - `MCPFORGE_PIP_BIN`: Python dependency installer - default: "pip"
//! - `MCPFORGE_NPM_BIN`: Node dependency installer - default: "npm"
//! - `MCPFORGE_DOCKER_BIN`: Image builder - default: "docker"
//!
//! Logging variables (`MCPFORGE_LOG_LEVEL`, `MCPFORGE_LOG_JSON`) are read by
//! [`crate::util::logging`] before this configuration is loaded.
//!
//! # Example
//!
//! ```no_run
//! use mcpforge::McpforgeConfig;
//!
//! let config = McpforgeConfig::from_env().expect("valid environment");
//! config.validate().expect("Invalid configuration");
//! let options = config.pipeline_options(None);
//! ```

use crate::build::ToolConfig;
use crate::pipeline::{PipelineOptions, DEFAULT_IMAGE_PREFIX, DEFAULT_PORT};
use std::env;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpforgeConfig {
    /// Prefix of `<prefix>_<index>` image tags
    pub image_prefix: String,

    pub default_port: u16,

    pub pip_bin: String,
    pub npm_bin: String,
    pub docker_bin: String,
}

impl Default for McpforgeConfig {
    fn default() -> Self {
        let tools = ToolConfig::default();
        Self {
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            default_port: DEFAULT_PORT,
            pip_bin: tools.pip,
            npm_bin: tools.npm,
            docker_bin: tools.docker,
        }
    }
}

impl McpforgeConfig {
    /// Reads `MCPFORGE_*` variables over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` when `MCPFORGE_DEFAULT_PORT` is not a port number
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_port = match env::var("MCPFORGE_DEFAULT_PORT") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::ParseError {
                    field: "MCPFORGE_DEFAULT_PORT".to_string(),
                    error: format!("{:?}: {}", value, e),
                })?,
            Err(_) => defaults.default_port,
        };

        Ok(Self {
            image_prefix: env::var("MCPFORGE_IMAGE_PREFIX").unwrap_or(defaults.image_prefix),
            default_port,
            pip_bin: env::var("MCPFORGE_PIP_BIN").unwrap_or(defaults.pip_bin),
            npm_bin: env::var("MCPFORGE_NPM_BIN").unwrap_or(defaults.npm_bin),
            docker_bin: env::var("MCPFORGE_DOCKER_BIN").unwrap_or(defaults.docker_bin),
        })
    }

    /// Checks that:
    /// - the default port is non-zero
    /// - the image prefix is a valid image repository name
    /// - tool binaries are non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_port == 0 {
            return Err(ConfigError::ValidationFailed(
                "Default port must be between 1 and 65535".to_string(),
            ));
        }

        validate_image_prefix(&self.image_prefix)?;

        for (name, value) in [
            ("MCPFORGE_PIP_BIN", &self.pip_bin),
            ("MCPFORGE_NPM_BIN", &self.npm_bin),
            ("MCPFORGE_DOCKER_BIN", &self.docker_bin),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!("{} is empty", name)));
            }
        }

        Ok(())
    }

    pub fn tools(&self) -> ToolConfig {
        ToolConfig {
            pip: self.pip_bin.clone(),
            npm: self.npm_bin.clone(),
            docker: self.docker_bin.clone(),
        }
    }

    pub fn pipeline_options(&self, entrypoint_override: Option<String>) -> PipelineOptions {
        PipelineOptions {
            image_prefix: self.image_prefix.clone(),
            default_port: self.default_port,
            entrypoint_override,
            tools: self.tools(),
        }
    }
}

/// Image repository names: lowercase alphanumerics separated by `.`, `_` or `-`
pub fn validate_image_prefix(prefix: &str) -> Result<(), ConfigError> {
    let valid_chars = prefix
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));
    let valid_ends = prefix
        .chars()
        .next()
        .zip(prefix.chars().last())
        .map(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric())
        .unwrap_or(false);

    if valid_chars && valid_ends {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(format!(
            "Invalid image prefix: {:?}. Use lowercase letters, digits, '.', '_' or '-'",
            prefix
        )))
    }
}

impl fmt::Display for McpforgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mcpforge Configuration:")?;
        writeln!(f, "  Image Prefix: {}", self.image_prefix)?;
        writeln!(f, "  Default Port: {}", self.default_port)?;
        writeln!(f, "  pip: {}", self.pip_bin)?;
        writeln!(f, "  npm: {}", self.npm_bin)?;
        writeln!(f, "  docker: {}", self.docker_bin)?;
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

    const ALL_VARS: &[&str] = &[
        "MCPFORGE_IMAGE_PREFIX",
        "MCPFORGE_DEFAULT_PORT",
        "MCPFORGE_PIP_BIN",
        "MCPFORGE_NPM_BIN",
        "MCPFORGE_DOCKER_BIN",
    ];

    #[test]
    #[serial]
    fn test_defaults_without_environment() {
        let _guards: Vec<EnvGuard> = ALL_VARS.iter().map(|k| EnvGuard::unset(k)).collect();

        let config = McpforgeConfig::from_env().unwrap();
        assert_eq!(config, McpforgeConfig::default());
        assert_eq!(config.image_prefix, "mcp_server");
        assert_eq!(config.default_port, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("MCPFORGE_IMAGE_PREFIX", "acme.tools"),
            EnvGuard::set("MCPFORGE_DEFAULT_PORT", "9000"),
            EnvGuard::set("MCPFORGE_PIP_BIN", "pip3"),
            EnvGuard::set("MCPFORGE_NPM_BIN", "pnpm"),
            EnvGuard::set("MCPFORGE_DOCKER_BIN", "podman"),
        ];

        let config = McpforgeConfig::from_env().unwrap();
        assert_eq!(config.image_prefix, "acme.tools");
        assert_eq!(config.default_port, 9000);
        assert_eq!(
            config.tools(),
            ToolConfig {
                pip: "pip3".to_string(),
                npm: "pnpm".to_string(),
                docker: "podman".to_string(),
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_unparsable_port() {
        let _guard = EnvGuard::set("MCPFORGE_DEFAULT_PORT", "eighty");
        let err = McpforgeConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("MCPFORGE_DEFAULT_PORT"));
    }

    #[test]
    fn test_validation_failures() {
        let config = McpforgeConfig {
            default_port: 0,
            ..McpforgeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = McpforgeConfig {
            image_prefix: "Acme".to_string(),
            ..McpforgeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = McpforgeConfig {
            docker_bin: " ".to_string(),
            ..McpforgeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_image_prefix_rules() {
        assert!(validate_image_prefix("mcp_server").is_ok());
        assert!(validate_image_prefix("team-a.tools").is_ok());
        assert!(validate_image_prefix("").is_err());
        assert!(validate_image_prefix("Upper").is_err());
        assert!(validate_image_prefix("_leading").is_err());
        assert!(validate_image_prefix("has space").is_err());
    }

    #[test]
    fn test_pipeline_options() {
        let options = McpforgeConfig::default().pipeline_options(Some("app.py".to_string()));
        assert_eq!(options.image_prefix, "mcp_server");
        assert_eq!(options.default_port, 8000);
        assert_eq!(options.entrypoint_override.as_deref(), Some("app.py"));
    }

    #[test]
    fn test_display() {
        let output = McpforgeConfig::default().to_string();
        assert!(output.contains("Image Prefix: mcp_server"));
        assert!(output.contains("Default Port: 8000"));
    }
}
