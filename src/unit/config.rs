use super::UnitDescriptor;
use crate::fs::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Context directory path baked into scaffolded configuration
pub const DEFAULT_CONTEXT_DIR: &str = "/app/context";

/// Settings read from a unit's `config.yaml` / `config.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<String>,
}

impl UnitConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port: Some(port),
            context_dir: Some(DEFAULT_CONTEXT_DIR.to_string()),
        }
    }

    /// Parses by file extension: `.json` as JSON, anything else as YAML
    pub fn parse(file_name: &str, content: &str) -> Result<Self> {
        let is_json = Path::new(file_name)
            .extension()
            .map(|ext| ext == "json")
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(content).context(format!("{} is not valid JSON", file_name))
        } else if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_yaml::from_str(content).context(format!("{} is not valid YAML", file_name))
        }
    }

    /// Loads the unit's detected configuration file, if it has one
    pub fn load(unit: &UnitDescriptor, fs: &dyn FileSystem) -> Result<Option<Self>> {
        let Some(file_name) = unit.config_file() else {
            return Ok(None);
        };
        let content = fs.read_to_string(&unit.path().join(file_name))?;
        Self::parse(file_name, &content).map(Some)
    }

    /// Flow-style YAML rendering, e.g. `{port: 8000, context_dir: /app/context}`
    pub fn to_flow_yaml(&self) -> String {
        let mut fields = Vec::new();
        if let Some(port) = self.port {
            fields.push(format!("port: {}", port));
        }
        if let Some(context_dir) = &self.context_dir {
            fields.push(format!("context_dir: {}", context_dir));
        }
        format!("{{{}}}\n", fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::stack::Ecosystem;

    #[test]
    fn test_parse_flow_yaml() {
        let config = UnitConfig::parse("config.yaml", "{port: 9090, context_dir: /app/context}\n").unwrap();
        assert_eq!(config, UnitConfig::new(9090));
    }

    #[test]
    fn test_parse_block_yaml() {
        let config = UnitConfig::parse("config.yml", "port: 7000\nextra: true\n").unwrap();
        assert_eq!(config.port, Some(7000));
        assert!(config.context_dir.is_none());
    }

    #[test]
    fn test_parse_json() {
        let config =
            UnitConfig::parse("config.json", r#"{"port": 8123, "context_dir": "/data"}"#).unwrap();
        assert_eq!(config.port, Some(8123));
        assert_eq!(config.context_dir.as_deref(), Some("/data"));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(UnitConfig::parse("config.json", "{port: ").is_err());
        assert!(UnitConfig::parse("config.yaml", "port: [unclosed").is_err());
        assert!(UnitConfig::parse("config.yaml", "port: not-a-number").is_err());
    }

    #[test]
    fn test_flow_yaml_round_trip() {
        let config = UnitConfig::new(9090);
        let rendered = config.to_flow_yaml();
        assert_eq!(rendered, "{port: 9090, context_dir: /app/context}\n");
        assert_eq!(UnitConfig::parse("config.yaml", &rendered).unwrap(), config);
    }

    #[test]
    fn test_load() {
        let fs = MockFileSystem::new();
        fs.add_file("weather/config.json", r#"{"port": 9001}"#);

        let with_config = UnitDescriptor::new(
            "/mock/weather",
            Ecosystem::PythonWeb,
            Some("server.py".to_string()),
            Some("requirements.txt".to_string()),
            Some("config.json".to_string()),
        );
        let config = UnitConfig::load(&with_config, &fs).unwrap().unwrap();
        assert_eq!(config.port, Some(9001));

        let without_config = UnitDescriptor::new(
            "/mock/weather",
            Ecosystem::PythonWeb,
            Some("server.py".to_string()),
            Some("requirements.txt".to_string()),
            None,
        );
        assert!(UnitConfig::load(&without_config, &fs).unwrap().is_none());
    }
}
