use super::{ImageDescriptor, APP_DIR};
use crate::fs::FileSystem;
use crate::stack::EcosystemRegistry;
use crate::unit::{UnitConfig, UnitDescriptor};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns classified units into image descriptors
pub struct Synthesizer {
    registry: Arc<EcosystemRegistry>,
    default_port: u16,
}

impl Synthesizer {
    pub fn new(registry: Arc<EcosystemRegistry>, default_port: u16) -> Self {
        Self {
            registry,
            default_port,
        }
    }

    /// Port from the unit's configuration file, else the default.
    ///
    /// A configuration file that fails to load is logged and ignored.
    pub fn resolve_port(&self, unit: &UnitDescriptor, fs: &dyn FileSystem) -> u16 {
        match UnitConfig::load(unit, fs) {
            Ok(Some(config)) => config
                .port
                .filter(|port| *port != 0)
                .unwrap_or(self.default_port),
            Ok(None) => self.default_port,
            Err(e) => {
                warn!(
                    unit = %unit.name(),
                    config = unit.config_file().unwrap_or_default(),
                    error = %format!("{:#}", e),
                    "Ignoring unreadable configuration, using default port"
                );
                self.default_port
            }
        }
    }

    pub fn synthesize(&self, unit: &UnitDescriptor, port: u16) -> Result<ImageDescriptor> {
        let ecosystem = self
            .registry
            .get(unit.ecosystem())
            .ok_or_else(|| anyhow!("No ecosystem registered for {}", unit.ecosystem()))?;
        let entrypoint = unit
            .entrypoint()
            .ok_or_else(|| anyhow!("Unit {} has no entrypoint", unit.name()))?;
        let manifest = unit.dependencies_file().unwrap_or(ecosystem.manifest_file());

        let mut lines = vec![
            format!("FROM {}", ecosystem.base_image()),
            format!("WORKDIR {}", APP_DIR),
            format!("COPY . {}", APP_DIR),
            format!("RUN {}", ecosystem.image_install_command(manifest)),
            format!("ENV PORT={}", port),
        ];

        let config_path = unit
            .config_file()
            .map(|name| format!("{}/{}", APP_DIR, name));
        if let Some(config_path) = &config_path {
            lines.push(format!("ENV MCP_CONFIG={}", config_path));
        }

        lines.push(format!("EXPOSE {}", port));

        let mut command = vec![
            ecosystem.interpreter().to_string(),
            entrypoint.to_string(),
            format!("--port={}", port),
        ];
        if let Some(config_path) = &config_path {
            command.push(format!("--config={}", config_path));
        }
        let command = serde_json::to_string(&command).context("Failed to encode CMD")?;
        lines.push(format!("CMD {}", command));

        let descriptor = ImageDescriptor::new(lines);
        debug!(unit = %unit.name(), digest = %descriptor.digest(), "Synthesized image descriptor");
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::stack::Ecosystem;

    fn synthesizer() -> Synthesizer {
        Synthesizer::new(Arc::new(EcosystemRegistry::with_defaults()), 8000)
    }

    fn python_unit(config: Option<&str>) -> UnitDescriptor {
        UnitDescriptor::new(
            "/mock/weather",
            Ecosystem::PythonWeb,
            Some("server.py".to_string()),
            Some("requirements.txt".to_string()),
            config.map(str::to_string),
        )
    }

    #[test]
    fn test_python_descriptor_with_config() {
        let descriptor = synthesizer()
            .synthesize(&python_unit(Some("config.yaml")), 9090)
            .unwrap();

        assert_eq!(
            descriptor.render(),
            "FROM python:3.11-slim\n\
             WORKDIR /app\n\
             COPY . /app\n\
             RUN pip install --no-cache-dir -r requirements.txt\n\
             ENV PORT=9090\n\
             ENV MCP_CONFIG=/app/config.yaml\n\
             EXPOSE 9090\n\
             CMD [\"python\",\"server.py\",\"--port=9090\",\"--config=/app/config.yaml\"]\n"
        );
    }

    #[test]
    fn test_python_descriptor_without_config() {
        let descriptor = synthesizer().synthesize(&python_unit(None), 8000).unwrap();

        assert!(!descriptor.lines().iter().any(|l| l.contains("MCP_CONFIG")));
        assert_eq!(
            descriptor.lines().last().map(String::as_str),
            Some("CMD [\"python\",\"server.py\",\"--port=8000\"]")
        );
    }

    #[test]
    fn test_node_descriptor() {
        let unit = UnitDescriptor::new(
            "/mock/notes",
            Ecosystem::ManifestBased,
            Some("index.js".to_string()),
            Some("package.json".to_string()),
            None,
        );
        let descriptor = synthesizer().synthesize(&unit, 3000).unwrap();

        assert_eq!(descriptor.lines()[0], "FROM node:20-slim");
        assert_eq!(descriptor.lines()[3], "RUN npm install --omit=dev");
        assert_eq!(descriptor.lines()[5], "EXPOSE 3000");
        assert_eq!(descriptor.lines()[6], "CMD [\"node\",\"index.js\",\"--port=3000\"]");
    }

    #[test]
    fn test_deterministic() {
        let unit = python_unit(Some("config.json"));
        let first = synthesizer().synthesize(&unit, 8000).unwrap();
        let second = synthesizer().synthesize(&unit, 8000).unwrap();
        assert_eq!(first.render(), second.render());
        assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn test_requires_entrypoint() {
        let unit = UnitDescriptor::new(
            "/mock/weather",
            Ecosystem::PythonWeb,
            None,
            Some("requirements.txt".to_string()),
            None,
        );
        assert!(synthesizer().synthesize(&unit, 8000).is_err());
    }

    #[test]
    fn test_resolve_port_from_config() {
        let fs = MockFileSystem::new();
        fs.add_file("weather/config.yaml", "{port: 9191, context_dir: /app/context}\n");
        assert_eq!(
            synthesizer().resolve_port(&python_unit(Some("config.yaml")), &fs),
            9191
        );
    }

    #[test]
    fn test_resolve_port_defaults() {
        let fs = MockFileSystem::new();
        fs.add_file("weather/config.json", r#"{"context_dir": "/data"}"#);
        assert_eq!(
            synthesizer().resolve_port(&python_unit(Some("config.json")), &fs),
            8000
        );
        assert_eq!(synthesizer().resolve_port(&python_unit(None), &fs), 8000);
    }

    #[test]
    fn test_resolve_port_malformed_config_falls_back() {
        let fs = MockFileSystem::new();
        fs.add_file("weather/config.json", "{\"port\": ");
        assert_eq!(
            synthesizer().resolve_port(&python_unit(Some("config.json")), &fs),
            8000
        );
    }
}
