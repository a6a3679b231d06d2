//! Classified units: ecosystem, entrypoint and configuration of one candidate directory.

pub mod classifier;
pub mod config;
pub mod entrypoint;

pub use classifier::{Classification, Classifier};
pub use config::UnitConfig;
pub use entrypoint::EntrypointResolver;

use crate::stack::Ecosystem;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Configuration files recognized in a unit directory, in precedence order
pub const CONFIG_CANDIDATES: &[&str] = &["config.yaml", "config.yml", "config.json"];

/// First recognized configuration file among `entries`
pub fn detect_config_file(entries: &BTreeSet<String>) -> Option<&'static str> {
    CONFIG_CANDIDATES
        .iter()
        .copied()
        .find(|name| entries.contains(*name))
}

/// A classified unit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDescriptor {
    path: PathBuf,
    ecosystem: Ecosystem,
    entrypoint: Option<String>,
    dependencies_file: Option<String>,
    config_file: Option<String>,
}

impl UnitDescriptor {
    pub fn new(
        path: impl Into<PathBuf>,
        ecosystem: Ecosystem,
        entrypoint: Option<String>,
        dependencies_file: Option<String>,
        config_file: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            ecosystem,
            entrypoint,
            dependencies_file,
            config_file,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn entrypoint(&self) -> Option<&str> {
        self.entrypoint.as_deref()
    }

    pub fn dependencies_file(&self) -> Option<&str> {
        self.dependencies_file.as_deref()
    }

    pub fn config_file(&self) -> Option<&str> {
        self.config_file.as_deref()
    }

    /// Directory name, used in logs and status lines
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
