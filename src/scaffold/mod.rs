//! Generates new, already-valid MCP server units from templates.

pub mod templates;

use crate::discovery::CandidateLocation;
use crate::fs::{FileSystem, RealFileSystem};
use crate::image::{ImageDescriptor, Synthesizer};
use crate::stack::python::REQUIREMENTS_FILE;
use crate::stack::EcosystemRegistry;
use crate::unit::{Classifier, UnitDescriptor};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Subdirectories created in every scaffolded unit
pub const SCAFFOLD_SUBDIRS: &[&str] = &["context", "tests"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Flask,
    #[value(name = "fastapi")]
    #[serde(rename = "fastapi")]
    FastApi,
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framework::Flask => write!(f, "flask"),
            Framework::FastApi => write!(f, "fastapi"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// Pretty-printed config.json
    Json,
    /// Flow-style config.yaml
    Yaml,
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Yaml => write!(f, "yaml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldRequest {
    pub name: String,
    pub framework: Framework,
    pub port: u16,
    pub config_format: ConfigFormat,
}

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error(
        "Invalid unit name {0:?}: must be a single non-empty path component without quotes or control characters"
    )]
    InvalidName(String),

    #[error("Destination already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Failed to write {path}: {source:#}")]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Scaffolded directory {0} was not recognized as a unit")]
    Classification(PathBuf),

    #[error("Failed to generate image descriptor: {0:#}")]
    Descriptor(#[source] anyhow::Error),
}

/// A freshly written unit
#[derive(Debug, Clone)]
pub struct ScaffoldedUnit {
    pub path: PathBuf,
    pub unit: UnitDescriptor,
    pub descriptor: ImageDescriptor,
}

pub struct Scaffolder {
    fs: Arc<dyn FileSystem>,
    registry: Arc<EcosystemRegistry>,
}

impl Scaffolder {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem::new()))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            registry: Arc::new(EcosystemRegistry::with_defaults()),
        }
    }

    /// Creates `<parent>/<name>` and everything in it.
    ///
    /// Nothing is written when the name is invalid or the destination exists.
    /// A failure after the unit directory was created removes it again.
    pub fn scaffold(
        &self,
        parent: &Path,
        request: &ScaffoldRequest,
    ) -> Result<ScaffoldedUnit, ScaffoldError> {
        validate_name(&request.name)?;

        let root = parent.join(&request.name);
        if self.fs.exists(&root) {
            return Err(ScaffoldError::AlreadyExists(root));
        }

        self.create_dir(&root)?;
        match self.populate(&root, request) {
            Ok(scaffolded) => {
                info!(
                    unit = %request.name,
                    framework = %request.framework,
                    port = request.port,
                    config = %request.config_format,
                    "Scaffolded unit"
                );
                Ok(scaffolded)
            }
            Err(e) => {
                if let Err(cleanup) = self.fs.remove_dir_all(&root) {
                    warn!(dir = %root.display(), error = %cleanup, "Failed to remove partial unit");
                }
                Err(e)
            }
        }
    }

    fn populate(
        &self,
        root: &Path,
        request: &ScaffoldRequest,
    ) -> Result<ScaffoldedUnit, ScaffoldError> {
        for subdir in SCAFFOLD_SUBDIRS {
            self.create_dir(&root.join(subdir))?;
        }

        self.write_file(
            &root.join(REQUIREMENTS_FILE),
            templates::requirements(request.framework),
        )?;

        let (config_name, config_content) = templates::config(request.config_format, request.port)
            .map_err(ScaffoldError::Descriptor)?;
        self.write_file(&root.join(config_name), &config_content)?;

        self.write_file(
            &root.join(templates::SERVER_FILE),
            &templates::server(request.framework, &request.name, request.port),
        )?;

        let unit = self.classify(root)?;
        let descriptor = Synthesizer::new(self.registry.clone(), request.port)
            .synthesize(&unit, request.port)
            .map_err(ScaffoldError::Descriptor)?;
        descriptor
            .write_to(root, self.fs.as_ref())
            .map_err(ScaffoldError::Descriptor)?;

        Ok(ScaffoldedUnit {
            path: root.to_path_buf(),
            unit,
            descriptor,
        })
    }

    fn classify(&self, root: &Path) -> Result<UnitDescriptor, ScaffoldError> {
        let entries: BTreeSet<String> = self
            .fs
            .read_dir(root)
            .map_err(|e| {
                debug!(dir = %root.display(), error = %e, "Cannot list scaffolded directory");
                ScaffoldError::Classification(root.to_path_buf())
            })?
            .into_iter()
            .map(|entry| entry.name)
            .collect();

        Classifier::new(self.fs.clone(), self.registry.clone())
            .classify(&CandidateLocation::directory(root, entries))
            .map(|classification| classification.unit)
            .ok_or_else(|| ScaffoldError::Classification(root.to_path_buf()))
    }

    fn create_dir(&self, path: &Path) -> Result<(), ScaffoldError> {
        self.fs.create_dir(path).map_err(|source| ScaffoldError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), ScaffoldError> {
        self.fs
            .write_file(path, content)
            .map_err(|source| ScaffoldError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl Default for Scaffolder {
    fn default() -> Self {
        Self::new()
    }
}

/// Names become a directory name and are embedded in Python string literals
fn validate_name(name: &str) -> Result<(), ScaffoldError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '"') || c.is_control());
    if invalid {
        Err(ScaffoldError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
