//! Ecosystem definitions for MCP server units.
//!
//! An ecosystem is the technology family a unit belongs to. It decides which
//! manifest marks a unit, which entrypoint names are conventional, what the
//! container base image is, and which validation rules apply.
//!
//! Ecosystems are registered in an [`EcosystemRegistry`] in precedence order,
//! so adding one is a new file plus one registry line.

pub mod node;
pub mod python;
pub mod registry;

use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

pub use node::NodeManifestEcosystem;
pub use python::PythonWebEcosystem;
pub use registry::EcosystemRegistry;

/// Technology family of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ecosystem {
    /// Python web app declared by `requirements.txt`
    PythonWeb,
    /// Node package declared by `package.json`
    ManifestBased,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::PythonWeb => "python-web",
            Ecosystem::ManifestBased => "manifest-based",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of entrypoint resolution for one candidate directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrypointResolution {
    pub entrypoint: Option<String>,
    pub warnings: Vec<String>,
}

impl EntrypointResolution {
    pub fn found(entrypoint: impl Into<String>) -> Self {
        Self {
            entrypoint: Some(entrypoint.into()),
            warnings: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Per-ecosystem conventions
pub trait EcosystemDefinition: Send + Sync {
    fn id(&self) -> Ecosystem;

    /// Dependency manifest that marks a directory as belonging to this ecosystem
    fn manifest_file(&self) -> &'static str;

    /// Conventional entrypoint file names, in precedence order
    fn entrypoint_candidates(&self) -> &'static [&'static str];

    /// Web-serving libraries a unit must depend on
    fn web_libraries(&self) -> &'static [&'static str];

    /// Dependency-cache directories never traversed by the scanner
    fn cache_dirs(&self) -> &'static [&'static str];

    /// Container base image
    fn base_image(&self) -> &'static str;

    /// Dependency install command run inside the image
    fn image_install_command(&self, manifest_file: &str) -> String;

    /// Program that launches the entrypoint inside the image
    fn interpreter(&self) -> &'static str;

    /// Picks the entrypoint for a directory whose immediate names are `entries`
    fn resolve_entrypoint(
        &self,
        dir: &Path,
        entries: &BTreeSet<String>,
        fs: &dyn FileSystem,
    ) -> EntrypointResolution;

    /// Whether `entries` contain this ecosystem's manifest
    fn owns(&self, entries: &BTreeSet<String>) -> bool {
        entries.contains(self.manifest_file())
    }

    /// Whether `entries` contain at least one conventional entrypoint
    fn has_conventional_entrypoint(&self, entries: &BTreeSet<String>) -> bool {
        self.entrypoint_candidates()
            .iter()
            .any(|name| entries.contains(*name))
    }
}
