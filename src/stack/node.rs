//! Node ecosystem declared by package.json

use super::{Ecosystem, EcosystemDefinition, EntrypointResolution};
use crate::fs::FileSystem;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

pub const PACKAGE_JSON: &str = "package.json";

pub struct NodeManifestEcosystem;

impl EcosystemDefinition for NodeManifestEcosystem {
    fn id(&self) -> Ecosystem {
        Ecosystem::ManifestBased
    }

    fn manifest_file(&self) -> &'static str {
        PACKAGE_JSON
    }

    fn entrypoint_candidates(&self) -> &'static [&'static str] {
        &["index.js", "server.js", "main.js", "index.mjs"]
    }

    fn web_libraries(&self) -> &'static [&'static str] {
        &["express", "fastify", "koa"]
    }

    fn cache_dirs(&self) -> &'static [&'static str] {
        &["node_modules"]
    }

    fn base_image(&self) -> &'static str {
        "node:20-slim"
    }

    fn image_install_command(&self, _manifest_file: &str) -> String {
        "npm install --omit=dev".to_string()
    }

    fn interpreter(&self) -> &'static str {
        "node"
    }

    fn resolve_entrypoint(
        &self,
        dir: &Path,
        entries: &BTreeSet<String>,
        fs: &dyn FileSystem,
    ) -> EntrypointResolution {
        if let Some(name) = self
            .entrypoint_candidates()
            .iter()
            .find(|name| entries.contains(**name))
        {
            return EntrypointResolution::found(*name);
        }

        let manifest = match fs
            .read_to_string(&dir.join(PACKAGE_JSON))
            .and_then(|content| PackageManifest::parse(&content))
        {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "No usable package.json for main fallback");
                return EntrypointResolution::none();
            }
        };

        match manifest.main_entry() {
            Some(main) if fs.is_file(&dir.join(main)) => EntrypointResolution::found(main),
            _ => EntrypointResolution::none(),
        }
    }
}

/// The parts of package.json the pipeline reads
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub main: Option<String>,
    pub dependencies: BTreeMap<String, serde_json::Value>,
    pub scripts: BTreeMap<String, String>,
}

impl PackageManifest {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("package.json is not valid JSON")
    }

    /// `main` with any leading `./` removed
    pub fn main_entry(&self) -> Option<&str> {
        self.main
            .as_deref()
            .map(|m| m.trim_start_matches("./"))
            .filter(|m| !m.is_empty())
    }

    pub fn has_build_script(&self) -> bool {
        self.scripts.contains_key("build")
    }

    pub fn depends_on(&self, library: &str) -> bool {
        self.dependencies.contains_key(library)
    }
}
