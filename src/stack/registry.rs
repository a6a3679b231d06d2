use super::{Ecosystem, EcosystemDefinition, NodeManifestEcosystem, PythonWebEcosystem};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Directories skipped regardless of ecosystem
const COMMON_EXCLUDED_DIRS: &[&str] = &[".git"];

/// Ecosystems in detection precedence order
pub struct EcosystemRegistry {
    ecosystems: Vec<Arc<dyn EcosystemDefinition>>,
}

impl EcosystemRegistry {
    pub fn new() -> Self {
        Self {
            ecosystems: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PythonWebEcosystem));
        registry.register(Arc::new(NodeManifestEcosystem));
        registry
    }

    pub fn register(&mut self, ecosystem: Arc<dyn EcosystemDefinition>) {
        self.ecosystems.push(ecosystem);
    }

    pub fn get(&self, id: Ecosystem) -> Option<&dyn EcosystemDefinition> {
        self.ecosystems
            .iter()
            .find(|e| e.id() == id)
            .map(|e| e.as_ref())
    }

    /// First registered ecosystem whose manifest is among `entries`
    pub fn detect(&self, entries: &BTreeSet<String>) -> Option<&dyn EcosystemDefinition> {
        self.ecosystems
            .iter()
            .find(|e| e.owns(entries))
            .map(|e| e.as_ref())
    }

    /// Whether `entries` hold a manifest together with a conventional entrypoint of the same ecosystem
    pub fn is_buildable_layout(&self, entries: &BTreeSet<String>) -> bool {
        self.ecosystems
            .iter()
            .any(|e| e.owns(entries) && e.has_conventional_entrypoint(entries))
    }

    pub fn all_excluded_dirs(&self) -> BTreeSet<&'static str> {
        let mut dirs: BTreeSet<&'static str> = COMMON_EXCLUDED_DIRS.iter().copied().collect();
        for ecosystem in &self.ecosystems {
            dirs.extend(ecosystem.cache_dirs().iter().copied());
        }
        dirs
    }
}

impl Default for EcosystemRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
