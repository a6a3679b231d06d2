use super::{detect_config_file, EntrypointResolver, UnitDescriptor};
use crate::discovery::CandidateLocation;
use crate::fs::FileSystem;
use crate::stack::EcosystemRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A unit descriptor plus the warnings raised while resolving it
#[derive(Debug, Clone)]
pub struct Classification {
    pub unit: UnitDescriptor,
    pub warnings: Vec<String>,
}

/// Maps candidate directories to ecosystems and entrypoints
pub struct Classifier {
    fs: Arc<dyn FileSystem>,
    registry: Arc<EcosystemRegistry>,
    resolver: EntrypointResolver,
}

impl Classifier {
    pub fn new(fs: Arc<dyn FileSystem>, registry: Arc<EcosystemRegistry>) -> Self {
        Self {
            fs,
            registry,
            resolver: EntrypointResolver::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: EntrypointResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns `None` when the candidate cannot be a buildable unit.
    ///
    /// Dropping is not an error: file candidates, directories without a known
    /// manifest and directories without a usable entrypoint are all dropped.
    /// Resolution warnings are logged here, once per call.
    pub fn classify(&self, candidate: &CandidateLocation) -> Option<Classification> {
        if !candidate.is_buildable() {
            debug!(path = %candidate.path.display(), "Single-file candidate is not classified");
            return None;
        }

        let ecosystem = match self.registry.detect(&candidate.entries) {
            Some(ecosystem) => ecosystem,
            None => {
                info!(dir = %candidate.path.display(), "No ecosystem manifest, dropping candidate");
                return None;
            }
        };

        let resolution = self.resolver.resolve(ecosystem, candidate, self.fs.as_ref());
        for warning in &resolution.warnings {
            warn!(dir = %candidate.path.display(), "{}", warning);
        }

        let entrypoint = match resolution.entrypoint {
            Some(entrypoint) => entrypoint,
            None => {
                info!(
                    dir = %candidate.path.display(),
                    ecosystem = %ecosystem.id(),
                    "No usable entrypoint, dropping candidate"
                );
                return None;
            }
        };

        let unit = UnitDescriptor::new(
            candidate.path.clone(),
            ecosystem.id(),
            Some(entrypoint),
            Some(ecosystem.manifest_file().to_string()),
            detect_config_file(&candidate.entries).map(str::to_string),
        );

        debug!(
            dir = %unit.path().display(),
            ecosystem = %unit.ecosystem(),
            entrypoint = unit.entrypoint().unwrap_or_default(),
            config = unit.config_file().unwrap_or("none"),
            "Classified unit"
        );

        Some(Classification {
            unit,
            warnings: resolution.warnings,
        })
    }
}
