use crate::discovery::CandidateLocation;
use crate::fs::FileSystem;
use crate::stack::{EcosystemDefinition, EntrypointResolution};
use tracing::warn;

/// Chooses a unit's entrypoint, honoring an explicit caller override
#[derive(Debug, Clone, Default)]
pub struct EntrypointResolver {
    override_name: Option<String>,
}

impl EntrypointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(name: impl Into<String>) -> Self {
        Self {
            override_name: Some(name.into()),
        }
    }

    pub fn resolve(
        &self,
        ecosystem: &dyn EcosystemDefinition,
        candidate: &CandidateLocation,
        fs: &dyn FileSystem,
    ) -> EntrypointResolution {
        if let Some(name) = &self.override_name {
            // An override never falls back to conventions.
            return if fs.is_file(&candidate.path.join(name)) {
                EntrypointResolution::found(name.as_str())
            } else {
                warn!(
                    dir = %candidate.path.display(),
                    entrypoint = %name,
                    "Entrypoint override not present"
                );
                EntrypointResolution::none()
            };
        }

        ecosystem.resolve_entrypoint(&candidate.path, &candidate.entries, fs)
    }
}
