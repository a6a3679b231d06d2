//! Container image descriptors (Dockerfiles) for classified units.

pub mod synthesizer;

pub use synthesizer::Synthesizer;

use crate::fs::FileSystem;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// File name of the generated descriptor inside a unit directory
pub const DESCRIPTOR_FILE: &str = "Dockerfile";

/// Working directory and copy destination inside the image
pub const APP_DIR: &str = "/app";

/// Ordered Dockerfile instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    lines: Vec<String>,
}

impl ImageDescriptor {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Newline-terminated text, the exact bytes written to disk
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    pub fn digest(&self) -> String {
        format!("sha256:{}", hex::encode(Sha256::digest(self.render().as_bytes())))
    }

    /// Writes `<dir>/Dockerfile`, replacing any previous descriptor
    pub fn write_to(&self, dir: &Path, fs: &dyn FileSystem) -> Result<PathBuf> {
        let path = dir.join(DESCRIPTOR_FILE);
        fs.write_file(&path, &self.render())
            .with_context(|| format!("Failed to write image descriptor for {}", dir.display()))?;
        Ok(path)
    }
}
