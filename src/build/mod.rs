//! Dependency installation and image builds through external tools.

pub mod invoker;
pub mod runner;

pub use invoker::{BuildInvoker, ToolConfig};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, MockCommandRunner, ProcessRunner};

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of building or installing one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    pub unit: PathBuf,
    pub image_tag: Option<String>,
    pub success: bool,
    pub message: String,
}

impl BuildOutcome {
    pub fn succeeded(unit: &Path, image_tag: Option<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.to_path_buf(),
            image_tag,
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(unit: &Path, image_tag: Option<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.to_path_buf(),
            image_tag,
            success: false,
            message: message.into(),
        }
    }
}
