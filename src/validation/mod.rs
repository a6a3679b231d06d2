//! Structural validation of classified units.
//!
//! Each check is an independent [`ValidationRule`] tagged with the ecosystem
//! it applies to. The [`Validator`] reads a unit's sources once and runs the
//! matching rules, collecting errors (which block the build) and warnings
//! (which never do).

pub mod rules;
pub mod validator;

pub use rules::ValidationRule;
pub use validator::Validator;

use crate::fs::FileSystem;
use crate::unit::UnitDescriptor;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One message produced by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Outcome of validating one unit. `is_ok()` is derived from the error list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.errors.push(finding.message),
            Severity::Warning => self.warnings.push(finding.message),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Contents of one source file a rule may inspect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Not declared on the descriptor, or not on disk
    Absent,
    /// Present but could not be read
    Unreadable(String),
    Text(String),
}

impl Source {
    fn read(unit: &UnitDescriptor, file_name: Option<&str>, fs: &dyn FileSystem) -> Self {
        let Some(file_name) = file_name else {
            return Source::Absent;
        };
        let path = unit.path().join(file_name);
        if !fs.is_file(&path) {
            return Source::Absent;
        }
        match fs.read_to_string(&path) {
            Ok(text) => Source::Text(text),
            Err(e) => Source::Unreadable(format!("{:#}", e)),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Source::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The manifest and entrypoint of a unit, read once before rules run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSources {
    pub manifest: Source,
    pub entrypoint: Source,
}

impl UnitSources {
    pub fn read(unit: &UnitDescriptor, fs: &dyn FileSystem) -> Self {
        Self {
            manifest: Source::read(unit, unit.dependencies_file(), fs),
            entrypoint: Source::read(unit, unit.entrypoint(), fs),
        }
    }
}
