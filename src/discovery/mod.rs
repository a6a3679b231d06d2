//! Discovery of MCP server units on disk.
//!
//! The [`UnitScanner`] walks a directory tree depth-first and reports
//! [`CandidateLocation`]s: directories that look like a unit, and loose unit
//! files that match the unit-suffix naming convention.

pub mod scanner;

pub use scanner::{ScanError, UnitScanner};

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File name endings that mark a single-file unit
pub const UNIT_FILE_SUFFIXES: &[&str] = &["_mcp.py", "-mcp.py", "_mcp.js", "-mcp.js", "_mcp.ts", "-mcp.ts"];

/// Directory name endings that mark a unit directory
pub const UNIT_DIR_SUFFIXES: &[&str] = &["-mcp", "_mcp", ".mcp"];

pub fn is_unit_file_name(name: &str) -> bool {
    UNIT_FILE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

pub fn is_unit_dir_name(name: &str) -> bool {
    UNIT_DIR_SUFFIXES
        .iter()
        .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Directory,
    /// A loose unit file; reported by detection but never built
    File,
}

/// A place on disk that may hold a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateLocation {
    pub path: PathBuf,
    pub kind: CandidateKind,
    /// Immediate file and directory names (empty for file candidates)
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub entries: BTreeSet<String>,
}

impl CandidateLocation {
    pub fn directory(path: impl Into<PathBuf>, entries: BTreeSet<String>) -> Self {
        Self {
            path: path.into(),
            kind: CandidateKind::Directory,
            entries,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: CandidateKind::File,
            entries: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_buildable(&self) -> bool {
        self.kind == CandidateKind::Directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_file_names() {
        assert!(is_unit_file_name("weather_mcp.py"));
        assert!(is_unit_file_name("notes-mcp.js"));
        assert!(is_unit_file_name("search_mcp.ts"));
        assert!(!is_unit_file_name("server.py"));
        assert!(!is_unit_file_name("mcp.py"));
    }

    #[test]
    fn test_unit_dir_names() {
        assert!(is_unit_dir_name("weather-mcp"));
        assert!(is_unit_dir_name("notes_mcp"));
        assert!(is_unit_dir_name("search.mcp"));
        assert!(!is_unit_dir_name("-mcp"));
        assert!(!is_unit_dir_name("mcp-servers"));
    }

    #[test]
    fn test_candidate_kinds() {
        let dir = CandidateLocation::directory("/units/a", BTreeSet::new());
        let file = CandidateLocation::file("/units/tool_mcp.py");
        assert!(dir.is_buildable());
        assert!(!file.is_buildable());
    }
}
