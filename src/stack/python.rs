//! Python web ecosystem (Flask, FastAPI) declared by requirements.txt

use super::{Ecosystem, EcosystemDefinition, EntrypointResolution};
use crate::fs::FileSystem;
use std::collections::BTreeSet;
use std::path::Path;

pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const PRIMARY_ENTRYPOINT: &str = "server.py";
pub const SECONDARY_ENTRYPOINT: &str = "main.py";

/// Library whose units are expected to declare routes explicitly
pub const HIGH_THROUGHPUT_LIBRARY: &str = "fastapi";

pub struct PythonWebEcosystem;

impl EcosystemDefinition for PythonWebEcosystem {
    fn id(&self) -> Ecosystem {
        Ecosystem::PythonWeb
    }

    fn manifest_file(&self) -> &'static str {
        REQUIREMENTS_FILE
    }

    fn entrypoint_candidates(&self) -> &'static [&'static str] {
        &[PRIMARY_ENTRYPOINT, SECONDARY_ENTRYPOINT]
    }

    fn web_libraries(&self) -> &'static [&'static str] {
        &["flask", HIGH_THROUGHPUT_LIBRARY]
    }

    fn cache_dirs(&self) -> &'static [&'static str] {
        &[
            "__pycache__",
            "venv",
            ".venv",
            "env",
            "site-packages",
            ".tox",
            ".mypy_cache",
            ".pytest_cache",
        ]
    }

    fn base_image(&self) -> &'static str {
        "python:3.11-slim"
    }

    fn image_install_command(&self, manifest_file: &str) -> String {
        format!("pip install --no-cache-dir -r {}", manifest_file)
    }

    fn interpreter(&self) -> &'static str {
        "python"
    }

    fn resolve_entrypoint(
        &self,
        dir: &Path,
        entries: &BTreeSet<String>,
        _fs: &dyn FileSystem,
    ) -> EntrypointResolution {
        let primary = entries.contains(PRIMARY_ENTRYPOINT);
        let secondary = entries.contains(SECONDARY_ENTRYPOINT);

        match (primary, secondary) {
            (true, true) => EntrypointResolution::found(PRIMARY_ENTRYPOINT).with_warning(format!(
                "{} has both {} and {}; using {}",
                dir.display(),
                PRIMARY_ENTRYPOINT,
                SECONDARY_ENTRYPOINT,
                PRIMARY_ENTRYPOINT
            )),
            (true, false) => EntrypointResolution::found(PRIMARY_ENTRYPOINT),
            (false, true) => EntrypointResolution::found(SECONDARY_ENTRYPOINT),
            (false, false) => EntrypointResolution::none(),
        }
    }
}

/// Normalized package names listed in a requirements file.
///
/// Comments, blank lines and pip options (`-r`, `--index-url`, ...) are skipped;
/// version specifiers, extras and markers are stripped.
pub fn requirement_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(|line| {
            let name: String = line
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect();
            if name.is_empty() {
                None
            } else {
                Some(name.to_ascii_lowercase().replace('_', "-"))
            }
        })
        .collect()
}

/// Whether a requirements file lists `library`
pub fn requires(content: &str, library: &str) -> bool {
    requirement_names(content).iter().any(|name| name == library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn entries(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_primary_only() {
        let fs = MockFileSystem::new();
        let resolution = PythonWebEcosystem.resolve_entrypoint(
            Path::new("/mock/unit"),
            &entries(&["requirements.txt", "server.py"]),
            &fs,
        );
        assert_eq!(resolution.entrypoint.as_deref(), Some("server.py"));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_secondary_only() {
        let fs = MockFileSystem::new();
        let resolution = PythonWebEcosystem.resolve_entrypoint(
            Path::new("/mock/unit"),
            &entries(&["requirements.txt", "main.py"]),
            &fs,
        );
        assert_eq!(resolution.entrypoint.as_deref(), Some("main.py"));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_both_prefers_primary_and_warns() {
        let fs = MockFileSystem::new();
        let resolution = PythonWebEcosystem.resolve_entrypoint(
            Path::new("/mock/unit"),
            &entries(&["main.py", "requirements.txt", "server.py"]),
            &fs,
        );
        assert_eq!(resolution.entrypoint.as_deref(), Some("server.py"));
        assert_eq!(resolution.warnings.len(), 1);
        assert!(resolution.warnings[0].contains("main.py"));
    }

    #[test]
    fn test_neither() {
        let fs = MockFileSystem::new();
        let resolution = PythonWebEcosystem.resolve_entrypoint(
            Path::new("/mock/unit"),
            &entries(&["requirements.txt", "app.py"]),
            &fs,
        );
        assert!(resolution.entrypoint.is_none());
    }

    #[test]
    fn test_requirement_names() {
        let content = "# web\nFlask>=3.0\nfastapi[all]==0.110 ; python_version > '3.8'\n-r base.txt\n\nrequests  # http\npython_dotenv\n";
        assert_eq!(
            requirement_names(content),
            vec!["flask", "fastapi", "requests", "python-dotenv"]
        );
    }

    #[test]
    fn test_requires_exact_name() {
        assert!(requires("flask==3.0\n", "flask"));
        assert!(!requires("flask-cors\n", "flask"));
        assert!(!requires("# flask\n", "flask"));
    }
}
