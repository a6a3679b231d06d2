use super::{is_unit_dir_name, is_unit_file_name, CandidateLocation};
use crate::fs::{DirEntry, FileSystem};
use crate::stack::EcosystemRegistry;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, trace};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path does not exist: {0}")]
    RootNotFound(PathBuf),
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Depth-first, read-only walk that reports unit candidates in name order
pub struct UnitScanner {
    fs: Arc<dyn FileSystem>,
    registry: Arc<EcosystemRegistry>,
}

impl UnitScanner {
    pub fn new(fs: Arc<dyn FileSystem>, registry: Arc<EcosystemRegistry>) -> Self {
        Self { fs, registry }
    }

    pub fn scan(&self, root: &Path) -> Result<Vec<CandidateLocation>, ScanError> {
        if !self.fs.exists(root) {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if !self.fs.is_dir(root) {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let start = Instant::now();
        let excluded = self.registry.all_excluded_dirs();
        let mut visited = HashSet::new();
        let mut candidates = Vec::new();

        self.visit(root, &excluded, &mut visited, &mut candidates);

        info!(
            root = %root.display(),
            candidates = candidates.len(),
            dirs_visited = visited.len(),
            scan_time_ms = start.elapsed().as_millis() as u64,
            "Scan completed"
        );

        Ok(candidates)
    }

    fn visit(
        &self,
        dir: &Path,
        excluded: &BTreeSet<&'static str>,
        visited: &mut HashSet<PathBuf>,
        candidates: &mut Vec<CandidateLocation>,
    ) {
        let key = self
            .fs
            .canonicalize(dir)
            .unwrap_or_else(|_| dir.to_path_buf());
        if !visited.insert(key) {
            trace!(dir = %dir.display(), "Already visited");
            return;
        }

        let mut entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                return;
            }
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let names: BTreeSet<String> = entries.iter().map(|e| e.name.clone()).collect();
        let unit_files: Vec<&DirEntry> = entries
            .iter()
            .filter(|e| e.is_file() && is_unit_file_name(e.file_name()))
            .collect();

        let named = dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(is_unit_dir_name)
            .unwrap_or(false);
        let buildable_layout = self.registry.is_buildable_layout(&names);

        if named || buildable_layout || !unit_files.is_empty() {
            debug!(
                dir = %dir.display(),
                named,
                buildable_layout,
                unit_files = unit_files.len(),
                "Found unit directory"
            );
            candidates.push(CandidateLocation::directory(dir, names));
        }

        if !named && !buildable_layout {
            for file in unit_files {
                debug!(file = %file.path().display(), "Found single-file unit");
                candidates.push(CandidateLocation::file(file.path()));
            }
        }

        for entry in entries.iter().filter(|e| e.is_dir()) {
            if excluded.contains(entry.file_name()) {
                trace!(dir = %entry.path().display(), "Pruned excluded directory");
                continue;
            }
            self.visit(entry.path(), excluded, visited, candidates);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::CandidateKind;
    use crate::fs::MockFileSystem;

    fn scanner(fs: MockFileSystem) -> UnitScanner {
        UnitScanner::new(Arc::new(fs), Arc::new(EcosystemRegistry::with_defaults()))
    }

    fn paths(candidates: &[CandidateLocation]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| c.path.display().to_string())
            .collect()
    }

    #[test]
    fn test_finds_python_and_node_units() {
        let fs = MockFileSystem::new();
        fs.add_file("services/weather/requirements.txt", "flask");
        fs.add_file("services/weather/server.py", "app = Flask(__name__)");
        fs.add_file("services/notes/package.json", "{}");
        fs.add_file("services/notes/index.js", "");
        fs.add_file("docs/README.md", "docs");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        assert_eq!(
            paths(&candidates),
            vec!["/mock/services/notes", "/mock/services/weather"]
        );
        assert!(candidates.iter().all(|c| c.kind == CandidateKind::Directory));
    }

    #[test]
    fn test_prunes_excluded_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("notes/package.json", "{}");
        fs.add_file("notes/index.js", "");
        fs.add_file("notes/node_modules/express/package.json", "{}");
        fs.add_file("notes/node_modules/express/index.js", "");
        fs.add_file(".venv/lib/tool/requirements.txt", "flask");
        fs.add_file(".venv/lib/tool/server.py", "");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        assert_eq!(paths(&candidates), vec!["/mock/notes"]);
    }

    #[test]
    fn test_unit_dir_name_is_candidate() {
        let fs = MockFileSystem::new();
        fs.add_file("tools/search-mcp/README.md", "");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        assert_eq!(paths(&candidates), vec!["/mock/tools/search-mcp"]);
    }

    #[test]
    fn test_loose_unit_file_reported_as_non_buildable() {
        let fs = MockFileSystem::new();
        fs.add_file("scripts/weather_mcp.py", "");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        assert_eq!(
            paths(&candidates),
            vec!["/mock/scripts", "/mock/scripts/weather_mcp.py"]
        );
        assert!(candidates[0].is_buildable());
        assert!(!candidates[1].is_buildable());
    }

    #[test]
    fn test_unit_file_inside_unit_directory_not_reported_separately() {
        let fs = MockFileSystem::new();
        fs.add_file("weather/requirements.txt", "flask");
        fs.add_file("weather/server.py", "");
        fs.add_file("weather/helper_mcp.py", "");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        assert_eq!(paths(&candidates), vec!["/mock/weather"]);
    }

    #[test]
    fn test_manifest_without_entrypoint_is_not_candidate() {
        let fs = MockFileSystem::new();
        fs.add_file("lib/requirements.txt", "flask");
        fs.add_file("lib/app.py", "");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_unreadable_directory_is_skipped() {
        let fs = MockFileSystem::new();
        fs.add_unreadable_dir("locked");
        fs.add_file("weather/requirements.txt", "flask");
        fs.add_file("weather/server.py", "");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        assert_eq!(paths(&candidates), vec!["/mock/weather"]);
    }

    #[test]
    fn test_candidate_entries_are_immediate_names() {
        let fs = MockFileSystem::new();
        fs.add_file("weather/requirements.txt", "flask");
        fs.add_file("weather/server.py", "");
        fs.add_file("weather/context/notes.md", "");

        let candidates = scanner(fs).scan(Path::new("/mock")).unwrap();
        let entries: Vec<&str> = candidates[0].entries.iter().map(|s| s.as_str()).collect();
        assert_eq!(entries, vec!["context", "requirements.txt", "server.py"]);
    }

    #[test]
    fn test_missing_root() {
        let err = scanner(MockFileSystem::new())
            .scan(Path::new("/elsewhere"))
            .unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }

    #[test]
    fn test_file_root() {
        let fs = MockFileSystem::new();
        fs.add_file("server.py", "");
        let err = scanner(fs).scan(Path::new("/mock/server.py")).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }
}
