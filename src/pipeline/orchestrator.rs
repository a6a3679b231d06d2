use super::report::{RunReport, UnitStatus};
use crate::build::{BuildInvoker, BuildOutcome, CommandRunner, ToolConfig};
use crate::discovery::{CandidateLocation, ScanError, UnitScanner};
use crate::fs::FileSystem;
use crate::image::Synthesizer;
use crate::stack::EcosystemRegistry;
use crate::unit::{Classifier, EntrypointResolver, UnitDescriptor};
use crate::validation::Validator;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_IMAGE_PREFIX: &str = "mcp_server";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub image_prefix: String,
    pub default_port: u16,
    pub entrypoint_override: Option<String>,
    pub tools: ToolConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            default_port: DEFAULT_PORT,
            entrypoint_override: None,
            tools: ToolConfig::default(),
        }
    }
}

/// A scanned candidate with its classification, when it has one
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// 1-based position in scan order, also used for image tags
    pub index: usize,
    #[serde(flatten)]
    pub candidate: CandidateLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitDescriptor>,
}

/// Scan, classify, validate, synthesize and build, one unit at a time in scan order
pub struct Pipeline {
    fs: Arc<dyn FileSystem>,
    scanner: UnitScanner,
    classifier: Classifier,
    validator: Validator,
    synthesizer: Synthesizer,
    invoker: BuildInvoker,
    image_prefix: String,
}

impl Pipeline {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        options: PipelineOptions,
    ) -> Self {
        let registry = Arc::new(EcosystemRegistry::with_defaults());
        let resolver = match options.entrypoint_override {
            Some(name) => EntrypointResolver::with_override(name),
            None => EntrypointResolver::new(),
        };

        Self {
            scanner: UnitScanner::new(fs.clone(), registry.clone()),
            classifier: Classifier::new(fs.clone(), registry.clone()).with_resolver(resolver),
            validator: Validator::new(),
            synthesizer: Synthesizer::new(registry, options.default_port),
            invoker: BuildInvoker::new(runner, fs.clone(), options.tools),
            image_prefix: options.image_prefix,
            fs,
        }
    }

    /// Scans `root` and classifies every directory candidate once
    pub fn detect(&self, root: &Path) -> Result<Vec<Detection>, ScanError> {
        let candidates = self.scanner.scan(root)?;

        let detections: Vec<Detection> = candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| {
                let unit = if candidate.is_buildable() {
                    self.classifier.classify(&candidate).map(|c| c.unit)
                } else {
                    None
                };
                Detection {
                    index: i + 1,
                    candidate,
                    unit,
                }
            })
            .collect();

        debug!(
            candidates = detections.len(),
            units = detections.iter().filter(|d| d.unit.is_some()).count(),
            "Detection complete"
        );
        Ok(detections)
    }

    pub async fn build(&self, root: &Path) -> Result<RunReport, ScanError> {
        let start = Instant::now();
        let detections = self.detect(root)?;
        info!(root = %root.display(), candidates = detections.len(), "Starting build run");

        let mut report = RunReport::new();
        for detection in &detections {
            let status = match (&detection.candidate, &detection.unit) {
                (candidate, _) if !candidate.is_buildable() => UnitStatus::Skipped,
                (_, None) => UnitStatus::Unclassified,
                (_, Some(unit)) => self.build_unit(unit, detection.index).await,
            };
            report.push(detection.index, detection.candidate.path(), status);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Build run complete"
        );
        Ok(report)
    }

    /// Dependency installation only: no validation, no descriptor, no image
    pub async fn install(&self, root: &Path) -> Result<RunReport, ScanError> {
        let detections = self.detect(root)?;
        info!(root = %root.display(), candidates = detections.len(), "Starting install run");

        let mut report = RunReport::new();
        for detection in &detections {
            let status = match (&detection.candidate, &detection.unit) {
                (candidate, _) if !candidate.is_buildable() => UnitStatus::Skipped,
                (_, None) => UnitStatus::Unclassified,
                (_, Some(unit)) => UnitStatus::Completed(self.invoker.install(unit).await),
            };
            report.push(detection.index, detection.candidate.path(), status);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Install run complete"
        );
        Ok(report)
    }

    async fn build_unit(&self, unit: &UnitDescriptor, index: usize) -> UnitStatus {
        let validation = self.validator.validate(unit, self.fs.as_ref());
        for warning in validation.warnings() {
            warn!(unit = %unit.name(), "{}", warning);
        }
        if !validation.is_ok() {
            for error in validation.errors() {
                warn!(unit = %unit.name(), "{}", error);
            }
            info!(unit = %unit.name(), errors = validation.errors().len(), "Unit failed validation, not building");
            return UnitStatus::Invalid(validation);
        }

        let port = self.synthesizer.resolve_port(unit, self.fs.as_ref());
        let written = self
            .synthesizer
            .synthesize(unit, port)
            .and_then(|descriptor| descriptor.write_to(unit.path(), self.fs.as_ref()));
        match written {
            Ok(path) => debug!(unit = %unit.name(), path = %path.display(), port, "Wrote image descriptor"),
            Err(e) => {
                warn!(unit = %unit.name(), error = %format!("{:#}", e), "Image descriptor not written");
                return UnitStatus::Completed(BuildOutcome::failed(
                    unit.path(),
                    None,
                    format!("{:#}", e),
                ));
            }
        }

        let tag = format!("{}_{}", self.image_prefix, index);
        UnitStatus::Completed(self.invoker.build(unit, &tag).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{CommandOutput, MockCommandRunner};
    use crate::discovery::CandidateKind;
    use crate::fs::MockFileSystem;

    fn add_flask_unit(fs: &MockFileSystem, dir: &str) {
        fs.add_file(format!("{}/requirements.txt", dir), "flask>=3.0\n");
        fs.add_file(
            format!("{}/server.py", dir),
            "from flask import Flask\napp = Flask(__name__)\n",
        );
    }

    fn pipeline(fs: &Arc<MockFileSystem>, runner: &Arc<MockCommandRunner>) -> Pipeline {
        Pipeline::new(fs.clone(), runner.clone(), PipelineOptions::default())
    }

    #[test]
    fn test_detect_indexes_in_scan_order() {
        let fs = Arc::new(MockFileSystem::new());
        add_flask_unit(&fs, "alpha");
        fs.add_file("beta/package.json", r#"{"dependencies": {"express": "^4"}}"#);
        fs.add_file("beta/index.js", "");
        fs.add_file("tools/gamma_mcp.py", "");
        let runner = Arc::new(MockCommandRunner::new());

        let detections = pipeline(&fs, &runner).detect(Path::new("/mock")).unwrap();
        let indexes: Vec<usize> = detections.iter().map(|d| d.index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4]);

        assert!(detections[0].unit.is_some());
        assert!(detections[1].unit.is_some());
        let file = detections.iter().find(|d| d.candidate.kind == CandidateKind::File).unwrap();
        assert!(file.unit.is_none());
    }

    #[test]
    fn test_detect_rejects_missing_root() {
        let fs = Arc::new(MockFileSystem::new());
        let runner = Arc::new(MockCommandRunner::new());
        let err = pipeline(&fs, &runner).detect(Path::new("/nowhere")).unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }

    #[tokio::test]
    async fn test_build_writes_descriptor_and_tags_by_index() {
        let fs = Arc::new(MockFileSystem::new());
        add_flask_unit(&fs, "alpha");
        add_flask_unit(&fs, "beta");
        let runner = Arc::new(MockCommandRunner::new());

        let report = pipeline(&fs, &runner).build(Path::new("/mock")).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        let dockerfile = fs.read_to_string(Path::new("/mock/beta/Dockerfile")).unwrap();
        assert!(dockerfile.starts_with("FROM python:3.11-slim\n"));
        assert!(dockerfile.contains("EXPOSE 8000"));

        let builds: Vec<String> = runner
            .calls()
            .iter()
            .filter(|c| c.program == "docker")
            .map(|c| c.to_string())
            .collect();
        assert_eq!(
            builds,
            vec!["docker build -t mcp_server_1 .", "docker build -t mcp_server_2 ."]
        );
    }

    #[tokio::test]
    async fn test_invalid_unit_is_not_built() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("alpha/requirements.txt", "requests\n");
        fs.add_file("alpha/server.py", "app = Flask(__name__)\n");
        let runner = Arc::new(MockCommandRunner::new());

        let report = pipeline(&fs, &runner).build(Path::new("/mock")).await.unwrap();

        assert!(matches!(report.entries()[0].status, UnitStatus::Invalid(_)));
        assert!(runner.calls().is_empty());
        assert!(!fs.exists(Path::new("/mock/alpha/Dockerfile")));
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_units() {
        let fs = Arc::new(MockFileSystem::new());
        add_flask_unit(&fs, "alpha");
        add_flask_unit(&fs, "beta");
        add_flask_unit(&fs, "gamma");
        let runner = Arc::new(MockCommandRunner::new());
        runner.add_output(CommandOutput::success());
        runner.add_output(CommandOutput::success());
        runner.add_output(CommandOutput::success());
        runner.add_output(CommandOutput::failure(1, "daemon not running"));

        let report = pipeline(&fs, &runner).build(Path::new("/mock")).await.unwrap();

        assert_eq!(report.entries().len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        match &report.entries()[1].status {
            UnitStatus::Completed(outcome) => {
                assert!(!outcome.success);
                assert!(outcome.message.contains("daemon not running"));
            }
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(runner.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_build_uses_config_port() {
        let fs = Arc::new(MockFileSystem::new());
        add_flask_unit(&fs, "alpha");
        fs.add_file("alpha/config.yaml", "{port: 9090, context_dir: /app/context}\n");
        let runner = Arc::new(MockCommandRunner::new());

        pipeline(&fs, &runner).build(Path::new("/mock")).await.unwrap();

        let dockerfile = fs.read_to_string(Path::new("/mock/alpha/Dockerfile")).unwrap();
        assert!(dockerfile.contains("ENV MCP_CONFIG=/app/config.yaml\n"));
        assert!(dockerfile.ends_with(
            "CMD [\"python\",\"server.py\",\"--port=9090\",\"--config=/app/config.yaml\"]\n"
        ));
    }

    #[tokio::test]
    async fn test_install_skips_validation_and_images() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("alpha/requirements.txt", "requests\n");
        fs.add_file("alpha/server.py", "print('hi')\n");
        fs.add_file("beta/package.json", r#"{"scripts": {"build": "tsc"}}"#);
        fs.add_file("beta/index.js", "");
        let runner = Arc::new(MockCommandRunner::new());

        let report = pipeline(&fs, &runner).install(Path::new("/mock")).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        let calls: Vec<String> = runner.calls().iter().map(|c| c.to_string()).collect();
        assert_eq!(calls, vec!["pip install -r requirements.txt", "npm install"]);
        assert!(!fs.exists(Path::new("/mock/alpha/Dockerfile")));
    }

    #[tokio::test]
    async fn test_custom_prefix_and_override() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("alpha-mcp/requirements.txt", "flask\n");
        fs.add_file("alpha-mcp/app.py", "app = Flask(__name__)\n");
        let runner = Arc::new(MockCommandRunner::new());
        let options = PipelineOptions {
            image_prefix: "demo".to_string(),
            entrypoint_override: Some("app.py".to_string()),
            ..PipelineOptions::default()
        };

        let report = Pipeline::new(fs.clone(), runner.clone(), options)
            .build(Path::new("/mock"))
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(runner.calls()[1].to_string(), "docker build -t demo_1 .");
        let dockerfile = fs.read_to_string(Path::new("/mock/alpha-mcp/Dockerfile")).unwrap();
        assert!(dockerfile.contains("\"app.py\""));
    }
}
