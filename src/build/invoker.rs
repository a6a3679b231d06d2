use super::runner::{tail, CommandOutput, CommandRunner, CommandSpec};
use super::BuildOutcome;
use crate::fs::FileSystem;
use crate::stack::node::{PackageManifest, PACKAGE_JSON};
use crate::stack::python::REQUIREMENTS_FILE;
use crate::stack::Ecosystem;
use crate::unit::UnitDescriptor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lines of captured output kept in a failure message
const OUTPUT_TAIL_LINES: usize = 20;

/// Names of the external programs the invoker runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub pip: String,
    pub npm: String,
    pub docker: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            pip: "pip".to_string(),
            npm: "npm".to_string(),
            docker: "docker".to_string(),
        }
    }
}

/// Runs dependency installation and image builds for one unit at a time
pub struct BuildInvoker {
    runner: Arc<dyn CommandRunner>,
    fs: Arc<dyn FileSystem>,
    tools: ToolConfig,
}

impl BuildInvoker {
    pub fn new(runner: Arc<dyn CommandRunner>, fs: Arc<dyn FileSystem>, tools: ToolConfig) -> Self {
        Self { runner, fs, tools }
    }

    /// Installs dependencies and builds the unit.
    ///
    /// Python units end in an image build tagged `tag`; the outcome carries the
    /// tag even when a step fails. Node units run their `build` script when
    /// `package.json` declares one and get no image.
    pub async fn build(&self, unit: &UnitDescriptor, tag: &str) -> BuildOutcome {
        let mut steps = vec![self.install_step(unit)];
        let image_tag = match unit.ecosystem() {
            Ecosystem::PythonWeb => {
                steps.push(
                    CommandSpec::new(&self.tools.docker, unit.path()).args(["build", "-t", tag, "."]),
                );
                Some(tag.to_string())
            }
            Ecosystem::ManifestBased => {
                if self.declares_build_script(unit) {
                    steps.push(CommandSpec::new(&self.tools.npm, unit.path()).args(["run", "build"]));
                }
                None
            }
        };

        match self.run_steps(&steps).await {
            Ok(()) => {
                let message = match &image_tag {
                    Some(tag) => format!("built image {}", tag),
                    None => "dependencies installed and build completed".to_string(),
                };
                info!(unit = %unit.name(), image = image_tag.as_deref().unwrap_or("none"), "Build succeeded");
                BuildOutcome::succeeded(unit.path(), image_tag, message)
            }
            Err(message) => {
                warn!(unit = %unit.name(), "Build failed: {}", message);
                BuildOutcome::failed(unit.path(), image_tag, message)
            }
        }
    }

    /// Runs only the dependency installation step
    pub async fn install(&self, unit: &UnitDescriptor) -> BuildOutcome {
        match self.run_steps(&[self.install_step(unit)]).await {
            Ok(()) => {
                info!(unit = %unit.name(), "Dependencies installed");
                BuildOutcome::succeeded(unit.path(), None, "dependencies installed")
            }
            Err(message) => {
                warn!(unit = %unit.name(), "Install failed: {}", message);
                BuildOutcome::failed(unit.path(), None, message)
            }
        }
    }

    fn install_step(&self, unit: &UnitDescriptor) -> CommandSpec {
        match unit.ecosystem() {
            Ecosystem::PythonWeb => CommandSpec::new(&self.tools.pip, unit.path()).args([
                "install",
                "-r",
                unit.dependencies_file().unwrap_or(REQUIREMENTS_FILE),
            ]),
            Ecosystem::ManifestBased => CommandSpec::new(&self.tools.npm, unit.path()).arg("install"),
        }
    }

    fn declares_build_script(&self, unit: &UnitDescriptor) -> bool {
        let path = unit
            .path()
            .join(unit.dependencies_file().unwrap_or(PACKAGE_JSON));
        match self
            .fs
            .read_to_string(&path)
            .and_then(|content| PackageManifest::parse(&content))
        {
            Ok(manifest) => manifest.has_build_script(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cannot read build script, skipping");
                false
            }
        }
    }

    /// Runs steps in order, stopping at the first failure
    async fn run_steps(&self, steps: &[CommandSpec]) -> Result<(), String> {
        for step in steps {
            let output = self
                .runner
                .run(step)
                .await
                .map_err(|e| format!("`{}` failed to start: {:#}", step, e))?;
            if !output.is_success() {
                return Err(describe_failure(step, &output));
            }
            debug!(command = %step, "Command succeeded");
        }
        Ok(())
    }
}

fn describe_failure(step: &CommandSpec, output: &CommandOutput) -> String {
    let status = match output.status_code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    };
    let captured = if output.stderr.trim().is_empty() {
        tail(&output.stdout, OUTPUT_TAIL_LINES)
    } else {
        tail(&output.stderr, OUTPUT_TAIL_LINES)
    };

    if captured.is_empty() {
        format!("`{}` {}", step, status)
    } else {
        format!("`{}` {}: {}", step, status, captured)
    }
}
