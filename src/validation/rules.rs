use super::{Finding, Source, UnitSources};
use crate::stack::node::PackageManifest;
use crate::stack::python::{self, HIGH_THROUGHPUT_LIBRARY};
use crate::stack::{Ecosystem, EcosystemDefinition, NodeManifestEcosystem, PythonWebEcosystem};
use crate::unit::UnitDescriptor;
use regex::Regex;

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// The ecosystem this rule applies to
    fn ecosystem(&self) -> Ecosystem;

    fn check(&self, unit: &UnitDescriptor, sources: &UnitSources) -> Vec<Finding>;
}

/// "a, b or c"
fn describe_choices(choices: &[&str]) -> String {
    match choices {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

fn manifest_name(unit: &UnitDescriptor, fallback: &'static str) -> String {
    unit.dependencies_file().unwrap_or(fallback).to_string()
}

/// Error when the source is missing or unreadable, otherwise its text
fn require_text<'a>(source: &'a Source, what: &str) -> Result<&'a str, Finding> {
    match source {
        Source::Text(text) => Ok(text),
        Source::Absent => Err(Finding::error(format!("{} does not exist", what))),
        Source::Unreadable(reason) => Err(Finding::error(format!(
            "{} could not be read: {}",
            what, reason
        ))),
    }
}

pub struct PythonWebLibraryRule;

impl ValidationRule for PythonWebLibraryRule {
    fn name(&self) -> &'static str {
        "python-web-library"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PythonWeb
    }

    fn check(&self, unit: &UnitDescriptor, sources: &UnitSources) -> Vec<Finding> {
        let manifest = manifest_name(unit, python::REQUIREMENTS_FILE);
        let content = match require_text(&sources.manifest, &manifest) {
            Ok(content) => content,
            Err(finding) => return vec![finding],
        };

        let libraries = PythonWebEcosystem.web_libraries();
        if libraries.iter().any(|lib| python::requires(content, lib)) {
            Vec::new()
        } else {
            vec![Finding::error(format!(
                "{} does not require a supported web library ({})",
                manifest,
                describe_choices(libraries)
            ))]
        }
    }
}

pub struct PythonAppMarkerRule {
    app_assignment: Regex,
    entry_function: Regex,
}

impl PythonAppMarkerRule {
    pub fn new() -> Self {
        Self {
            app_assignment: Regex::new(
                r"(?m)^\s*\w+\s*(:\s*[\w.]+\s*)?=\s*(\w+\.)?(Flask|FastAPI)\s*\(",
            )
            .expect("valid regex"),
            entry_function: Regex::new(
                r#"(?m)^\s*(async\s+)?def\s+main\s*\(|^\s*if\s+__name__\s*==\s*["']__main__["']\s*:"#,
            )
            .expect("valid regex"),
        }
    }
}

impl Default for PythonAppMarkerRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationRule for PythonAppMarkerRule {
    fn name(&self) -> &'static str {
        "python-app-marker"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PythonWeb
    }

    fn check(&self, unit: &UnitDescriptor, sources: &UnitSources) -> Vec<Finding> {
        let Some(entrypoint) = unit.entrypoint() else {
            return vec![Finding::error("no entrypoint resolved")];
        };
        let content = match require_text(&sources.entrypoint, &format!("entrypoint {}", entrypoint)) {
            Ok(content) => content,
            Err(finding) => return vec![finding],
        };

        if self.app_assignment.is_match(content) || self.entry_function.is_match(content) {
            Vec::new()
        } else {
            vec![Finding::error(format!(
                "{} defines neither an application object (app = Flask(...) / FastAPI(...)) nor a main() entry",
                entrypoint
            ))]
        }
    }
}

pub struct FastApiRoutesRule {
    route_decorator: Regex,
}

impl FastApiRoutesRule {
    pub fn new() -> Self {
        Self {
            route_decorator: Regex::new(
                r"(?m)^\s*@\w+\.(get|post|put|delete|patch|route|api_route)\s*\(",
            )
            .expect("valid regex"),
        }
    }
}

impl Default for FastApiRoutesRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationRule for FastApiRoutesRule {
    fn name(&self) -> &'static str {
        "fastapi-routes"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PythonWeb
    }

    fn check(&self, unit: &UnitDescriptor, sources: &UnitSources) -> Vec<Finding> {
        let uses_fastapi = sources
            .manifest
            .text()
            .map(|content| python::requires(content, HIGH_THROUGHPUT_LIBRARY))
            .unwrap_or(false);
        if !uses_fastapi {
            return Vec::new();
        }

        // Missing entrypoints are reported by python-app-marker.
        match sources.entrypoint.text() {
            Some(content) if !self.route_decorator.is_match(content) => {
                vec![Finding::warning(format!(
                    "{} uses fastapi but declares no routes",
                    unit.entrypoint().unwrap_or("entrypoint")
                ))]
            }
            _ => Vec::new(),
        }
    }
}

pub struct NodeWebLibraryRule;

impl ValidationRule for NodeWebLibraryRule {
    fn name(&self) -> &'static str {
        "node-web-library"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::ManifestBased
    }

    fn check(&self, unit: &UnitDescriptor, sources: &UnitSources) -> Vec<Finding> {
        let manifest_file = manifest_name(unit, crate::stack::node::PACKAGE_JSON);
        let content = match require_text(&sources.manifest, &manifest_file) {
            Ok(content) => content,
            Err(finding) => return vec![finding],
        };

        let manifest = match PackageManifest::parse(content) {
            Ok(manifest) => manifest,
            Err(e) => {
                return vec![Finding::error(format!(
                    "{} is malformed: {:#}",
                    manifest_file, e
                ))]
            }
        };

        let libraries = NodeManifestEcosystem.web_libraries();
        if libraries.iter().any(|lib| manifest.depends_on(lib)) {
            Vec::new()
        } else {
            vec![Finding::error(format!(
                "{} does not depend on a supported web library ({})",
                manifest_file,
                describe_choices(libraries)
            ))]
        }
    }
}

pub struct NodeEntrypointRule;

impl ValidationRule for NodeEntrypointRule {
    fn name(&self) -> &'static str {
        "node-entrypoint"
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::ManifestBased
    }

    fn check(&self, unit: &UnitDescriptor, sources: &UnitSources) -> Vec<Finding> {
        let Some(entrypoint) = unit.entrypoint() else {
            return vec![Finding::error(format!(
                "no entrypoint resolved (expected {} or a \"main\" field)",
                describe_choices(NodeManifestEcosystem.entrypoint_candidates())
            ))];
        };

        match require_text(&sources.entrypoint, &format!("entrypoint {}", entrypoint)) {
            Ok(_) => Vec::new(),
            Err(finding) => vec![finding],
        }
    }
}
