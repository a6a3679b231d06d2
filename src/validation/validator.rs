use crate::fs::FileSystem;
use crate::unit::UnitDescriptor;
use crate::validation::rules::{
    FastApiRoutesRule, NodeEntrypointRule, NodeWebLibraryRule, PythonAppMarkerRule,
    PythonWebLibraryRule, ValidationRule,
};
use crate::validation::{Finding, UnitSources, ValidationResult};
use tracing::debug;

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// Runs every rule registered for the unit's ecosystem.
    ///
    /// Never fails: unreadable sources become error entries.
    pub fn validate(&self, unit: &UnitDescriptor, fs: &dyn FileSystem) -> ValidationResult {
        let sources = UnitSources::read(unit, fs);
        let mut result = ValidationResult::new();

        for rule in self.rules.iter().filter(|r| r.ecosystem() == unit.ecosystem()) {
            for finding in rule.check(unit, &sources) {
                result.push(Finding {
                    severity: finding.severity,
                    message: format!("[{}] {}", rule.name(), finding.message),
                });
            }
        }

        debug!(
            unit = %unit.name(),
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "Validated unit"
        );
        result
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(PythonWebLibraryRule),
                Box::new(PythonAppMarkerRule::new()),
                Box::new(FastApiRoutesRule::new()),
                Box::new(NodeWebLibraryRule),
                Box::new(NodeEntrypointRule),
            ],
        }
    }
}
