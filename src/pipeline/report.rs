use crate::build::BuildOutcome;
use crate::validation::ValidationResult;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one candidate during a build or install run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    /// Single-file candidate; reported by detection, never built
    Skipped,
    /// No ecosystem manifest or no usable entrypoint
    Unclassified,
    Invalid(ValidationResult),
    Completed(BuildOutcome),
}

impl UnitStatus {
    pub fn is_failure(&self) -> bool {
        match self {
            UnitStatus::Invalid(_) => true,
            UnitStatus::Completed(outcome) => !outcome.success,
            UnitStatus::Skipped | UnitStatus::Unclassified => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// 1-based position in scan order
    pub index: usize,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: UnitStatus,
}

impl ReportEntry {
    /// One-line summary, e.g. `[1] /srv/weather-mcp: ok (built image mcp_server_1)`
    pub fn status_line(&self) -> String {
        let detail = match &self.status {
            UnitStatus::Skipped => "skipped (single file, not buildable)".to_string(),
            UnitStatus::Unclassified => "skipped (no recognized ecosystem or entrypoint)".to_string(),
            UnitStatus::Invalid(result) => format!("invalid: {}", result.errors().join("; ")),
            UnitStatus::Completed(outcome) if outcome.success => {
                format!("ok ({})", single_line(&outcome.message))
            }
            UnitStatus::Completed(outcome) => format!("failed: {}", single_line(&outcome.message)),
        };
        format!("[{}] {}: {}", self.index, self.path.display(), detail)
    }
}

fn single_line(message: &str) -> String {
    message.lines().map(str::trim).collect::<Vec<_>>().join(" | ")
}

/// Per-unit results of one run, in scan order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize, path: impl Into<PathBuf>, status: UnitStatus) {
        self.entries.push(ReportEntry {
            index,
            path: path.into(),
            status,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(&e.status, UnitStatus::Completed(outcome) if outcome.success))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, UnitStatus::Skipped | UnitStatus::Unclassified))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} skipped",
            self.succeeded(),
            self.failed(),
            self.skipped()
        )
    }
}
