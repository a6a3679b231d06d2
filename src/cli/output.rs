//! Output formatting for command results
//!
//! Results go to stdout; logs go to stderr. Human output is line-oriented so
//! it stays greppable, JSON output serializes the same records.

use crate::discovery::CandidateKind;
use crate::pipeline::{Detection, RunReport};
use crate::scaffold::ScaffoldedUnit;
use anyhow::{Context, Result};
use std::fmt::Write;

/// Printed by `detect` when nothing was found
pub const NO_UNITS_MESSAGE: &str = "No MCP servers found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_detections(&self, detections: &[Detection]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(detections)
                .context("Failed to serialize detection results to JSON"),
            OutputFormat::Human => Ok(self.format_detections_human(detections)),
        }
    }

    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")
            }
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_scaffold(&self, scaffolded: &ScaffoldedUnit) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "path": scaffolded.path,
                "unit": scaffolded.unit,
                "descriptor_digest": scaffolded.descriptor.digest(),
            }))
            .context("Failed to serialize scaffold result to JSON"),
            OutputFormat::Human => {
                let mut output = String::new();
                let _ = writeln!(output, "Created {}", scaffolded.path.display());
                let _ = writeln!(
                    output,
                    "  entrypoint: {}",
                    scaffolded.unit.entrypoint().unwrap_or("-")
                );
                if let Some(config) = scaffolded.unit.config_file() {
                    let _ = writeln!(output, "  config:     {}", config);
                }
                let _ = write!(output, "  image:      Dockerfile ({})", scaffolded.descriptor.digest());
                Ok(output)
            }
        }
    }

    fn format_detections_human(&self, detections: &[Detection]) -> String {
        if detections.is_empty() {
            return NO_UNITS_MESSAGE.to_string();
        }

        detections
            .iter()
            .map(|detection| {
                let suffix = match detection.candidate.kind {
                    CandidateKind::File => " (single file, not buildable)",
                    CandidateKind::Directory => "",
                };
                format!(
                    "[{}] {}{}",
                    detection.index,
                    detection.candidate.path.display(),
                    suffix
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_report_human(&self, report: &RunReport) -> String {
        if report.entries().is_empty() {
            return NO_UNITS_MESSAGE.to_string();
        }

        let mut lines: Vec<String> = report.entries().iter().map(|e| e.status_line()).collect();
        lines.push(report.summary());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::CandidateLocation;
    use crate::pipeline::UnitStatus;
    use std::collections::BTreeSet;

    fn detections() -> Vec<Detection> {
        vec![
            Detection {
                index: 1,
                candidate: CandidateLocation::directory("/srv/weather-mcp", BTreeSet::new()),
                unit: None,
            },
            Detection {
                index: 2,
                candidate: CandidateLocation::file("/srv/tools/search_mcp.py"),
                unit: None,
            },
        ]
    }

    #[test]
    fn test_human_detections() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_detections(&detections())
            .unwrap();
        assert_eq!(
            output,
            "[1] /srv/weather-mcp\n[2] /srv/tools/search_mcp.py (single file, not buildable)"
        );
    }

    #[test]
    fn test_human_no_detections() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_detections(&[])
            .unwrap();
        assert_eq!(output, NO_UNITS_MESSAGE);
    }

    #[test]
    fn test_json_detections() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_detections(&detections())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["index"], 1);
        assert_eq!(value[0]["kind"], "directory");
        assert_eq!(value[1]["kind"], "file");
        assert_eq!(value[1]["path"], "/srv/tools/search_mcp.py");
    }

    #[test]
    fn test_json_report() {
        let mut report = RunReport::new();
        report.push(1, "/srv/tools/search_mcp.py", UnitStatus::Skipped);
        report.push(2, "/srv/empty", UnitStatus::Unclassified);
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_report(&report)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["entries"][0]["index"], 1);
        assert_eq!(value["entries"][0]["status"], "skipped");
        assert_eq!(value["entries"][1]["status"], "unclassified");
    }

    #[test]
    fn test_human_report_ends_with_summary() {
        let mut report = RunReport::new();
        report.push(1, "/srv/tools/search_mcp.py", UnitStatus::Skipped);
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report)
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "0 succeeded, 0 failed, 1 skipped");
    }
}
