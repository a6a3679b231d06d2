pub mod orchestrator;
pub mod report;

pub use orchestrator::{Detection, Pipeline, PipelineOptions, DEFAULT_IMAGE_PREFIX, DEFAULT_PORT};
pub use report::{ReportEntry, RunReport, UnitStatus};
