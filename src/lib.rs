//! mcpforge - discovery and build pipeline for MCP server units
//!
//! A unit is an independently deployable MCP server directory: a Python web
//! app declared by `requirements.txt` or a Node package declared by
//! `package.json`. The pipeline finds units under a root, classifies and
//! validates them, writes a Dockerfile for each and drives the external
//! install and image build tools. New units can be scaffolded from templates.
//!
//! # Example Usage
//!
//! ```no_run
//! use mcpforge::{Pipeline, PipelineOptions, ProcessRunner, RealFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(
//!     Arc::new(RealFileSystem::new()),
//!     Arc::new(ProcessRunner::new()),
//!     PipelineOptions::default(),
//! );
//!
//! for detection in pipeline.detect(Path::new("./servers"))? {
//!     println!("[{}] {}", detection.index, detection.candidate.path.display());
//! }
//!
//! let report = pipeline.build(Path::new("./servers")).await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`discovery`]: directory walk producing candidate locations
//! - [`stack`]: ecosystem definitions and their registry
//! - [`unit`]: classification and entrypoint resolution
//! - [`validation`]: per-ecosystem rule table
//! - [`image`]: Dockerfile synthesis
//! - [`build`]: external command execution
//! - [`pipeline`]: end-to-end orchestration and reports
//! - [`scaffold`]: new-unit templates

pub mod build;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod fs;
pub mod image;
pub mod pipeline;
pub mod scaffold;
pub mod stack;
pub mod unit;
pub mod util;
pub mod validation;

pub use build::{BuildInvoker, BuildOutcome, CommandRunner, MockCommandRunner, ProcessRunner};
pub use config::{ConfigError, McpforgeConfig};
pub use discovery::{CandidateKind, CandidateLocation, ScanError, UnitScanner};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use image::{ImageDescriptor, Synthesizer};
pub use pipeline::{Detection, Pipeline, PipelineOptions, RunReport, UnitStatus};
pub use scaffold::{ConfigFormat, Framework, ScaffoldError, ScaffoldRequest, Scaffolder};
pub use stack::{Ecosystem, EcosystemRegistry};
pub use unit::{Classifier, UnitDescriptor};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use validation::{ValidationResult, Validator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
