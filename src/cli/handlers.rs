use super::commands::{BuildArgs, CreateArgs, DetectArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::build::ProcessRunner;
use crate::config::{validate_image_prefix, McpforgeConfig};
use crate::fs::RealFileSystem;
use crate::pipeline::{Pipeline, RunReport};
use crate::scaffold::{ScaffoldRequest, Scaffolder};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

fn load_config() -> Option<McpforgeConfig> {
    let config = match McpforgeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return None;
        }
    };
    if let Err(e) = config.validate() {
        error!("{}", e);
        return None;
    }
    debug!("Configuration loaded:\n{}", config);
    Some(config)
}

fn pipeline(config: &McpforgeConfig, entrypoint: Option<String>) -> Pipeline {
    Pipeline::new(
        Arc::new(RealFileSystem::new()),
        Arc::new(ProcessRunner::new()),
        config.pipeline_options(entrypoint),
    )
}

fn print_report(report: &RunReport, format: OutputFormat) -> i32 {
    match OutputFormatter::new(format).format_report(report) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    }
    if report.has_failures() {
        1
    } else {
        0
    }
}

pub fn handle_detect(args: &DetectArgs) -> i32 {
    let Some(config) = load_config() else {
        return 1;
    };

    let detections = match pipeline(&config, None).detect(&args.path) {
        Ok(detections) => detections,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    match OutputFormatter::new(args.format.into()).format_detections(&detections) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

pub async fn handle_build(args: &BuildArgs) -> i32 {
    let Some(mut config) = load_config() else {
        return 1;
    };
    if let Some(prefix) = &args.image_prefix {
        if let Err(e) = validate_image_prefix(prefix) {
            error!("{}", e);
            return 1;
        }
        config.image_prefix = prefix.clone();
    }

    info!(path = %args.path.display(), prefix = %config.image_prefix, "Building units");
    match pipeline(&config, args.entrypoint.clone()).build(&args.path).await {
        Ok(report) => print_report(&report, args.format.into()),
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

pub async fn handle_install() -> i32 {
    let Some(config) = load_config() else {
        return 1;
    };

    info!("Installing dependencies for units under the current directory");
    match pipeline(&config, None).install(Path::new(".")).await {
        Ok(report) => print_report(&report, OutputFormat::Human),
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

pub fn handle_create(args: &CreateArgs) -> i32 {
    if args.port == 0 {
        error!("Port must be between 1 and 65535");
        return 1;
    }

    let request = ScaffoldRequest {
        name: args.name.clone(),
        framework: args.framework,
        port: args.port,
        config_format: args.config_format,
    };

    let scaffolded = match Scaffolder::new().scaffold(&args.parent, &request) {
        Ok(scaffolded) => scaffolded,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    match OutputFormatter::new(args.format.into()).format_scaffold(&scaffolded) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}
