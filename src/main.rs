use mcpforge::cli::commands::{CliArgs, Commands};
use mcpforge::cli::handlers::{handle_build, handle_create, handle_detect, handle_install};
use mcpforge::util::logging::{self, parse_level};
use mcpforge::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args),
        Commands::Build(build_args) => handle_build(build_args).await,
        Commands::Create(create_args) => handle_create(create_args),
        Commands::Install => handle_install().await,
    };

    process::exit(exit_code);
}

/// `--log-level` wins over `-v`/`-q`, which win over `MCPFORGE_LOG_LEVEL`
fn init_logging_from_args(args: &CliArgs) {
    let mut config = logging::config_from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    logging::init_logging(config);
}
