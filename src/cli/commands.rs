use crate::scaffold::{ConfigFormat, Framework};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Discover, validate, containerize and scaffold MCP server units
#[derive(Parser, Debug)]
#[command(
    name = "mcpforge",
    about = "Discover, validate, containerize and scaffold MCP server units",
    version,
    author,
    long_about = "mcpforge walks a directory tree looking for MCP server units (Python web \
                  apps declared by requirements.txt, Node packages declared by package.json), \
                  validates each one, writes a Dockerfile next to it and runs the external \
                  install and image build tools. It can also scaffold a new, already-valid unit."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "List candidate units under a directory",
        long_about = "Scans a directory tree and prints every candidate unit, index-prefixed.\n\n\
                      Examples:\n  \
                      mcpforge detect\n  \
                      mcpforge detect ./servers\n  \
                      mcpforge detect ./servers --format json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Validate, containerize and build every unit under a directory",
        long_about = "Runs the full pipeline for each discovered unit in scan order: validation, \
                      Dockerfile generation, dependency installation and image build. Images are \
                      tagged <prefix>_<index>.\n\n\
                      Examples:\n  \
                      mcpforge build\n  \
                      mcpforge build ./servers --image-prefix acme\n  \
                      mcpforge build ./servers --entrypoint app.py"
    )]
    Build(BuildArgs),

    #[command(
        about = "Scaffold a new unit",
        long_about = "Creates <NAME>/ with requirements.txt, a config file, server.py, context/, \
                      tests/ and a Dockerfile. Fails without writing anything if <NAME> exists.\n\n\
                      Examples:\n  \
                      mcpforge create demo\n  \
                      mcpforge create demo -f fastapi -p 9090 -c json"
    )]
    Create(CreateArgs),

    #[command(about = "Install dependencies for every unit under the current directory")]
    Install,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        default_value = ".",
        help = "Directory to scan"
    )]
    pub path: PathBuf,

    #[arg(long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        value_name = "PATH",
        default_value = ".",
        help = "Directory to scan"
    )]
    pub path: PathBuf,

    #[arg(
        long,
        value_name = "FILE",
        help = "Entrypoint file name to use instead of the conventional ones"
    )]
    pub entrypoint: Option<String>,

    #[arg(
        long,
        value_name = "PREFIX",
        help = "Image tag prefix (default: MCPFORGE_IMAGE_PREFIX or mcp_server)"
    )]
    pub image_prefix: Option<String>,

    #[arg(long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    #[arg(value_name = "NAME", help = "Name of the new unit directory")]
    pub name: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "flask",
        help = "Web framework"
    )]
    pub framework: Framework,

    #[arg(short = 'p', long, default_value = "8000", help = "Port the server listens on")]
    pub port: u16,

    #[arg(
        short = 'c',
        long = "config-format",
        value_enum,
        default_value = "yaml",
        help = "Configuration file format"
    )]
    pub config_format: ConfigFormat,

    #[arg(
        long = "dir",
        value_name = "PARENT",
        default_value = ".",
        help = "Directory to create the unit in"
    )]
    pub parent: PathBuf,

    #[arg(long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
