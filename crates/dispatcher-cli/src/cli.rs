//! CLI argument parsing using clap derive

use clap::Parser;
use std::path::PathBuf;

/// Convert a managed-services dispatcher configuration to the cloud layout
#[derive(Parser, Debug)]
#[command(name = "dispatcher-convert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source folder of the dispatcher SDK holding the default configuration files
    #[arg(long, value_name = "DIR", env = "DISPATCHER_SDK_SRC")]
    pub sdk_src: PathBuf,

    /// Dispatcher configuration folder to convert
    #[arg(long, value_name = "DIR")]
    pub cfg: PathBuf,

    /// Output folder; replaced on every run
    #[arg(long, value_name = "DIR", default_value = "./target")]
    pub target: PathBuf,

    /// Converter settings (TOML, JSON or YAML) merged over the defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where to write the log
    #[arg(long, value_name = "FILE", default_value = "./result.log")]
    pub log_file: PathBuf,

    /// Print the conversion report as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Log debug output, mirrored to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
