//! Dispatcher converter CLI
//!
//! Converts a managed-services dispatcher configuration into the layout the
//! cloud dispatcher SDK expects, writing a Markdown report of every change.

mod cli;
mod convert;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    convert::run_convert(&cli)
}
