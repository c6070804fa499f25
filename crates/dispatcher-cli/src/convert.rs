//! The conversion run: stage the tree, apply the rules, report

use crate::cli::Cli;
use crate::error::{CliError, Result};
use colored::Colorize;
use dispatcher_audit::{ConversionReport, OperationKind};
use dispatcher_core::rules::RemoveNonWhitelistedDirectives;
use dispatcher_core::{ConversionRule, Converter, ConverterConfig, SdkTemplates};
use dispatcher_fs::{NormalizedPath, tree};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the staged copy inside the target folder; provenance comments
/// are written relative to it.
const STAGED_DIR: &str = "src";

const REPORT_FILE: &str = "conversion-report.md";

pub fn run_convert(cli: &Cli) -> Result<()> {
    require_dir(&cli.cfg, "Configuration folder")?;
    require_dir(&cli.sdk_src, "Dispatcher SDK source folder")?;

    crate::logging::init(&cli.log_file, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => ConverterConfig::load(&NormalizedPath::new(path))?,
        None => ConverterConfig::default(),
    };

    let staged = stage(&cli.cfg, &cli.target)?;
    tracing::info!(source = %NormalizedPath::new(&cli.cfg), staged = %NormalizedPath::new(&staged), "Staged configuration");

    let report = Converter::new(config, &staged, SdkTemplates::new(&cli.sdk_src)).run()?;
    let report_path = cli.target.join(REPORT_FILE);
    report.write(&report_path)?;

    if cli.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    print_diagnostics(&report);
    print_summary(&report, &staged, &report_path, &cli.log_file);
    Ok(())
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::user(format!("{what} not found: {}", path.display())))
    }
}

/// Replace `target` with a fresh copy of `cfg` at `<target>/src`.
fn stage(cfg: &Path, target: &Path) -> Result<PathBuf> {
    if target.exists() {
        let cfg_real = dunce::canonicalize(cfg)?;
        let target_real = dunce::canonicalize(target)?;
        if cfg_real.starts_with(&target_real) || target_real.starts_with(&cfg_real) {
            return Err(CliError::user(format!(
                "Target folder {} overlaps the configuration folder {}",
                target.display(),
                cfg.display()
            )));
        }
        tracing::info!(target = %NormalizedPath::new(target), "Removing previous output");
        fs::remove_dir_all(target)?;
    }

    let staged = target.join(STAGED_DIR);
    tree::copy_tree(cfg, &staged)?;
    Ok(staged)
}

fn print_diagnostics(report: &ConversionReport) {
    let warnings: Vec<_> = report.steps.iter().flat_map(|step| step.warnings()).collect();
    if !warnings.is_empty() {
        println!("{}", "Warnings:".yellow().bold());
        for op in warnings {
            println!("   {} {} {}", "!".yellow(), op.location, op.action);
        }
        println!();
    }

    let whitelist_title = RemoveNonWhitelistedDirectives.title();
    let commented: Vec<_> = report
        .steps
        .iter()
        .filter(|step| step.rule == whitelist_title)
        .flat_map(|step| &step.operations)
        .filter(|op| op.kind == OperationKind::Removed)
        .collect();
    if !commented.is_empty() {
        println!("{}", "Non-whitelisted directives commented out:".yellow().bold());
        for op in commented {
            println!("   {} {}", "-".yellow(), op.location);
        }
        println!();
    }
}

fn print_summary(report: &ConversionReport, staged: &Path, report_path: &Path, log_file: &Path) {
    println!(
        "{} Conversion complete: {} of {} rules changed the configuration, {} operations.",
        "OK".green().bold(),
        report.performed().count(),
        report.steps.len(),
        report.operation_count()
    );
    println!("   Output: {}", NormalizedPath::new(staged).to_string().cyan());
    println!("   Report: {}", NormalizedPath::new(report_path).to_string().cyan());
    println!("   Log:    {}", NormalizedPath::new(log_file).to_string().cyan());
}
