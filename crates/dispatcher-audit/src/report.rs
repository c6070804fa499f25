//! Conversion report
//!
//! Collects the audit steps of a run and renders them as Markdown. Only
//! steps that performed at least one operation show up in the report.

use crate::error::{Error, Result};
use crate::step::AuditStep;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const TITLE: &str = "# Dispatcher Converter Summary Report";

const TABLE_HEADER: &str = "| Action Type | Location | Action |\n| ----------- | -------- | ------ |";

/// Ordered list of steps produced by one conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// When the run started
    pub generated: DateTime<Utc>,
    /// Steps in execution order
    pub steps: Vec<AuditStep>,
}

impl Default for ConversionReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionReport {
    /// Create an empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            generated: Utc::now(),
            steps: Vec::new(),
        }
    }

    /// Append a finished step
    pub fn push(&mut self, step: AuditStep) {
        self.steps.push(step);
    }

    /// Steps that recorded at least one operation
    pub fn performed(&self) -> impl Iterator<Item = &AuditStep> {
        self.steps.iter().filter(|step| step.is_performed())
    }

    /// Total number of recorded operations across all steps
    pub fn operation_count(&self) -> usize {
        self.steps.iter().map(|step| step.operations.len()).sum()
    }

    /// Render the report as Markdown
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(TITLE);
        out.push_str("\n\n");
        let _ = writeln!(
            out,
            "Generated on {}.",
            self.generated.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for step in self.performed() {
            out.push('\n');
            let _ = writeln!(out, "##### {}", step.rule);
            out.push_str(&step.description);
            out.push_str("\n\n");
            out.push_str(TABLE_HEADER);
            out.push('\n');
            for op in &step.operations {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    op.kind,
                    escape_cell(&op.location),
                    escape_cell(&op.action)
                );
            }
        }

        out
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the Markdown report to `path`, creating parent folders
    pub fn write(&self, path: &Path) -> Result<()> {
        let write_err = |source| Error::ReportWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.render_markdown()).map_err(write_err)?;
        tracing::info!(path = %path.display(), "Wrote conversion report");
        Ok(())
    }
}

/// Pipes would break the Markdown table.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
