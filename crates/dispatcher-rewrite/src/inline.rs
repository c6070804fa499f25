//! Inline expansion of includes and consolidation of fragment files.

use crate::Result;
use crate::include::IncludeSyntax;
use crate::indent::leading_whitespace;
use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::fragment::content;
use dispatcher_fs::{Fragment, NormalizedPath, io, tree};
use std::collections::HashSet;
use std::path::Path;

/// Provenance comment stamped above content copied from another file.
pub fn provenance_comment(path: &Path, marker: &str) -> String {
    let location = NormalizedPath::new(path);
    format!("# Content from file : '{}'\n", location.from_marker(marker))
}

/// Content of a fragment file captured for inlining or consolidation.
///
/// The first line is a provenance comment; blank lines of the source are
/// dropped and every line ends with a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedContent {
    source: String,
    lines: Vec<String>,
}

impl IncludedContent {
    /// Capture `path`, naming it from the `marker` path component onwards.
    pub fn read(path: &Path, marker: &str) -> Result<Self> {
        let text = io::read_text(path)?;
        let mut lines = vec![provenance_comment(path, marker)];
        lines.extend(
            text.split_inclusive('\n')
                .filter(|line| !line.trim().is_empty())
                .map(|line| format!("{}\n", content(line))),
        );
        tracing::debug!(path = %path.display(), lines = lines.len(), "Extracted content from file");
        Ok(Self {
            source: tree::file_name(path),
            lines,
        })
    }

    /// File name the content came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Replace every include of `target` with the captured content, indented
/// like the include line.
pub fn inline_include(
    fragment: &mut Fragment,
    syntax: IncludeSyntax,
    target: &str,
    content: &IncludedContent,
    step: &mut AuditStep,
) -> bool {
    let location = fragment.location().to_string();
    let mut out = Vec::with_capacity(fragment.len() + content.lines().len());
    let mut touched = false;

    for line in fragment.lines() {
        if !syntax.matches(line, target) {
            out.push(line.clone());
            continue;
        }
        let indent = leading_whitespace(line);
        out.extend(content.lines().iter().map(|inlined| format!("{indent}{inlined}")));
        touched = true;

        tracing::info!(line = line.trim(), file = %location, "Replaced include statement with file content");
        step.record(
            OperationKind::Replaced,
            &location,
            format!(
                "Replaced include statement '{}' with content of file '{target}'",
                line.trim()
            ),
        );
    }

    touched && fragment.set_lines(out)
}

/// Merge `files` into `destination`, in order, each preceded by its
/// provenance comment.
///
/// Inputs are read before the destination is written, so the destination
/// may itself be one of the inputs.
pub fn consolidate(
    files: &[impl AsRef<Path>],
    destination: &Path,
    marker: &str,
    step: &mut AuditStep,
) -> Result<()> {
    let mut merged = String::new();
    let mut names = Vec::new();
    for file in files {
        let captured = IncludedContent::read(file.as_ref(), marker)?;
        merged.extend(captured.lines().iter().map(String::as_str));
        names.push(captured.source().to_string());
    }
    io::write_text(destination, &merged)?;

    let target = tree::file_name(destination);
    tracing::info!(files = ?names, into = %target, "Consolidated files");
    step.record(
        OperationKind::Added,
        NormalizedPath::new(destination).to_string(),
        format!("Consolidated {} into {target}", names.join(", ")),
    );
    Ok(())
}

/// Merge variable definition files into `destination`.
///
/// A definition's name is the second whitespace-separated token of its
/// line (`Define NAME value`); the first definition of a name wins and
/// later ones are discarded. Returns the defined names in order.
pub fn consolidate_variables(
    files: &[impl AsRef<Path>],
    destination: &Path,
    marker: &str,
    step: &mut AuditStep,
) -> Result<Vec<String>> {
    let mut defined: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = String::new();

    for file in files {
        let captured = IncludedContent::read(file.as_ref(), marker)?;
        let mut contributed = String::new();
        for line in captured.lines() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            let Some(name) = line.split_whitespace().nth(1) else {
                tracing::debug!(line = line.trim(), "Skipping line without a variable name");
                continue;
            };
            if !seen.insert(name.to_string()) {
                tracing::info!(variable = name, file = captured.source(), "Dropped duplicate variable definition");
                continue;
            }
            defined.push(name.to_string());
            contributed.push_str(line);
        }
        if !contributed.is_empty() {
            merged.push_str(&captured.lines()[0]);
            merged.push_str(&contributed);
        }
    }
    io::write_text(destination, &merged)?;

    let target = tree::file_name(destination);
    tracing::info!(variables = defined.len(), into = %target, "Consolidated variable files");
    step.record(
        OperationKind::Added,
        NormalizedPath::new(destination).to_string(),
        format!("Consolidated {} variable definitions into {target}", defined.len()),
    );
    Ok(defined)
}
