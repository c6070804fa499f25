//! Variable usage: scrubbing, removal, renaming and undefined references.

use crate::section::{SectionSyntax, body_mask};
use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::Fragment;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `${name}` references; the capture is everything up to the closing brace.
static VARIABLE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)").expect("Invalid variable reference regex")
});

/// Conditional block openers whose condition may name a variable.
const CONDITIONAL_PREFIX: &str = "<If";

/// Names of all `${name}` references in `text`.
pub fn variable_references(text: &str) -> impl Iterator<Item = &str> {
    VARIABLE_REF
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Comment out lines inside `header` sections that reference a variable.
pub fn scrub_variables_in_section(
    fragment: &mut Fragment,
    header: &str,
    comment_marker: &str,
    step: &mut AuditStep,
) -> bool {
    let location = fragment.location().to_string();
    let mask = body_mask(fragment.lines(), header, &SectionSyntax::Brace);
    let mut touched = false;

    let out: Vec<String> = fragment
        .lines()
        .iter()
        .zip(mask)
        .map(|(line, in_body)| {
            let stripped = line.trim();
            if !in_body || stripped.starts_with(comment_marker) || !VARIABLE_REF.is_match(stripped) {
                return line.clone();
            }
            touched = true;
            tracing::info!(line = stripped, section = header, file = %location, "Removed usage of variable");
            step.record(
                OperationKind::Removed,
                &location,
                format!("Removed usage of variable '{stripped}' in section '{header}'"),
            );
            format!("{comment_marker}{line}")
        })
        .collect();

    touched && fragment.set_lines(out)
}

fn conditional_tag(trimmed: &str) -> Option<&str> {
    if !trimmed.starts_with(CONDITIONAL_PREFIX) {
        return None;
    }
    trimmed[1..]
        .split(|c: char| c == '>' || c.is_whitespace())
        .next()
}

fn closing_tag(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix("</")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
}

/// Delete every use of variable `name` from the fragment.
///
/// A plain line mentioning the variable is deleted. A conditional block
/// (`<If ...>`, `<IfDefine ...>`, ...) whose opening line mentions it is
/// deleted up to its matching close, nested blocks included.
pub fn remove_variable(fragment: &mut Fragment, name: &str, step: &mut AuditStep) -> bool {
    let location = fragment.location().to_string();
    let mut open: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(fragment.len());
    let mut touched = false;

    for line in fragment.lines() {
        let trimmed = line.trim();

        if !open.is_empty() {
            if let Some(tag) = conditional_tag(trimmed) {
                open.push(tag.to_lowercase());
            } else if let Some(tag) = closing_tag(trimmed) {
                if open.last().is_some_and(|top| *top == tag.to_lowercase()) {
                    open.pop();
                }
                if open.is_empty() {
                    tracing::debug!(variable = name, file = %location, "Removed conditional block using variable");
                    step.record(
                        OperationKind::Removed,
                        &location,
                        format!("Removed 'if' condition which used variable '{name}'"),
                    );
                }
            }
            continue;
        }

        if !line.contains(name) {
            out.push(line.clone());
            continue;
        }
        touched = true;
        match conditional_tag(trimmed) {
            Some(tag) => {
                tracing::debug!(variable = name, file = %location, "Found variable in conditional block");
                open.push(tag.to_lowercase());
            }
            None => {
                tracing::info!(variable = name, file = %location, "Removed usage of variable");
                step.record(
                    OperationKind::Removed,
                    &location,
                    format!("Removed variable '{name}'"),
                );
            }
        }
    }

    if !open.is_empty() {
        tracing::warn!(variable = name, file = %location, "Conditional block not closed before end of file");
    }
    touched && fragment.set_lines(out)
}

/// Rename every occurrence of variable `old` to `new`.
pub fn rename_variable(fragment: &mut Fragment, old: &str, new: &str, step: &mut AuditStep) -> bool {
    let location = fragment.location().to_string();
    let mut touched = false;

    let out: Vec<String> = fragment
        .lines()
        .iter()
        .map(|line| {
            if !line.contains(old) {
                return line.clone();
            }
            touched = true;
            tracing::info!(old, new, file = %location, "Replaced variable");
            step.record(
                OperationKind::Replaced,
                &location,
                format!("Replaced variable '{old}' with new variable '{new}'"),
            );
            line.replace(old, new)
        })
        .collect();

    touched && fragment.set_lines(out)
}

/// A `${name}` reference to a variable nobody defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedVariable {
    /// `file:line`
    pub location: String,
    pub name: String,
}

/// References in non-comment lines to variables outside `defined`.
pub fn undefined_variables(
    fragment: &Fragment,
    defined: &HashSet<String>,
    comment_marker: &str,
) -> Vec<UndefinedVariable> {
    let mut found = Vec::new();
    for (idx, line) in fragment.lines().iter().enumerate() {
        let stripped = line.trim();
        if stripped.starts_with(comment_marker) {
            continue;
        }
        for name in variable_references(stripped) {
            if !defined.contains(name) {
                let location = fragment.line_location(idx);
                tracing::error!("Undefined variable usage found at : {location} : {name}");
                found.push(UndefinedVariable {
                    location,
                    name: name.to_string(),
                });
            }
        }
    }
    found
}
