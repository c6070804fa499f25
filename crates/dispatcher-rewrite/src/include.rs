//! Include directive matching and rewriting.
//!
//! Two include syntaxes exist: `Include <path>` in Apache fragments and
//! `$include "<path>"` in dispatcher farm fragments. A line matches a target
//! when its trimmed text starts with the syntax token and contains the target
//! past the first two bytes.

use crate::indent::leading_whitespace;
use crate::section::{LinePlace, SectionCursor, SectionSyntax};
use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::Fragment;
use dispatcher_fs::fragment::terminator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeSyntax {
    /// `Include` in `.vhost` and other Apache files
    Vhost,
    /// `$include` in `.farm` and `.any` files
    Farm,
}

impl IncludeSyntax {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Vhost => "Include",
            Self::Farm => "$include",
        }
    }

    /// Syntax used by files with the given extension.
    pub fn for_extension(extension: &str) -> Option<Self> {
        match extension {
            "vhost" | "conf" | "rules" | "vars" => Some(Self::Vhost),
            "farm" | "any" => Some(Self::Farm),
            _ => None,
        }
    }

    /// Whether `line` is an include of something containing `target`.
    pub fn matches(&self, line: &str, target: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with(self.token()) && trimmed.find(target).is_some_and(|idx| idx > 1)
    }

    /// Parse an include directive.
    pub fn parse(&self, line: &str) -> Option<IncludeReference> {
        let rest = line.trim().strip_prefix(self.token())?;
        if !rest.starts_with([' ', '\t']) {
            return None;
        }
        let target = rest.trim().trim_matches('"');
        (!target.is_empty()).then(|| IncludeReference {
            syntax: *self,
            target: target.to_string(),
        })
    }
}

/// An include directive found in a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeReference {
    pub syntax: IncludeSyntax,
    /// The referenced path, quotes removed.
    pub target: String,
}

impl IncludeReference {
    /// File name part of the target.
    pub fn file_name(&self) -> &str {
        self.target.rsplit('/').next().unwrap_or(&self.target)
    }
}

/// What to do with a matching include line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeRewrite<'a> {
    /// Remove the line.
    Drop,
    /// Substitute the new name for the matched target inside the line.
    RenameTarget(&'a str),
    /// Keep the indentation and syntax token, replace the argument.
    ReplaceRule(&'a str),
}

/// Rewrite `line`, which matched `target`. `None` drops it.
fn apply(
    syntax: IncludeSyntax,
    line: &str,
    target: &str,
    rewrite: IncludeRewrite<'_>,
) -> Option<String> {
    match rewrite {
        IncludeRewrite::Drop => None,
        IncludeRewrite::RenameTarget(new_name) => Some(line.replace(target, new_name)),
        IncludeRewrite::ReplaceRule(rule) => Some(format!(
            "{}{} {}{}",
            leading_whitespace(line),
            syntax.token(),
            rule,
            terminator(line)
        )),
    }
}

fn record(
    step: &mut AuditStep,
    location: &str,
    original: &str,
    target: &str,
    rewritten: Option<&str>,
    rewrite: IncludeRewrite<'_>,
) {
    match (rewrite, rewritten) {
        (IncludeRewrite::RenameTarget(new_name), Some(_)) => step.record(
            OperationKind::Replaced,
            location,
            format!("Replacing include statement {target} with {new_name}"),
        ),
        (_, Some(line)) => step.record(
            OperationKind::Replaced,
            location,
            format!(
                "Replacing include statement rule {} with {}",
                original.trim(),
                line.trim()
            ),
        ),
        (_, None) => step.record(
            OperationKind::Removed,
            location,
            format!("Removing include statement {target}"),
        ),
    }
}

/// Apply `rewrite` to every include of `target` in the fragment.
///
/// Returns whether the fragment changed.
pub fn rewrite_includes(
    fragment: &mut Fragment,
    syntax: IncludeSyntax,
    target: &str,
    rewrite: IncludeRewrite<'_>,
    step: &mut AuditStep,
) -> bool {
    let location = fragment.location().to_string();
    let mut out = Vec::with_capacity(fragment.len());
    let mut touched = false;

    for line in fragment.lines() {
        if !syntax.matches(line, target) {
            out.push(line.clone());
            continue;
        }
        tracing::debug!(line = line.trim(), file = %location, "Found include statement");
        let rewritten = apply(syntax, line, target, rewrite);
        if rewritten.as_deref() == Some(line.as_str()) {
            out.push(line.clone());
            continue;
        }
        record(step, &location, line, target, rewritten.as_deref(), rewrite);
        tracing::info!(line = line.trim(), file = %location, "Rewrote include statement");
        touched = true;
        if let Some(rewritten) = rewritten {
            out.push(rewritten);
        }
    }

    touched && fragment.set_lines(out)
}

/// Replace the first include line starting with `pattern` inside a `header`
/// section by `replacement`, and drop every later one in the file.
///
/// Only one replacement is made per file, however many `header` sections
/// the file holds.
///
/// `replacement` is a whole directive, e.g. `$include "../filters/default_filters.any"`.
pub fn replace_include_pattern_in_section(
    fragment: &mut Fragment,
    header: &str,
    pattern: &str,
    replacement: &str,
    step: &mut AuditStep,
) -> bool {
    let location = fragment.location().to_string();
    let syntax = SectionSyntax::Brace;
    let mut cursor = SectionCursor::new(header, &syntax);
    let mut replaced = false;
    let mut out = Vec::with_capacity(fragment.len());
    let mut touched = false;

    for line in fragment.lines() {
        if cursor.classify(line) != LinePlace::Body || !line.trim().starts_with(pattern) {
            out.push(line.clone());
            continue;
        }

        let stripped = line.trim();
        if replaced {
            tracing::info!(line = stripped, section = header, file = %location, "Removed include statement");
            step.record(
                OperationKind::Removed,
                &location,
                format!("Removed include statement '{stripped}' in section '{header}'"),
            );
        } else {
            replaced = true;
            let new_line = format!("{}{}{}", leading_whitespace(line), replacement, terminator(line));
            tracing::info!(line = stripped, section = header, file = %location, "Replaced include statement");
            step.record(
                OperationKind::Replaced,
                &location,
                format!(
                    "Replaced include statement '{stripped}' in section '{header}' with '{replacement}'"
                ),
            );
            out.push(new_line);
        }
        touched = true;
    }

    touched && fragment.set_lines(out)
}

/// The candidate names the fragment includes, in candidate order.
pub fn included_targets<S: AsRef<str>>(
    fragment: &Fragment,
    syntax: IncludeSyntax,
    candidates: &[S],
) -> Vec<String> {
    candidates
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| fragment.lines().iter().any(|line| syntax.matches(line, name)))
        .map(str::to_string)
        .collect()
}

/// Collapse every include of any of `names` into a single rewritten include.
///
/// Only lines inside the `scope` section are considered; when the fragment
/// has no such section the whole file is. The first matching line is
/// rewritten with `rewrite`, later ones are dropped.
pub fn replace_includes_in_section<S: AsRef<str>>(
    fragment: &mut Fragment,
    syntax: IncludeSyntax,
    scope: (&str, &SectionSyntax),
    names: &[S],
    rewrite: IncludeRewrite<'_>,
    step: &mut AuditStep,
) -> bool {
    let (header, section_syntax) = scope;
    let location = fragment.location().to_string();
    let has_section = fragment
        .lines()
        .iter()
        .any(|line| line.trim().starts_with(header));
    if !has_section {
        tracing::debug!(section = header, file = %location, "Section absent, collapsing includes file-wide");
    }

    let mut cursor = SectionCursor::new(header, section_syntax);
    let mut done_in_scope = false;
    let mut out = Vec::with_capacity(fragment.len());
    let mut touched = false;

    for line in fragment.lines() {
        let place = cursor.classify(line);
        if place == LinePlace::Header {
            done_in_scope = false;
        }
        let in_scope = !has_section || place == LinePlace::Body;
        let matched = names
            .iter()
            .map(|name| name.as_ref())
            .find(|name| syntax.matches(line, name));
        let Some(target) = matched.filter(|_| in_scope) else {
            out.push(line.clone());
            continue;
        };

        let rewritten = if done_in_scope {
            None
        } else {
            done_in_scope = true;
            apply(syntax, line, target, rewrite)
        };
        if rewritten.as_deref() == Some(line.as_str()) {
            out.push(line.clone());
            continue;
        }
        let effective = if rewritten.is_some() { rewrite } else { IncludeRewrite::Drop };
        record(step, &location, line, target, rewritten.as_deref(), effective);
        touched = true;
        if let Some(rewritten) = rewritten {
            out.push(rewritten);
        }
    }

    touched && fragment.set_lines(out)
}

/// Drop repeated identical includes of `target` within the same block.
///
/// Renaming several includes to one file leaves duplicates behind; a block
/// open or close line starts a new block.
pub fn dedupe_includes(
    fragment: &mut Fragment,
    syntax: IncludeSyntax,
    target: &str,
    step: &mut AuditStep,
) -> bool {
    let location = fragment.location().to_string();
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(fragment.len());
    let mut touched = false;

    for line in fragment.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('<') || trimmed.ends_with('{') || trimmed == "}" {
            seen.clear();
        }
        if syntax.matches(line, target) {
            if seen.iter().any(|prev| prev == trimmed) {
                tracing::info!(line = trimmed, file = %location, "Removed duplicate include statement");
                step.record(
                    OperationKind::Removed,
                    &location,
                    format!("Removed duplicate include statement {trimmed}"),
                );
                touched = true;
                continue;
            }
            seen.push(trimmed.to_string());
        }
        out.push(line.clone());
    }

    touched && fragment.set_lines(out)
}
