//! Directive whitelist enforcement.
//!
//! Walks a fragment with a stack of open block directives. Outside any
//! disallowed block, each directive is checked against the whitelist and
//! commented out when missing from it. A disallowed block opener pushes onto
//! the stack and everything up to its matching close is commented out.
//! Content is commented, never deleted, so a second pass finds nothing new.

use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::Fragment;
use std::collections::HashSet;
use std::fmt;

/// Case-insensitive set of allowed directives.
///
/// Block directives are spelled with angle brackets (`<ifmodule>`), simple
/// directives by name (`rewriterule`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    allowed: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: directives
                .into_iter()
                .map(|directive| directive.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn allows(&self, directive: &str) -> bool {
        self.allowed.contains(&directive.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

/// A directive judged disallowed, with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisallowedUsage {
    /// `file:line`
    pub location: String,
    /// The directive as spelled in the file, e.g. `<Macro>` or `LoadModule`.
    pub directive: String,
}

impl fmt::Display for DisallowedUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.location, self.directive)
    }
}

/// Result of one enforcement pass over a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhitelistOutcome {
    pub usages: Vec<DisallowedUsage>,
    /// Times a disallowed block started suppression.
    pub suppressed_blocks: usize,
    /// Times the stack emptied again.
    pub resumed: usize,
}

enum Line<'a> {
    Close(&'a str),
    Open(&'a str),
    Simple(&'a str),
}

fn classify(trimmed: &str) -> Line<'_> {
    if let Some(rest) = trimmed.strip_prefix("</") {
        let name = rest.split(|c: char| c == '>' || c.is_whitespace()).next().unwrap_or("");
        Line::Close(name)
    } else if let Some(rest) = trimmed.strip_prefix('<') {
        let name = rest.split(|c: char| c == '>' || c.is_whitespace()).next().unwrap_or("");
        Line::Open(name)
    } else {
        Line::Simple(trimmed.split_whitespace().next().unwrap_or(""))
    }
}

fn block_key(name: &str) -> String {
    format!("<{}>", name.to_lowercase())
}

fn ends_with_continuation(line: &str) -> bool {
    line.trim_end().ends_with('\\')
}

/// Comment out every directive of `fragment` the whitelist does not allow.
pub fn enforce_whitelist(
    fragment: &mut Fragment,
    whitelist: &Whitelist,
    comment_marker: &str,
    step: &mut AuditStep,
) -> WhitelistOutcome {
    let mut outcome = WhitelistOutcome::default();
    let mut stack: Vec<String> = Vec::new();
    // Some(commented) while the previous physical line continues onto this one
    let mut continuation: Option<bool> = None;
    let mut out = Vec::with_capacity(fragment.len());

    for (idx, line) in fragment.lines().iter().enumerate() {
        let trimmed = line.trim();
        let commented = |line: &str| format!("{comment_marker}{line}");

        if let Some(was_commented) = continuation {
            out.push(if was_commented { commented(line) } else { line.clone() });
            continuation = ends_with_continuation(line).then_some(was_commented);
            continue;
        }

        if !stack.is_empty() {
            out.push(commented(line));
            match classify(trimmed) {
                Line::Close(_) => {
                    stack.pop();
                    if stack.is_empty() {
                        outcome.resumed += 1;
                    }
                }
                Line::Open(name) if !name.is_empty() => stack.push(block_key(name)),
                _ => {}
            }
            continue;
        }

        if trimmed.is_empty() || trimmed.starts_with(comment_marker) {
            out.push(line.clone());
            continue;
        }

        let disallowed = match classify(trimmed) {
            Line::Close(name) => {
                let allowed = whitelist.allows(&block_key(name));
                if !allowed {
                    tracing::warn!(location = %fragment.line_location(idx), "Closing tag of a disallowed block outside that block");
                }
                (!allowed).then(|| format!("<{name}>"))
            }
            Line::Open(name) => {
                let allowed = whitelist.allows(&block_key(name));
                if !allowed {
                    stack.push(block_key(name));
                    outcome.suppressed_blocks += 1;
                }
                (!allowed).then(|| format!("<{name}>"))
            }
            Line::Simple(name) => (!whitelist.allows(name)).then(|| name.to_string()),
        };

        match disallowed {
            Some(directive) => {
                let usage = DisallowedUsage {
                    location: fragment.line_location(idx),
                    directive,
                };
                tracing::info!(usage = %usage, "Commenting non-whitelisted directive usage");
                out.push(commented(line));
                outcome.usages.push(usage);
                if stack.is_empty() && ends_with_continuation(line) {
                    continuation = Some(true);
                }
            }
            None => {
                out.push(line.clone());
                if ends_with_continuation(line) {
                    continuation = Some(false);
                }
            }
        }
    }

    if !stack.is_empty() {
        tracing::warn!(
            file = %fragment.location(),
            open = ?stack,
            "Disallowed block not closed before end of file"
        );
    }

    for usage in &outcome.usages {
        tracing::error!("{usage}");
        step.record(
            OperationKind::Removed,
            usage.to_string(),
            "Commented out usage of non-whitelisted directives",
        );
    }
    fragment.set_lines(out);
    outcome
}
