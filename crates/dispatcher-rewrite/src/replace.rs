//! Replacing a whole section body with a single line

use crate::indent::{deeper, leading_whitespace};
use crate::section::{SectionSyntax, locate_sections};
use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::Fragment;

/// Replace the body of every `header` section with `replacement`.
///
/// Header, adopted opener and close lines are kept. The replacement line is
/// indented like the first original body line, or one level deeper than the
/// close line when the body was empty. Sections that are not closed before
/// the end of the file are left alone.
pub fn replace_section_body(
    fragment: &mut Fragment,
    header: &str,
    replacement: &str,
    step: &mut AuditStep,
) -> bool {
    let location = fragment.location().to_string();
    let spans = locate_sections(fragment.lines(), header, &SectionSyntax::Brace);
    if spans.is_empty() {
        return false;
    }

    let newline = fragment.newline();
    let lines = fragment.lines();
    let mut out = Vec::with_capacity(lines.len());
    let mut next = 0;

    for span in &spans {
        let Some(close) = span.close else {
            tracing::warn!(section = header, file = %location, "Section not closed, body left unchanged");
            continue;
        };
        let body = span.body(lines.len());
        let indent = match lines[body.clone()].first() {
            Some(first) => leading_whitespace(first).to_string(),
            None => deeper(leading_whitespace(&lines[close])),
        };
        let new_line = format!("{indent}{replacement}{newline}");
        if lines[body.clone()] == [new_line.clone()] {
            continue;
        }

        out.extend_from_slice(&lines[next..body.start]);
        out.push(new_line);
        next = close;

        tracing::info!(section = header, replacement, file = %location, "Replaced section content");
        step.record(
            OperationKind::Replaced,
            &location,
            format!("Replaced content of section '{header}' with include statement {replacement}"),
        );
    }
    out.extend_from_slice(&lines[next..]);

    fragment.set_lines(out)
}
