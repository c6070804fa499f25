//! Dropping whole sections

use crate::section::{SectionSyntax, locate_sections};
use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::Fragment;

/// Keep only the `header` sections whose header line satisfies `keep`;
/// the others are deleted from header to close inclusive.
pub fn retain_sections(
    fragment: &mut Fragment,
    header: &str,
    syntax: &SectionSyntax,
    keep: impl Fn(&str) -> bool,
    step: &mut AuditStep,
) -> bool {
    let location = fragment.location().to_string();
    let lines = fragment.lines();
    let mut remove = vec![false; lines.len()];

    for span in locate_sections(lines, header, syntax) {
        let header_line = lines[span.header].trim();
        if keep(header_line) {
            continue;
        }
        let end = span.close.map_or(lines.len(), |close| close + 1);
        remove[span.header..end].iter_mut().for_each(|d| *d = true);

        tracing::debug!(section = header_line, file = %location, "Removing section");
        step.record(
            OperationKind::Removed,
            &location,
            format!("Removed section '{header_line}'"),
        );
    }

    let out: Vec<String> = lines
        .iter()
        .zip(&remove)
        .filter(|(_, removed)| !**removed)
        .map(|(line, _)| line.clone())
        .collect();
    fragment.set_lines(out)
}

/// Whether a `<VirtualHost ...>` header lists an address on `port`.
pub fn listens_on_port(header_line: &str, port: u16) -> bool {
    let suffix = format!(":{port}");
    let addresses = header_line
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>');
    addresses
        .split_whitespace()
        .skip(1)
        .any(|address| address.ends_with(&suffix))
}

/// Remove `<VirtualHost>` sections that do not listen on port 80.
pub fn keep_port_80_virtual_hosts(fragment: &mut Fragment, step: &mut AuditStep) -> bool {
    retain_sections(
        fragment,
        "<VirtualHost",
        &SectionSyntax::tag("VirtualHost"),
        |header| listens_on_port(header, 80),
        step,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<VirtualHost *:80>", true)]
    #[case("<VirtualHost *:443>", false)]
    #[case("<VirtualHost *:8080>", false)]
    #[case("<VirtualHost 10.0.0.1:443 *:80>", true)]
    fn test_listens_on_port(#[case] header: &str, #[case] expected: bool) {
        assert_eq!(listens_on_port(header, 80), expected);
    }

    #[test]
    fn test_only_port_80_survives() {
        let mut fragment = Fragment::from_text(
            "a.vhost",
            "<VirtualHost *:443>\nSomeDirective\n</VirtualHost>\n<VirtualHost *:80>\nKeep\n</VirtualHost>",
        );
        let mut step = AuditStep::new("port80", "");
        assert!(keep_port_80_virtual_hosts(&mut fragment, &mut step));
        assert_eq!(fragment.text(), "<VirtualHost *:80>\nKeep\n</VirtualHost>");
        assert_eq!(step.count(OperationKind::Removed), 1);
    }
}
