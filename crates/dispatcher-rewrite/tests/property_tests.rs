use dispatcher_audit::AuditStep;
use dispatcher_fs::Fragment;
use dispatcher_rewrite::section::{SectionSyntax, locate_section};
use dispatcher_rewrite::whitelist::{Whitelist, enforce_whitelist};
use proptest::prelude::*;

const SAMPLE_LINES: &[&str] = &[
    "<VirtualHost *:80>",
    "</VirtualHost>",
    "<IfModule mod_headers.c>",
    "</IfModule>",
    "<Macro site>",
    "</Macro>",
    "<Location /admin>",
    "</Location>",
    "  ServerName example.com",
    "  RewriteRule ^/a$ /b [PT]",
    "LoadModule foo modules/foo.so",
    "SetEnv A \\",
    "RewriteCond %{HTTP_HOST} x \\",
    "# a comment",
    "",
    "\tUse macro",
];

fn whitelist() -> Whitelist {
    Whitelist::new([
        "<virtualhost>",
        "<ifmodule>",
        "<location>",
        "servername",
        "rewriterule",
        "rewritecond",
    ])
}

fn text_from(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| format!("{}\n", SAMPLE_LINES[i]))
        .collect()
}

fn well_formed_block() -> impl Strategy<Value = String> {
    let leaf = prop::sample::select(vec![
        "ServerName x\n".to_string(),
        "LoadModule y\n".to_string(),
        "# note\n".to_string(),
    ]);
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop::sample::select(vec!["IfModule", "Macro", "Location", "Proxy"]),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, body)| format!("<{tag} x>\n{}</{tag}>\n", body.concat()))
    })
}

proptest! {
    #[test]
    fn test_whitelist_enforcement_is_idempotent(
        indices in prop::collection::vec(0..SAMPLE_LINES.len(), 0..40)
    ) {
        let whitelist = whitelist();
        let mut fragment = Fragment::from_text("a.vhost", &text_from(&indices));
        let mut step = AuditStep::new("whitelist", "");

        enforce_whitelist(&mut fragment, &whitelist, "#", &mut step);
        let first_pass = fragment.text();
        let first_ops = step.operations.len();

        let outcome = enforce_whitelist(&mut fragment, &whitelist, "#", &mut step);

        prop_assert!(outcome.usages.is_empty());
        prop_assert_eq!(step.operations.len(), first_ops);
        prop_assert_eq!(fragment.text(), first_pass);
    }

    #[test]
    fn test_suppression_is_balanced(blocks in prop::collection::vec(well_formed_block(), 0..6)) {
        let mut fragment = Fragment::from_text("a.vhost", &blocks.concat());
        let mut step = AuditStep::new("whitelist", "");

        let outcome = enforce_whitelist(&mut fragment, &whitelist(), "#", &mut step);

        prop_assert_eq!(outcome.suppressed_blocks, outcome.resumed);
    }

    #[test]
    fn test_enforcement_never_deletes_lines(
        indices in prop::collection::vec(0..SAMPLE_LINES.len(), 0..40)
    ) {
        let text = text_from(&indices);
        let mut fragment = Fragment::from_text("a.vhost", &text);
        let before = fragment.len();

        enforce_whitelist(&mut fragment, &whitelist(), "#", &mut AuditStep::new("w", ""));

        prop_assert_eq!(fragment.len(), before);
    }

    #[test]
    fn test_section_closes_at_recorded_indent(width in 0usize..8, nested in 1usize..6) {
        let pad = " ".repeat(width);
        let mut lines = vec![format!("{pad}/rules {{")];
        for depth in 1..=nested {
            lines.push(format!("{}/rules {{", " ".repeat(width + 2 * depth)));
        }
        for depth in (1..=nested).rev() {
            lines.push(format!("{}}}", " ".repeat(width + 2 * depth)));
        }
        lines.push(format!("{pad}}}"));
        lines.push("/after 1".to_string());

        let span = locate_section(&lines, "/rules", &SectionSyntax::Brace).unwrap();

        prop_assert_eq!(span.close, Some(lines.len() - 2));
    }
}
