//! End-to-end behavior of the rewrite engine on realistic fragments

use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::Fragment;
use dispatcher_rewrite::batch::{rewrite_file, rewrite_tree};
use dispatcher_rewrite::include::{
    IncludeRewrite, IncludeSyntax, included_targets, replace_include_pattern_in_section,
    replace_includes_in_section,
};
use dispatcher_rewrite::inline::{consolidate, consolidate_variables};
use dispatcher_rewrite::prune::keep_port_80_virtual_hosts;
use dispatcher_rewrite::section::SectionSyntax;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_port_80_filter_end_to_end() {
    let temp = TempDir::new().unwrap();
    let vhost = temp.path().join("available_vhosts/site.vhost");
    write(
        &vhost,
        "<VirtualHost *:443>\nSomeDirective\n</VirtualHost>\n<VirtualHost *:80>\nKeep\n</VirtualHost>",
    );
    let mut step = AuditStep::new("port 80", "");

    let changed = rewrite_tree(&temp.path().join("available_vhosts"), "vhost", &mut step, |f, s| {
        keep_port_80_virtual_hosts(f, s)
    });

    assert_eq!(changed, 1);
    assert_eq!(
        fs::read_to_string(&vhost).unwrap(),
        "<VirtualHost *:80>\nKeep\n</VirtualHost>"
    );
}

#[test]
fn test_include_pattern_rewrite_in_bounded_section() {
    let mut fragment = Fragment::from_text(
        "publish.farm",
        "/publishfarm {\n  /x {\n    $include \"/etc/httpd/conf.dispatcher.d/x/ams_a.any\"\n    $include \"/etc/httpd/conf.dispatcher.d/x/ams_b.any\"\n  }\n  $include \"/etc/httpd/conf.dispatcher.d/x/ams_c.any\"\n}\n",
    );
    let mut step = AuditStep::new("x", "");

    replace_include_pattern_in_section(
        &mut fragment,
        "/x",
        "$include \"/etc/httpd/conf.dispatcher.d/x/ams_",
        "$include \"../x/default_x.any\"",
        &mut step,
    );

    assert_eq!(
        fragment.text(),
        "/publishfarm {\n  /x {\n    $include \"../x/default_x.any\"\n  }\n  $include \"/etc/httpd/conf.dispatcher.d/x/ams_c.any\"\n}\n"
    );
}

#[test]
fn test_include_pattern_rewrite_once_across_sections() {
    let mut fragment = Fragment::from_text(
        "publish.farm",
        "\
/publishfarm {
  /filter {
    $include \"/etc/httpd/conf.dispatcher.d/filters/ams_publish_filters.any\"
  }
  /filter {
    $include \"/etc/httpd/conf.dispatcher.d/filters/ams_common_filters.any\"
    $include \"/etc/httpd/conf.dispatcher.d/filters/ams_extra_filters.any\"
  }
}
",
    );
    let mut step = AuditStep::new("filters", "");

    let changed = replace_include_pattern_in_section(
        &mut fragment,
        "/filter",
        "$include \"/etc/httpd/conf.dispatcher.d/filters/ams",
        "$include \"../filters/default_filters.any\"",
        &mut step,
    );

    assert!(changed);
    assert_eq!(
        fragment.text(),
        "\
/publishfarm {
  /filter {
    $include \"../filters/default_filters.any\"
  }
  /filter {
  }
}
"
    );
    assert_eq!(step.count(OperationKind::Replaced), 1);
    let removed: Vec<_> = step
        .operations
        .iter()
        .filter(|op| op.kind == OperationKind::Removed)
        .map(|op| op.action.as_str())
        .collect();
    assert_eq!(
        removed,
        vec![
            "Removed include statement '$include \"/etc/httpd/conf.dispatcher.d/filters/ams_common_filters.any\"' in section '/filter'",
            "Removed include statement '$include \"/etc/httpd/conf.dispatcher.d/filters/ams_extra_filters.any\"' in section '/filter'",
        ]
    );
}

#[test]
fn test_rule_files_consolidate_into_one_include() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let cache = src.join("conf.dispatcher.d/cache");
    let farm_path = src.join("conf.dispatcher.d/available_farms/publish.farm");
    write(&cache.join("a_rules.any"), "/0001 { /glob \"*\" /type \"deny\" }\n");
    write(&cache.join("b_rules.any"), "\n/0002 { /glob \"*.html\" /type \"allow\" }\n");
    write(
        &farm_path,
        "/publishfarm {\n  /cache {\n    /rules {\n      $include \"../cache/a_rules.any\"\n      $include \"../cache/b_rules.any\"\n    }\n  }\n}\n",
    );
    let mut step = AuditStep::new("cache", "");

    let farm = Fragment::load(&farm_path).unwrap();
    let names = included_targets(&farm, IncludeSyntax::Farm, &["a_rules.any", "b_rules.any"]);
    assert_eq!(names, vec!["a_rules.any", "b_rules.any"]);

    let files: Vec<_> = names.iter().map(|name| cache.join(name)).collect();
    consolidate(&files, &cache.join("rules.any"), "src", &mut step).unwrap();

    rewrite_file(&farm_path, &mut step, |fragment, step| {
        replace_includes_in_section(
            fragment,
            IncludeSyntax::Farm,
            ("/rules", &SectionSyntax::Brace),
            &names,
            IncludeRewrite::ReplaceRule("\"../cache/rules.any\""),
            step,
        )
    })
    .unwrap();

    assert_eq!(
        fs::read_to_string(cache.join("rules.any")).unwrap(),
        "# Content from file : 'src/conf.dispatcher.d/cache/a_rules.any'\n\
         /0001 { /glob \"*\" /type \"deny\" }\n\
         # Content from file : 'src/conf.dispatcher.d/cache/b_rules.any'\n\
         /0002 { /glob \"*.html\" /type \"allow\" }\n"
    );
    assert_eq!(
        fs::read_to_string(&farm_path).unwrap(),
        "/publishfarm {\n  /cache {\n    /rules {\n      $include \"../cache/rules.any\"\n    }\n  }\n}\n"
    );
    assert_eq!(step.count(OperationKind::Replaced), 1);
    assert_eq!(step.count(OperationKind::Removed), 1);
}

#[test]
fn test_variable_consolidation_first_definition_wins() {
    let temp = TempDir::new().unwrap();
    let vars = temp.path().join("src/conf.d/variables");
    write(&vars.join("a.vars"), "Define HOST a.example.com\nDefine PORT 80\n");
    write(&vars.join("b.vars"), "# overrides\nDefine HOST b.example.com\nDefine EXTRA 1\n");
    let mut step = AuditStep::new("variables", "");

    let names = consolidate_variables(
        &[vars.join("a.vars"), vars.join("b.vars")],
        &vars.join("custom.vars"),
        "src",
        &mut step,
    )
    .unwrap();

    assert_eq!(names, vec!["HOST", "PORT", "EXTRA"]);
    let merged = fs::read_to_string(vars.join("custom.vars")).unwrap();
    assert_eq!(merged.matches("Define HOST").count(), 1);
    assert!(merged.contains("Define HOST a.example.com\n"));
    assert!(!merged.contains("b.example.com"));
    assert_eq!(
        merged,
        "# Content from file : 'src/conf.d/variables/a.vars'\n\
         Define HOST a.example.com\n\
         Define PORT 80\n\
         # Content from file : 'src/conf.d/variables/b.vars'\n\
         Define EXTRA 1\n"
    );
}

#[test]
fn test_tree_walk_survives_unreadable_file() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("conf.d");
    write(&dir.join("good.vhost"), "<VirtualHost *:443>\n</VirtualHost>\n");
    // Invalid UTF-8 cannot be loaded as text
    fs::write(dir.join("bad.vhost"), [0xff, 0xfe, 0x00]).unwrap();
    let mut step = AuditStep::new("port 80", "");

    let changed = rewrite_tree(&dir, "vhost", &mut step, |f, s| keep_port_80_virtual_hosts(f, s));

    assert_eq!(changed, 1);
    assert_eq!(fs::read_to_string(dir.join("good.vhost")).unwrap(), "");
}
