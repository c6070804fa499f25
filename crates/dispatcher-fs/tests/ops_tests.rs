//! Audited file operations

use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::ops;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn step() -> AuditStep {
    AuditStep::new("test", "test step")
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "x\n").unwrap();
}

#[test]
fn test_missing_paths_are_noops() {
    let temp = TempDir::new().unwrap();
    let mut step = step();

    assert!(!ops::delete_file(&temp.path().join("nope.any"), &mut step));
    assert!(!ops::delete_folder(&temp.path().join("nope"), &mut step));
    assert!(!ops::rename_file(
        &temp.path().join("a.any"),
        &temp.path().join("b.any"),
        &mut step
    ));
    ops::delete_files_with_extension(&temp.path().join("nope"), "conf", &mut step);

    assert!(!step.is_performed());
}

#[test]
fn test_delete_file_records_operation() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("conf.d/old.conf");
    touch(&file);
    let mut step = step();

    assert!(ops::delete_file(&file, &mut step));

    assert!(!file.exists());
    assert_eq!(step.count(OperationKind::Deleted), 1);
    assert!(step.operations[0].action.contains("old.conf"));
}

#[test]
fn test_delete_files_with_extension_is_not_recursive() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("httpd.conf"));
    touch(&temp.path().join("nested/deep.conf"));
    touch(&temp.path().join("keep.vhost"));
    let mut step = step();

    ops::delete_files_with_extension(temp.path(), "conf", &mut step);

    assert!(!temp.path().join("httpd.conf").exists());
    assert!(temp.path().join("nested/deep.conf").exists());
    assert!(temp.path().join("keep.vhost").exists());
    assert_eq!(step.operations.len(), 1);
}

#[test]
fn test_delete_files_containing_keyword() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("aem_author.vhost"));
    touch(&temp.path().join("aem_publish.vhost"));
    touch(&temp.path().join("aem_flush.vhost"));
    let mut step = step();

    ops::delete_files_containing(temp.path(), "author", &mut step);
    ops::delete_files_containing(temp.path(), "flush", &mut step);

    assert!(!temp.path().join("aem_author.vhost").exists());
    assert!(!temp.path().join("aem_flush.vhost").exists());
    assert!(temp.path().join("aem_publish.vhost").exists());
}

#[test]
fn test_delete_files_not_matching_returns_matches() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("a.vars"));
    touch(&temp.path().join("b.txt"));
    touch(&temp.path().join("sub/c.vars"));
    let mut step = step();

    let kept = ops::delete_files_not_matching(temp.path(), "vars", &mut step);

    assert_eq!(kept, vec![temp.path().join("a.vars"), temp.path().join("sub/c.vars")]);
    assert!(!temp.path().join("b.txt").exists());
}

#[test]
fn test_remove_unmatched_by_name() {
    let temp = TempDir::new().unwrap();
    let enabled = temp.path().join("enabled_vhosts");
    let available = temp.path().join("available_vhosts");
    touch(&enabled.join("publish.vhost"));
    touch(&available.join("publish.vhost"));
    touch(&available.join("unused.vhost"));
    let mut step = step();

    ops::remove_unmatched_by_name(&enabled, &available, &mut step);

    assert!(available.join("publish.vhost").exists());
    assert!(!available.join("unused.vhost").exists());
}

#[test]
fn test_remove_unmatched_requires_both_folders() {
    let temp = TempDir::new().unwrap();
    let available = temp.path().join("available_vhosts");
    touch(&available.join("publish.vhost"));
    let mut step = step();

    ops::remove_unmatched_by_name(&temp.path().join("enabled_vhosts"), &available, &mut step);

    assert!(available.join("publish.vhost").exists());
}

#[test]
fn test_rename_folder_and_copy_into() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("vhosts/a.any"));
    touch(&temp.path().join("sdk/default_virtualhosts.any"));
    let mut step = step();

    assert!(ops::rename_folder(
        &temp.path().join("vhosts"),
        &temp.path().join("virtualhosts"),
        &mut step
    ));
    let copied = ops::copy_file_into(
        &temp.path().join("sdk/default_virtualhosts.any"),
        &temp.path().join("virtualhosts"),
        &mut step,
    );

    assert_eq!(copied, Some(temp.path().join("virtualhosts/default_virtualhosts.any")));
    assert!(temp.path().join("virtualhosts/a.any").exists());
    assert_eq!(step.count(OperationKind::Renamed), 1);
    assert_eq!(step.count(OperationKind::Added), 1);
}

#[test]
fn test_retarget_placeholder_link() {
    let temp = TempDir::new().unwrap();
    let link = temp.path().join("enabled_farms/publish.farm");
    fs::create_dir_all(link.parent().unwrap()).unwrap();
    fs::write(&link, "../available_farms/publish_farm.any").unwrap();
    let mut step = step();

    let changed = ops::retarget_link(
        &link,
        |name| name.replace("_farm", "").replace(".any", ".farm"),
        &mut step,
    );

    assert!(changed);
    assert_eq!(fs::read_to_string(&link).unwrap(), "../available_farms/publish.farm");
    assert_eq!(step.count(OperationKind::Renamed), 1);
}

#[cfg(unix)]
#[test]
fn test_retarget_real_symlink() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("available_farms/publish.farm"));
    let link = temp.path().join("enabled_farms/publish.farm");
    fs::create_dir_all(link.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink("../available_farms/publish_farm.any", &link).unwrap();
    let mut step = step();

    assert!(ops::retarget_link(
        &link,
        |name| name.replace("_farm", "").replace(".any", ".farm"),
        &mut step,
    ));

    assert_eq!(
        fs::read_link(&link).unwrap(),
        Path::new("../available_farms/publish.farm")
    );
    assert!(link.exists());
}
