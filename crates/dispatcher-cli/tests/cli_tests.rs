//! End-to-end tests that run the compiled `dispatcher-convert` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A temp workspace with an SDK tree and a small configuration to convert.
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let ws = Self { temp };

        ws.write_sdk("conf.d/variables/global.vars", "Define DOCROOT /mnt/var/www/html\n");
        ws.write_sdk("conf.dispatcher.d/renders/default_renders.any", "/0001 { }\n");
        ws.write_sdk("conf.dispatcher.d/cache/default_rules.any", "/0000 { }\n");
        ws.write_sdk("conf.dispatcher.d/cache/rules.any", "$include \"./default_rules.any\"\n");
        ws.write_sdk("conf.dispatcher.d/cache/default_invalidate.any", "/0000 { }\n");

        ws.write_cfg("conf/httpd.conf", "ServerRoot /etc/httpd\n");
        ws.write_cfg(
            "conf.d/available_vhosts/publish.vhost",
            "<VirtualHost *:80>\n  ServerName publish\n  DocumentRoot ${PUBLISH_DOCROOT}\n  ServerAlias ${UNKNOWN}\n  LoadModule x y\n</VirtualHost>\n",
        );
        ws.write_cfg(
            "conf.d/enabled_vhosts/publish.vhost",
            "../available_vhosts/publish.vhost",
        );
        ws.write_cfg(
            "conf.dispatcher.d/available_farms/publish_farm.any",
            "/publish {\n  /renders {\n    /0001 { /hostname \"x\" }\n  }\n}\n",
        );
        ws.write_cfg(
            "conf.dispatcher.d/enabled_farms/publish_farm.any",
            "../available_farms/publish_farm.any",
        );
        ws
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    fn write_sdk(&self, relative: &str, content: &str) {
        write(&self.path("sdk/src").join(relative), content);
    }

    fn write_cfg(&self, relative: &str, content: &str) {
        write(&self.path("dispatcher").join(relative), content);
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("dispatcher-convert").unwrap();
        cmd.env_remove("RUST_LOG")
            .arg("--sdk-src")
            .arg(self.path("sdk/src"))
            .arg("--cfg")
            .arg(self.path("dispatcher"))
            .arg("--target")
            .arg(self.path("target"))
            .arg("--log-file")
            .arg(self.path("logs/result.log"));
        cmd
    }
}

#[test]
fn test_help_lists_options() {
    Command::cargo_bin("dispatcher-convert")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--sdk-src"))
        .stdout(predicate::str::contains("--cfg"))
        .stdout(predicate::str::contains("--target"));
}

#[test]
fn test_conversion_writes_output_report_and_log() {
    let ws = Workspace::new();

    ws.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversion complete"))
        .stdout(predicate::str::contains("conversion-report.md"))
        .stdout(predicate::str::contains("Undefined variable 'UNKNOWN'"))
        .stdout(predicate::str::contains("LoadModule"));

    let staged = ws.path("target/src");
    assert!(!staged.join("conf").exists());
    assert!(staged.join("conf.dispatcher.d/available_farms/publish.farm").is_file());
    assert_eq!(
        fs::read_to_string(staged.join("conf.dispatcher.d/available_farms/publish.farm")).unwrap(),
        "/publish {\n  /renders {\n    $include \"../renders/default_renders.any\"\n  }\n}\n"
    );

    // The source configuration is never touched
    assert!(ws.path("dispatcher/conf/httpd.conf").is_file());

    let report = fs::read_to_string(ws.path("target/conversion-report.md")).unwrap();
    assert!(report.starts_with("# Dispatcher Converter Summary Report"));
    assert!(report.contains("##### Rename farm files"));

    let log = fs::read_to_string(ws.path("logs/result.log")).unwrap();
    assert!(log.contains("INFO"));
}

#[test]
fn test_json_report() {
    let ws = Workspace::new();

    let output = ws.command().arg("--json").output().unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["steps"].as_array().unwrap().len(), 16);
    assert_eq!(report["steps"][0]["rule"], "Get rid of unused subfolders and files");
}

#[test]
fn test_previous_output_is_replaced() {
    let ws = Workspace::new();
    write(&ws.path("target/stale.txt"), "old");

    ws.command().assert().success();

    assert!(!ws.path("target/stale.txt").exists());
    assert!(ws.path("target/src").is_dir());
}

#[test]
fn test_missing_cfg_fails() {
    let ws = Workspace::new();
    fs::remove_dir_all(ws.path("dispatcher")).unwrap();

    ws.command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("Configuration folder not found"));
}

#[test]
fn test_invalid_settings_fail() {
    let ws = Workspace::new();
    write(&ws.path("converter.toml"), "comment_marker = \"\"\n");

    ws.command()
        .arg("--config")
        .arg(ws.path("converter.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("comment_marker"));

    assert!(!ws.path("target").exists());
}

#[test]
fn test_settings_file_overrides_keywords() {
    let ws = Workspace::new();
    ws.write_cfg(
        "conf.d/available_vhosts/internal.vhost",
        "<VirtualHost *:80>\n</VirtualHost>\n",
    );
    ws.write_cfg(
        "conf.d/enabled_vhosts/internal.vhost",
        "../available_vhosts/internal.vhost",
    );
    write(
        &ws.path("converter.yaml"),
        "non_publish_keywords:\n  - internal\n",
    );

    ws.command()
        .arg("--config")
        .arg(ws.path("converter.yaml"))
        .assert()
        .success();

    assert!(!ws.path("target/src/conf.d/enabled_vhosts/internal.vhost").exists());
    assert!(ws.path("target/src/conf.d/enabled_vhosts/publish.vhost").exists());
}
