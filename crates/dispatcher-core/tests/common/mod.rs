//! Fixture trees shared by the integration tests

#![allow(dead_code)]

use dispatcher_core::{ConversionRule, Converter, ConverterConfig, SdkTemplates};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A configuration tree under `<temp>/src` plus an SDK template tree.
pub struct Fixture {
    _temp: TempDir,
    pub root: PathBuf,
    pub sdk: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("target/src");
        let sdk = temp.path().join("sdk/src");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&sdk).unwrap();

        let fixture = Self {
            _temp: temp,
            root,
            sdk,
        };
        fixture.sdk_file("conf.d/variables/global.vars", "Define DOCROOT /mnt/var/www/html\n");
        for (folder, files) in [
            ("cache", &["default_rules.any", "rules.any", "default_invalidate.any"][..]),
            ("clientheaders", &["default_clientheaders.any", "clientheaders.any"][..]),
            ("filters", &["default_filters.any", "filters.any"][..]),
            ("renders", &["default_renders.any"][..]),
            ("virtualhosts", &["default_virtualhosts.any", "virtualhosts.any"][..]),
        ] {
            for file in files {
                fixture.sdk_file(
                    &format!("conf.dispatcher.d/{folder}/{file}"),
                    &format!("# sdk {file}\n"),
                );
            }
        }
        fixture
    }

    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.root.join(relative), content)
    }

    pub fn sdk_file(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.sdk.join(relative), content)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        fs::symlink_metadata(self.root.join(relative)).is_ok()
    }

    /// Sorted file names directly inside a folder of the tree.
    pub fn names_in(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root.join(relative))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn converter(&self) -> Converter {
        Converter::new(
            ConverterConfig::default(),
            &self.root,
            SdkTemplates::new(&self.sdk),
        )
    }

    pub fn converter_with(&self, rules: Vec<Box<dyn ConversionRule>>) -> Converter {
        self.converter().with_rules(rules)
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
