//! Default fragments shipped with the dispatcher SDK

use crate::{Error, Result};
use dispatcher_fs::io;
use std::path::{Path, PathBuf};

/// Source of the default fragments a conversion installs.
///
/// Templates are named by their path relative to the configuration root,
/// e.g. `conf.dispatcher.d/cache/default_rules.any`.
pub trait TemplateProvider {
    /// Path of the named template file.
    fn locate(&self, name: &str) -> Result<PathBuf>;

    /// Text of the named template.
    fn contents(&self, name: &str) -> Result<String> {
        let path = self.locate(name)?;
        Ok(io::read_text(&path)?)
    }
}

/// Templates read from the `src` folder of an unpacked dispatcher SDK.
#[derive(Debug, Clone)]
pub struct SdkTemplates {
    root: PathBuf,
}

impl SdkTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateProvider for SdkTemplates {
    fn locate(&self, name: &str) -> Result<PathBuf> {
        let path = name
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment));
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::TemplateNotFound {
                name: name.to_string(),
                root: self.root.clone(),
            })
        }
    }
}
