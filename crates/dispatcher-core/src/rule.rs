//! The conversion rule abstraction and the context rules run in

use crate::config::ConverterConfig;
use crate::templates::TemplateProvider;
use dispatcher_audit::AuditStep;
use dispatcher_fs::{DispatcherPath, ops, tree};
use std::path::{Path, PathBuf};

/// One step of the conversion.
///
/// A rule records everything it changes on the step it is given; a rule
/// that records nothing is left out of the report.
pub trait ConversionRule {
    /// Short title used as the report heading
    fn title(&self) -> &'static str;

    /// What the rule does, as shown in the report
    fn description(&self) -> &'static str;

    /// Run the rule against the tree in `ctx`.
    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep);
}

/// The configuration tree under conversion, plus what rules need to change it.
pub struct Context<'a> {
    root: &'a Path,
    config: &'a ConverterConfig,
    templates: &'a dyn TemplateProvider,
}

impl<'a> Context<'a> {
    pub fn new(
        root: &'a Path,
        config: &'a ConverterConfig,
        templates: &'a dyn TemplateProvider,
    ) -> Self {
        Self {
            root,
            config,
            templates,
        }
    }

    /// Root of the tree (the folder holding `conf.d` and `conf.dispatcher.d`)
    pub fn root(&self) -> &Path {
        self.root
    }

    pub fn config(&self) -> &ConverterConfig {
        self.config
    }

    pub fn conf_d(&self) -> PathBuf {
        self.root.join(DispatcherPath::ConfD)
    }

    pub fn dispatcher_d(&self) -> PathBuf {
        self.root.join(DispatcherPath::ConfDispatcherD)
    }

    pub fn enabled_vhosts(&self) -> PathBuf {
        self.conf_d().join(DispatcherPath::EnabledVhosts)
    }

    pub fn available_vhosts(&self) -> PathBuf {
        self.conf_d().join(DispatcherPath::AvailableVhosts)
    }

    pub fn enabled_farms(&self) -> PathBuf {
        self.dispatcher_d().join(DispatcherPath::EnabledFarms)
    }

    pub fn available_farms(&self) -> PathBuf {
        self.dispatcher_d().join(DispatcherPath::AvailableFarms)
    }

    /// Every `*.vhost` file below `available_vhosts`.
    pub fn available_vhost_files(&self) -> Vec<PathBuf> {
        tree::files_with_extension(&self.available_vhosts(), "vhost", true)
    }

    /// Every `*.farm` file below `available_farms`.
    pub fn available_farm_files(&self) -> Vec<PathBuf> {
        tree::files_with_extension(&self.available_farms(), "farm", true)
    }

    /// Copy the named template into `dest_dir`.
    ///
    /// A missing template is logged and skipped; returns the copy's path.
    pub fn install_template(
        &self,
        name: &str,
        dest_dir: &Path,
        step: &mut AuditStep,
    ) -> Option<PathBuf> {
        match self.templates.locate(name) {
            Ok(source) => ops::copy_file_into(&source, dest_dir, step),
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }
}
