//! Shared handling of rule folders.
//!
//! A rule folder (`conf.d/rewrites`, `conf.dispatcher.d/cache`, ...) holds
//! fragments included from virtual host or farm files. Converting one means
//! bringing it down to a single well-known file: one leftover file is
//! renamed, several are inlined into their includers when many includers
//! exist, or merged into one file when a single includer exists.

use crate::rule::Context;
use dispatcher_audit::AuditStep;
use dispatcher_fs::{Fragment, ops, tree};
use dispatcher_rewrite::batch::rewrite_tree;
use dispatcher_rewrite::include::{
    IncludeRewrite, IncludeSyntax, included_targets, replace_include_pattern_in_section,
    replace_includes_in_section, rewrite_includes,
};
use dispatcher_rewrite::inline::{IncludedContent, consolidate, inline_include};
use dispatcher_rewrite::section::SectionSyntax;
use std::path::{Path, PathBuf};

/// The files that include fragments from a rule folder.
pub(crate) struct Includers {
    dir: PathBuf,
    extension: &'static str,
    syntax: IncludeSyntax,
}

impl Includers {
    /// Virtual host files below `conf.d`.
    pub fn vhosts(ctx: &Context<'_>) -> Self {
        Self {
            dir: ctx.conf_d(),
            extension: "vhost",
            syntax: IncludeSyntax::Vhost,
        }
    }

    /// Farm files below `conf.dispatcher.d`.
    pub fn farms(ctx: &Context<'_>) -> Self {
        Self {
            dir: ctx.dispatcher_d(),
            extension: "farm",
            syntax: IncludeSyntax::Farm,
        }
    }

    pub fn syntax(&self) -> IncludeSyntax {
        self.syntax
    }

    /// Apply `rewrite` to every include of `target`.
    pub fn rewrite(&self, target: &str, rewrite: IncludeRewrite<'_>, step: &mut AuditStep) -> usize {
        rewrite_tree(&self.dir, self.extension, step, |fragment, step| {
            rewrite_includes(fragment, self.syntax, target, rewrite, step)
        })
    }

    /// Replace includes of `file` with its content, then delete it.
    pub fn inline(&self, file: &Path, marker: &str, step: &mut AuditStep) {
        let content = match IncludedContent::read(file, marker) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("{}: {}", file.display(), e);
                return;
            }
        };
        let target = content.source().to_string();
        rewrite_tree(&self.dir, self.extension, step, |fragment, step| {
            inline_include(fragment, self.syntax, &target, &content, step)
        });
        ops::delete_file(file, step);
    }

    /// Collapse includes of `names` inside the `scope` section into one.
    pub fn collapse(
        &self,
        scope: (&str, &SectionSyntax),
        names: &[String],
        rewrite: IncludeRewrite<'_>,
        step: &mut AuditStep,
    ) -> usize {
        rewrite_tree(&self.dir, self.extension, step, |fragment, step| {
            replace_includes_in_section(fragment, self.syntax, scope, names, rewrite, step)
        })
    }

    /// Rewrite legacy include lines starting with `pattern` inside `section`.
    pub fn repoint_pattern(
        &self,
        section: &str,
        pattern: &str,
        replacement: &str,
        step: &mut AuditStep,
    ) -> usize {
        rewrite_tree(&self.dir, self.extension, step, |fragment, step| {
            replace_include_pattern_in_section(fragment, section, pattern, replacement, step)
        })
    }
}

/// Delete the `files` the single includer does not reference.
///
/// Returns the referenced files in their original order. When the includer
/// cannot be read every file is kept.
pub(crate) fn keep_included(
    files: &[PathBuf],
    includer: &Path,
    syntax: IncludeSyntax,
    step: &mut AuditStep,
) -> Vec<PathBuf> {
    let fragment = match Fragment::load(includer) {
        Ok(fragment) => fragment,
        Err(e) => {
            tracing::error!("{}: {}", includer.display(), e);
            return files.to_vec();
        }
    };
    let names: Vec<String> = files.iter().map(|file| tree::file_name(file)).collect();
    let included = included_targets(&fragment, syntax, &names);

    let mut kept = Vec::new();
    for file in files {
        if included.contains(&tree::file_name(file)) {
            kept.push(file.clone());
        } else {
            tracing::debug!(path = %file.display(), "File not included, removing");
            ops::delete_file(file, step);
        }
    }
    kept
}

/// Merge `files` into `destination` and delete the merged sources.
///
/// Returns the file names that were merged.
pub(crate) fn merge_into(
    files: &[PathBuf],
    destination: &Path,
    marker: &str,
    step: &mut AuditStep,
) -> Vec<String> {
    if let Err(e) = consolidate(files, destination, marker, step) {
        tracing::error!("{}: {}", destination.display(), e);
        return Vec::new();
    }
    let mut names = Vec::with_capacity(files.len());
    for file in files {
        names.push(tree::file_name(file));
        if file.as_path() != destination {
            ops::delete_file(file, step);
        }
    }
    names
}

/// A farm rule folder below `conf.dispatcher.d`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleFolder {
    /// Folder name
    pub name: &'static str,
    /// Suffix a lone leftover file must have to be renamed
    pub single_suffix: &'static str,
    /// Suffix of the farm specific files that get inlined
    pub farm_suffix: &'static str,
    /// Name of the single file the folder ends up with
    pub merged: &'static str,
    /// Farm section that includes the folder's files
    pub section: &'static str,
}

impl RuleFolder {
    pub fn dir(&self, ctx: &Context<'_>) -> PathBuf {
        ctx.dispatcher_d().join(self.name)
    }

    /// Quoted include argument for a file of this folder, relative to a farm.
    pub fn include_argument(&self, file: &str) -> String {
        format!("\"../{}/{file}\"", self.name)
    }

    /// Complete `$include` directive for a file of this folder.
    pub fn include_directive(&self, file: &str) -> String {
        format!("{} {}", IncludeSyntax::Farm.token(), self.include_argument(file))
    }

    /// Template name of a file of this folder.
    pub fn template(&self, file: &str) -> String {
        format!("conf.dispatcher.d/{}/{file}", self.name)
    }

    /// `*.any` files whose name contains `ams_`, at any depth.
    pub fn ams_files(&self, ctx: &Context<'_>) -> Vec<PathBuf> {
        tree::files_with_extension(&self.dir(ctx), "any", true)
            .into_iter()
            .filter(|path| tree::file_name(path).contains("ams_"))
            .collect()
    }

    /// Reduce the folder's remaining `files` to the merged file.
    pub fn merge(&self, ctx: &Context<'_>, files: &[PathBuf], step: &mut AuditStep) {
        let farms = Includers::farms(ctx);
        let merged_argument = self.include_argument(self.merged);

        match files {
            [] => {}
            [single] => {
                let old_name = tree::file_name(single);
                if !old_name.ends_with(self.single_suffix) || old_name == self.merged {
                    return;
                }
                if ops::rename_file(single, &single.with_file_name(self.merged), step) {
                    farms.rewrite(&old_name, IncludeRewrite::ReplaceRule(&merged_argument), step);
                }
            }
            _ => {
                let farm_files = ctx.available_farm_files();
                if farm_files.len() > 1 {
                    for file in files {
                        if tree::file_name(file).ends_with(self.farm_suffix) {
                            farms.inline(file, &ctx.config().root_marker, step);
                        }
                    }
                } else if let [farm] = farm_files.as_slice() {
                    let kept = keep_included(files, farm, farms.syntax(), step);
                    if kept.is_empty() {
                        return;
                    }
                    let destination = self.dir(ctx).join(self.merged);
                    let names = merge_into(&kept, &destination, &ctx.config().root_marker, step);
                    farms.collapse(
                        (self.section, &SectionSyntax::Brace),
                        &names,
                        IncludeRewrite::ReplaceRule(&merged_argument),
                        step,
                    );
                }
            }
        }
    }

    /// Install the default file, and the merged file when the folder has
    /// none, then repoint legacy includes starting with `legacy_pattern`.
    pub fn install_defaults(&self, ctx: &Context<'_>, legacy_pattern: &str, step: &mut AuditStep) {
        let dir = self.dir(ctx);
        let default_name = format!("default_{}", self.merged);
        ctx.install_template(&self.template(&default_name), &dir, step);

        let replacement = if dir.join(self.merged).exists() {
            self.include_directive(&default_name)
        } else {
            ctx.install_template(&self.template(self.merged), &dir, step);
            self.include_directive(self.merged)
        };
        Includers::farms(ctx).repoint_pattern(self.section, legacy_pattern, &replacement, step);
    }
}
