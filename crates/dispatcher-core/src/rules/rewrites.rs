//! Rewrite rule files in `conf.d/rewrites`

use super::folders::{Includers, keep_included, merge_into};
use crate::rule::{Context, ConversionRule};
use dispatcher_audit::AuditStep;
use dispatcher_fs::{ops, tree};
use dispatcher_rewrite::include::IncludeRewrite;
use dispatcher_rewrite::section::SectionSyntax;

/// Rule files the cloud runtime provides itself.
const OBSOLETE_RULES: [&str; 2] = ["base_rewrite.rules", "xforwarded_forcessl_rewrite.rules"];

const MERGED: &str = "rewrite.rules";

/// The block rewrite includes are collapsed in.
const REWRITE_MODULE: &str = "<IfModule mod_rewrite.c>";

/// Bring `conf.d/rewrites` down to a single `rewrite.rules`.
pub struct CheckRewrites;

impl ConversionRule for CheckRewrites {
    fn title(&self) -> &'static str {
        "Check rewrites folder"
    }

    fn description(&self) -> &'static str {
        "In directory `conf.d/rewrites`, remove any file named `base_rewrite.rules` and \
         `xforwarded_forcessl_rewrite.rules` and remove Include statements in the virtual host \
         files referring to them.\n\
         If `conf.d/rewrites` now contains a single file, it should be renamed to \
         `rewrite.rules` and adapt the Include statements referring to that file in the virtual \
         host files as well.\n\
         If the folder however contains multiple, virtual host specific files, their contents \
         should be copied to the Include statement referring to them in the virtual host files."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let vhosts = Includers::vhosts(ctx);
        let dir = ctx.conf_d().join("rewrites");

        for name in OBSOLETE_RULES {
            let path = dir.join(name);
            if path.is_file() {
                tracing::debug!(file = name, "Removing obsolete rewrite rules");
                vhosts.rewrite(name, IncludeRewrite::Drop, step);
                ops::delete_file(&path, step);
            }
        }

        let files = tree::files_with_extension(&dir, "rules", true);
        match files.as_slice() {
            [] => {}
            [single] => {
                let old_name = tree::file_name(single);
                if old_name != MERGED && ops::rename_file(single, &single.with_file_name(MERGED), step)
                {
                    vhosts.rewrite(&old_name, IncludeRewrite::RenameTarget(MERGED), step);
                }
            }
            _ => {
                let vhost_files = ctx.available_vhost_files();
                if vhost_files.len() > 1 {
                    for file in &files {
                        vhosts.inline(file, &ctx.config().root_marker, step);
                    }
                } else if let [vhost] = vhost_files.as_slice() {
                    let kept = keep_included(&files, vhost, vhosts.syntax(), step);
                    if kept.is_empty() {
                        return;
                    }
                    let names = merge_into(&kept, &dir.join(MERGED), &ctx.config().root_marker, step);
                    vhosts.collapse(
                        (REWRITE_MODULE, &SectionSyntax::tag("IfModule")),
                        &names,
                        IncludeRewrite::RenameTarget(MERGED),
                        step,
                    );
                }
            }
        }
    }
}
