//! Cache rules and renders

use super::folders::{Includers, RuleFolder};
use crate::rule::{Context, ConversionRule};
use dispatcher_audit::AuditStep;
use dispatcher_fs::{ops, tree};
use dispatcher_rewrite::batch::rewrite_tree;
use dispatcher_rewrite::include::IncludeRewrite;
use dispatcher_rewrite::replace::replace_section_body;

const CACHE: RuleFolder = RuleFolder {
    name: "cache",
    single_suffix: "_cache.any",
    farm_suffix: "_cache.any",
    merged: "rules.any",
    section: "/rules",
};

const DEFAULT_RULES: &str = "default_rules.any";
const DEFAULT_INVALIDATE: &str = "default_invalidate.any";
const INVALIDATE_SUFFIX: &str = "_invalidate_allowed.any";
const ALLOWED_CLIENTS_SECTION: &str = "/allowedClients";

/// Replace the body of `section` in every farm file.
fn replace_in_farms(ctx: &Context<'_>, section: &str, replacement: &str, step: &mut AuditStep) {
    rewrite_tree(&ctx.dispatcher_d(), "farm", step, |fragment, step| {
        replace_section_body(fragment, section, replacement, step)
    });
}

/// Bring `conf.dispatcher.d/cache` down to `rules.any` plus the defaults.
pub struct CheckCache;

impl ConversionRule for CheckCache {
    fn title(&self) -> &'static str {
        "Check cache"
    }

    fn description(&self) -> &'static str {
        "In directory `conf.dispatcher.d/cache`, remove any file prefixed `ams_`.\n\
         If `conf.dispatcher.d/cache` is now empty, copy the file \
         `conf.dispatcher.d/cache/rules.any` from the standard dispatcher configuration to this \
         folder and adapt the `$include` statements referring to the `ams_*_cache.any` rule \
         files in the farm files as well.\n\
         If instead `conf.dispatcher.d/cache` now contains a single file with suffix \
         `_cache.any`, it should be renamed to `rules.any` and adapt the `$include` statements \
         referring to that file in the farm files as well.\n\
         If the folder however contains multiple, farm specific files with that pattern, their \
         contents should be copied to the `$include` statement referring to them in the farm \
         files, and the files deleted. Remove any file that has the suffix \
         `_invalidate_allowed.any`.\n\
         Copy the file `conf.dispatcher.d/cache/default_invalidate.any` from the standard \
         dispatcher configuration to that location. In each farm file, remove any contents in \
         the `cache/allowedClients` section and replace it with: \
         `$include \"../cache/default_invalidate.any\"`"
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let dir = CACHE.dir(ctx);
        let farms = Includers::farms(ctx);

        // With non-ams rules left, point ams includes at the default rules;
        // otherwise the whole /rules body is replaced below
        let ams_files = CACHE.ams_files(ctx);
        let has_other_rules = tree::files_with_extension(&dir, "any", true).len() > ams_files.len();
        let default_rules = CACHE.include_argument(DEFAULT_RULES);
        for file in &ams_files {
            if has_other_rules {
                farms.rewrite(
                    &tree::file_name(file),
                    IncludeRewrite::ReplaceRule(&default_rules),
                    step,
                );
            }
            ops::delete_file(file, step);
        }

        let files = tree::files_with_extension(&dir, "any", true);
        ctx.install_template(&CACHE.template(DEFAULT_RULES), &dir, step);

        if files.is_empty() {
            ctx.install_template(&CACHE.template(CACHE.merged), &dir, step);
            replace_in_farms(ctx, CACHE.section, &CACHE.include_directive(CACHE.merged), step);
        } else {
            CACHE.merge(ctx, &files, step);
        }

        for file in tree::files_with_extension(&dir, "any", true) {
            if tree::file_name(&file).ends_with(INVALIDATE_SUFFIX) {
                ops::delete_file(&file, step);
            }
        }

        ctx.install_template(&CACHE.template(DEFAULT_INVALIDATE), &dir, step);
        replace_in_farms(
            ctx,
            ALLOWED_CLIENTS_SECTION,
            &CACHE.include_directive(DEFAULT_INVALIDATE),
            step,
        );
    }
}

const RENDERS: &str = "renders";
const DEFAULT_RENDERS: &str = "default_renders.any";

/// Replace all render definitions with the default renders.
pub struct CheckRenders;

impl ConversionRule for CheckRenders {
    fn title(&self) -> &'static str {
        "Check renders"
    }

    fn description(&self) -> &'static str {
        "Remove all files in the directory `conf.dispatcher.d/renders`. Copy the file \
         `conf.dispatcher.d/renders/default_renders.any` from the standard dispatcher \
         configuration to that location.\n\
         In each farm file, remove any contents in the renders section and replace it with: \
         `$include \"../renders/default_renders.any\"`"
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let dir = ctx.dispatcher_d().join(RENDERS);
        for file in tree::files_with_extension(&dir, "any", true) {
            ops::delete_file(&file, step);
        }
        ctx.install_template(&format!("conf.dispatcher.d/{RENDERS}/{DEFAULT_RENDERS}"), &dir, step);
        replace_in_farms(
            ctx,
            "/renders",
            &format!("$include \"../{RENDERS}/{DEFAULT_RENDERS}\""),
            step,
        );
    }
}
