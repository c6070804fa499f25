//! Farm file rules: non-publish farms, file naming and variables

use super::warn_non_links;
use crate::rule::{Context, ConversionRule};
use dispatcher_audit::AuditStep;
use dispatcher_fs::{ops, tree};
use dispatcher_rewrite::batch::rewrite_tree;
use dispatcher_rewrite::variables::rename_variable;

/// Drop author, health check and flush farms.
pub struct RemoveNonPublishFarms;

impl ConversionRule for RemoveNonPublishFarms {
    fn title(&self) -> &'static str {
        "Get rid of all non-publish farms"
    }

    fn description(&self) -> &'static str {
        "Remove any farm file in `conf.dispatcher.d/enabled_farms` that has `author`, \
         `unhealthy`, `health`, `lc` or `flush` in its name. All farm files in \
         `conf.dispatcher.d/available_farms` that are not linked to can be removed as well."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let enabled = ctx.enabled_farms();
        let available = ctx.available_farms();
        let keywords = &ctx.config().non_publish_keywords;

        for keyword in keywords {
            ops::delete_files_containing(&enabled, keyword, step);
        }
        for keyword in keywords {
            ops::delete_files_containing(&available, keyword, step);
        }
        ops::remove_unmatched_by_name(&enabled, &available, step);
    }
}

/// Cloud name of a legacy farm file, e.g. `publish_farm.any` to `publish.farm`.
pub fn farm_file_name(name: &str) -> String {
    name.replace("_farm", "").replace(".any", ".farm")
}

/// Rename `*.any` farms to `*.farm` and repoint the links to them.
pub struct RenameFarmFiles;

impl ConversionRule for RenameFarmFiles {
    fn title(&self) -> &'static str {
        "Rename farm files"
    }

    fn description(&self) -> &'static str {
        "All farms in `conf.dispatcher.d/enabled_farms` must be renamed to match the pattern \
         `*.farm`, so e.g. a farm file called `customerX_farm.any` should be renamed \
         `customerX.farm`."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let enabled = ctx.enabled_farms();

        for dir in [ctx.available_farms(), enabled.clone()] {
            for path in tree::list_files(&dir) {
                if !tree::has_extension(&path, "any") {
                    continue;
                }
                let renamed = path.with_file_name(farm_file_name(&tree::file_name(&path)));
                ops::rename_file(&path, &renamed, step);
            }
        }

        warn_non_links(&enabled, "farm", "Found non-symlink enabled_farm file.", step);

        for link in tree::list_files(&enabled) {
            if tree::has_extension(&link, "farm") {
                ops::retarget_link(&link, farm_file_name, step);
            }
        }
    }
}

/// Rename variables in farm files.
pub struct ReplaceFarmVariables;

impl ConversionRule for ReplaceFarmVariables {
    fn title(&self) -> &'static str {
        "Replace variables in farm files"
    }

    fn description(&self) -> &'static str {
        "Rename `PUBLISH_DOCROOT` to `DOCROOT` in all farm files."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let renames = &ctx.config().farm_variable_renames;
        rewrite_tree(&ctx.dispatcher_d(), "farm", step, |fragment, step| {
            let mut changed = false;
            for rename in renames {
                changed |= rename_variable(fragment, &rename.from, &rename.to, step);
            }
            changed
        });
    }
}
