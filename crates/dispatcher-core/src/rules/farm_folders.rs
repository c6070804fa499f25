//! Client header, filter and virtual host folders of `conf.dispatcher.d`

use super::folders::RuleFolder;
use crate::rule::{Context, ConversionRule};
use dispatcher_audit::AuditStep;
use dispatcher_fs::ops;
use dispatcher_rewrite::batch::rewrite_tree;
use dispatcher_rewrite::variables::scrub_variables_in_section;

const CLIENT_HEADERS: RuleFolder = RuleFolder {
    name: "clientheaders",
    single_suffix: "_clientheaders.any",
    farm_suffix: "_clientheaders.any",
    merged: "clientheaders.any",
    section: "/clientheader",
};

const FILTERS: RuleFolder = RuleFolder {
    name: "filters",
    single_suffix: "_filters.any",
    farm_suffix: "_filters.any",
    merged: "filters.any",
    section: "/filter",
};

const VIRTUAL_HOSTS: RuleFolder = RuleFolder {
    name: "virtualhosts",
    single_suffix: "vhosts.any",
    farm_suffix: "_vhosts.any",
    merged: "virtualhosts.any",
    section: "/virtualhosts",
};

/// Folder name virtual hosts lived in before the conversion.
const LEGACY_VIRTUAL_HOSTS: &str = "vhosts";

/// Delete `ams_` files and anything not `*.any`, then merge what is left.
fn reduce(folder: &RuleFolder, ctx: &Context<'_>, step: &mut AuditStep) {
    for file in folder.ams_files(ctx) {
        ops::delete_file(&file, step);
    }
    let files = ops::delete_files_not_matching(&folder.dir(ctx), "any", step);
    folder.merge(ctx, &files, step);
}

/// Bring `conf.dispatcher.d/clientheaders` down to `clientheaders.any`.
pub struct CheckClientHeaders;

impl ConversionRule for CheckClientHeaders {
    fn title(&self) -> &'static str {
        "Check client headers"
    }

    fn description(&self) -> &'static str {
        "In directory `conf.dispatcher.d/clientheaders`, remove any file prefixed `ams_`.\n\
         If `conf.dispatcher.d/clientheaders` now contains a single file with suffix \
         `_clientheaders.any`, it should be renamed to `clientheaders.any` and adapt the \
         `$include` statements referring to that file in the farm files as well.\n\
         If the folder however contains multiple, farm specific files with that pattern, their \
         contents should be copied to the `$include` statement referring to them in the farm \
         files.\n\
         Copy the file `conf.dispatcher.d/clientheaders/default_clientheaders.any` from the \
         standard dispatcher configuration to that location.\n\
         In each farm file, replace any clientheader include statements that look like \
         `$include \"/etc/httpd/conf.dispatcher.d/clientheaders/ams_publish_clientheaders.any\"` \
         with the statement: `$include \"../clientheaders/default_clientheaders.any\"`"
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        reduce(&CLIENT_HEADERS, ctx, step);
        CLIENT_HEADERS.install_defaults(
            ctx,
            "$include \"/etc/httpd/conf.dispatcher.d/clientheaders/ams_",
            step,
        );
    }
}

/// Bring `conf.dispatcher.d/filters` down to `filters.any`.
pub struct CheckFilters;

impl ConversionRule for CheckFilters {
    fn title(&self) -> &'static str {
        "Check filter"
    }

    fn description(&self) -> &'static str {
        "In directory `conf.dispatcher.d/filters`, remove any file prefixed `ams_`.\n\
         If `conf.dispatcher.d/filters` now contains a single file it should be renamed to \
         `filters.any` and adapt the `$include` statements referring to that file in the farm \
         files as well.\n\
         If the folder however contains multiple, farm specific files with that pattern, their \
         contents should be copied to the `$include` statement referring to them in the farm \
         files.\n\
         Copy the file `conf.dispatcher.d/filters/default_filters.any` from the standard \
         dispatcher configuration to that location.\n\
         In each farm file, replace any filter include statements that look like \
         `$include \"/etc/httpd/conf.dispatcher.d/filters/ams_publish_filters.any\"` with the \
         statement: `$include \"../filters/default_filters.any\"`"
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        reduce(&FILTERS, ctx, step);
        FILTERS.install_defaults(ctx, "$include \"/etc/httpd/conf.dispatcher.d/filters/ams", step);
    }
}

/// Move `vhosts` to `virtualhosts` and bring it down to `virtualhosts.any`.
pub struct CheckVirtualHosts;

impl ConversionRule for CheckVirtualHosts {
    fn title(&self) -> &'static str {
        "Check VirtualHosts"
    }

    fn description(&self) -> &'static str {
        "Rename the directory `conf.dispatcher.d/vhosts` to `conf.dispatcher.d/virtualhosts`. \
         Remove any file prefixed `ams_`.\n\
         If `conf.dispatcher.d/virtualhosts` now contains a single file it should be renamed to \
         `virtualhosts.any` and adapt the `$include` statements referring to that file in the \
         farm files as well.\n\
         If the folder however contains multiple, farm specific files with that pattern, their \
         contents should be copied to the `$include` statement referring to them in the farm \
         files.\n\
         Copy the file `conf.dispatcher.d/virtualhosts/default_virtualhosts.any` from the \
         standard dispatcher configuration to that location.\n\
         In each farm file, replace any virtual host include statement that looks like \
         `$include \"/etc/httpd/conf.dispatcher.d/vhosts/ams_publish_vhosts.any\"` with the \
         statement: `$include \"../virtualhosts/default_virtualhosts.any\"`"
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let dir = VIRTUAL_HOSTS.dir(ctx);
        ops::rename_folder(&ctx.dispatcher_d().join(LEGACY_VIRTUAL_HOSTS), &dir, step);
        ops::delete_files_containing(&dir, "ams_", step);
        let files = ops::delete_files_not_matching(&dir, "any", step);
        VIRTUAL_HOSTS.merge(ctx, &files, step);

        VIRTUAL_HOSTS.install_defaults(
            ctx,
            "$include \"/etc/httpd/conf.dispatcher.d/vhosts/ams_",
            step,
        );

        let comment_marker = &ctx.config().comment_marker;
        rewrite_tree(&ctx.dispatcher_d(), "farm", step, |fragment, step| {
            scrub_variables_in_section(fragment, VIRTUAL_HOSTS.section, comment_marker, step)
        });
    }
}
