//! The `conf.d/whitelists` folder

use super::folders::Includers;
use crate::rule::{Context, ConversionRule};
use dispatcher_audit::AuditStep;
use dispatcher_fs::{ops, tree};
use dispatcher_rewrite::include::IncludeRewrite;
use std::collections::BTreeSet;

/// Remove `conf.d/whitelists` and every include of its files.
pub struct RemoveWhitelists;

impl ConversionRule for RemoveWhitelists {
    fn title(&self) -> &'static str {
        "Remove whitelists"
    }

    fn description(&self) -> &'static str {
        "Remove the folder `conf.d/whitelists` and remove Include statements in the virtual host \
         files referring to some file in that subfolder."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let dir = ctx.conf_d().join("whitelists");
        let vhosts = Includers::vhosts(ctx);
        let names: BTreeSet<String> = tree::files_below(&dir)
            .iter()
            .map(|path| tree::file_name(path))
            .filter(|name| name.contains('.'))
            .collect();
        for name in names {
            vhosts.rewrite(&name, IncludeRewrite::Drop, step);
        }
        ops::delete_folder(&dir, step);
    }
}
