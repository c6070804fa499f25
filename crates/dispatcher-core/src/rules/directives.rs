//! Directive whitelist for virtual host files

use crate::rule::{Context, ConversionRule};
use dispatcher_audit::AuditStep;
use dispatcher_rewrite::Whitelist;
use dispatcher_rewrite::batch::rewrite_folder;
use dispatcher_rewrite::whitelist::enforce_whitelist;

/// Comment out directives the cloud runtime does not allow.
pub struct RemoveNonWhitelistedDirectives;

impl ConversionRule for RemoveNonWhitelistedDirectives {
    fn title(&self) -> &'static str {
        "Remove usage of non-whitelisted directives"
    }

    fn description(&self) -> &'static str {
        "Checking for usage of non-whitelisted directives and remove them."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let config = ctx.config();
        let whitelist = Whitelist::new(&config.whitelisted_directives);
        let mut total = 0;
        rewrite_folder(&ctx.available_vhosts(), "vhost", step, |fragment, step| {
            // Lines are only ever commented at or after a recorded usage
            let outcome = enforce_whitelist(fragment, &whitelist, &config.comment_marker, step);
            total += outcome.usages.len();
            !outcome.usages.is_empty()
        });
        tracing::info!(usages = total, "Whitelist enforcement finished");
    }
}
