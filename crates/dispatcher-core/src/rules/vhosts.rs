//! Rules for the Apache side: unused folders, non-publish hosts, ports and
//! obsolete variables

use super::warn_non_links;
use crate::rule::{Context, ConversionRule};
use dispatcher_audit::AuditStep;
use dispatcher_fs::{DispatcherPath, ops};
use dispatcher_rewrite::batch::{rewrite_folder, rewrite_tree};
use dispatcher_rewrite::prune::keep_port_80_virtual_hosts;
use dispatcher_rewrite::variables::{remove_variable, rename_variable};

/// Drop `conf`, `conf.modules.d` and `conf.d/*.conf`.
pub struct RemoveUnusedFolders;

impl ConversionRule for RemoveUnusedFolders {
    fn title(&self) -> &'static str {
        "Get rid of unused subfolders and files"
    }

    fn description(&self) -> &'static str {
        "Remove subfolders `conf` and `conf.modules.d`, as well as files matching `conf.d/*.conf`."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        ops::delete_folder(&ctx.root().join(DispatcherPath::Conf), step);
        ops::delete_folder(&ctx.root().join(DispatcherPath::ConfModulesD), step);
        ops::delete_files_with_extension(&ctx.conf_d(), "conf", step);
    }
}

/// Drop author, health check and flush virtual hosts.
pub struct RemoveNonPublishVhosts;

impl ConversionRule for RemoveNonPublishVhosts {
    fn title(&self) -> &'static str {
        "Get rid of all non-publish virtual hosts"
    }

    fn description(&self) -> &'static str {
        "Remove any virtual host file in `conf.d/enabled_vhosts` that has `author`, `unhealthy`, \
         `health`, `lc` or `flush` in its name. All virtual host files in \
         `conf.d/available_vhosts` that are not linked to should be removed."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let enabled = ctx.enabled_vhosts();
        let available = ctx.available_vhosts();
        let keywords = &ctx.config().non_publish_keywords;

        for keyword in keywords {
            ops::delete_files_containing(&enabled, keyword, step);
        }
        warn_non_links(&enabled, "vhost", "Found non-symlink enabled_vhost file.", step);
        for keyword in keywords {
            ops::delete_files_containing(&available, keyword, step);
        }
        ops::remove_unmatched_by_name(&enabled, &available, step);
    }
}

/// Drop `<VirtualHost>` sections that do not listen on port 80.
pub struct KeepPort80VirtualHosts;

impl ConversionRule for KeepPort80VirtualHosts {
    fn title(&self) -> &'static str {
        "Remove virtual host sections that do not refer to port 80"
    }

    fn description(&self) -> &'static str {
        "Remove sections of virtual host files that exclusively refer to ports other than \
         port 80, e.g. `<VirtualHost *:443>...</VirtualHost>`."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        for dir in [ctx.enabled_vhosts(), ctx.available_vhosts()] {
            rewrite_folder(&dir, "vhost", step, keep_port_80_virtual_hosts);
        }
    }
}

/// Rename or remove variables the cloud runtime no longer defines.
pub struct ReplaceVhostVariables;

impl ConversionRule for ReplaceVhostVariables {
    fn title(&self) -> &'static str {
        "Replace any variable that is no longer available"
    }

    fn description(&self) -> &'static str {
        "In all virtual host files, rename `PUBLISH_DOCROOT` to `DOCROOT` and remove sections \
         referring to variables named `DISP_ID`, `PUBLISH_FORCE_SSL` or \
         `PUBLISH_WHITELIST_ENABLED`."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let config = ctx.config();
        rewrite_tree(&ctx.conf_d(), "vhost", step, |fragment, step| {
            let mut changed = false;
            for rename in &config.vhost_variable_renames {
                changed |= rename_variable(fragment, &rename.from, &rename.to, step);
            }
            for name in &config.removed_variables {
                changed |= remove_variable(fragment, name, step);
            }
            changed
        });
    }
}
