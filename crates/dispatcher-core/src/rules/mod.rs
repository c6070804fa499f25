//! The conversion rule set
//!
//! Rules are applied in the order [`default_rules`] returns them; later
//! rules rely on the layout earlier ones leave behind (farm files are
//! renamed to `*.farm` before any farm rewrite, for example).

mod cache;
mod directives;
mod farm_folders;
mod farms;
mod folders;
mod rewrites;
mod variables;
mod vhosts;
mod whitelists;

pub use cache::{CheckCache, CheckRenders};
pub use directives::RemoveNonWhitelistedDirectives;
pub use farm_folders::{CheckClientHeaders, CheckFilters, CheckVirtualHosts};
pub use farms::{RemoveNonPublishFarms, RenameFarmFiles, ReplaceFarmVariables};
pub use rewrites::CheckRewrites;
pub use variables::CheckVariables;
pub use vhosts::{
    KeepPort80VirtualHosts, RemoveNonPublishVhosts, RemoveUnusedFolders, ReplaceVhostVariables,
};
pub use whitelists::RemoveWhitelists;

use crate::rule::ConversionRule;
use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::{NormalizedPath, tree};
use std::path::Path;

/// The full rule set, in execution order.
pub fn default_rules() -> Vec<Box<dyn ConversionRule>> {
    vec![
        Box::new(RemoveUnusedFolders),
        Box::new(RemoveNonPublishVhosts),
        Box::new(KeepPort80VirtualHosts),
        Box::new(ReplaceVhostVariables),
        Box::new(CheckRewrites),
        Box::new(CheckVariables),
        Box::new(RemoveWhitelists),
        Box::new(RemoveNonPublishFarms),
        Box::new(RenameFarmFiles),
        Box::new(CheckCache),
        Box::new(CheckClientHeaders),
        Box::new(CheckFilters),
        Box::new(CheckRenders),
        Box::new(CheckVirtualHosts),
        Box::new(ReplaceFarmVariables),
        Box::new(RemoveNonWhitelistedDirectives),
    ]
}

/// Record a warning for each `*.extension` file in `dir` that is neither a
/// symbolic link nor a link placeholder.
pub(crate) fn warn_non_links(dir: &Path, extension: &str, message: &str, step: &mut AuditStep) {
    for path in tree::list_files(dir) {
        if tree::has_extension(&path, extension) && !tree::is_link_like(&path) {
            let location = NormalizedPath::new(&path);
            tracing::warn!(path = %location, "{message}");
            step.record(OperationKind::Warning, location.to_string(), message);
        }
    }
}
