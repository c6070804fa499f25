//! Variable definition files in `conf.d/variables`

use super::folders::Includers;
use crate::rule::{Context, ConversionRule};
use dispatcher_audit::{AuditStep, OperationKind};
use dispatcher_fs::{Fragment, io, ops, tree};
use dispatcher_rewrite::batch::rewrite_tree;
use dispatcher_rewrite::include::{IncludeRewrite, IncludeSyntax, dedupe_includes};
use dispatcher_rewrite::inline::consolidate_variables;
use dispatcher_rewrite::variables::undefined_variables;
use std::collections::HashSet;
use std::path::Path;

const AMS_DEFAULTS: &str = "ams_default.vars";
const CUSTOM_VARS: &str = "custom.vars";
const GLOBAL_VARS_TEMPLATE: &str = "conf.d/variables/global.vars";

/// Consolidate variable files into `custom.vars` and install `global.vars`.
pub struct CheckVariables;

impl ConversionRule for CheckVariables {
    fn title(&self) -> &'static str {
        "Check variables folder"
    }

    fn description(&self) -> &'static str {
        "In directory `conf.d/variables`, remove any file named `ams_default.vars` and remove \
         Include statements in the virtual host files referring to them.\n\
         Consolidate variable definitions from all remaining vars files in `conf.d/variables` \
         into a single file named `custom.vars` and adapt the Include statements referring to \
         them in the virtual host files."
    }

    fn apply(&self, ctx: &Context<'_>, step: &mut AuditStep) {
        let config = ctx.config();
        let conf_d = ctx.conf_d();
        let dir = conf_d.join("variables");
        let vhosts = Includers::vhosts(ctx);

        let ams_defaults = dir.join(AMS_DEFAULTS);
        if ams_defaults.is_file() {
            vhosts.rewrite(AMS_DEFAULTS, IncludeRewrite::Drop, step);
            ops::delete_file(&ams_defaults, step);
        }

        let files = ops::delete_files_not_matching(&dir, "vars", step);
        let custom = dir.join(CUSTOM_VARS);
        let mut defined: HashSet<String> = HashSet::new();

        if !files.is_empty() {
            match consolidate_variables(&files, &custom, &config.root_marker, step) {
                Ok(names) => defined.extend(names),
                Err(e) => tracing::error!("{}: {}", custom.display(), e),
            }
            for file in &files {
                let name = tree::file_name(file);
                if name == CUSTOM_VARS {
                    continue;
                }
                vhosts.rewrite(&name, IncludeRewrite::RenameTarget(CUSTOM_VARS), step);
                ops::delete_file(file, step);
            }
            rewrite_tree(&conf_d, "vhost", step, |fragment, step| {
                dedupe_includes(fragment, IncludeSyntax::Vhost, CUSTOM_VARS, step)
            });
        }

        if let Some(global) = ctx.install_template(GLOBAL_VARS_TEMPLATE, &dir, step) {
            defined.extend(defined_in_file(&global));
        }

        report_undefined(&conf_d, &defined, &config.comment_marker, step);
    }
}

/// Variable names declared with `Define` in a variables file.
fn defined_in_file(path: &Path) -> Vec<String> {
    match io::read_text(path) {
        Ok(text) => text
            .lines()
            .filter_map(|line| {
                let mut tokens = line.split_whitespace();
                match (tokens.next(), tokens.next()) {
                    (Some(keyword), Some(name)) if keyword.eq_ignore_ascii_case("define") => {
                        Some(name.to_string())
                    }
                    _ => None,
                }
            })
            .collect(),
        Err(e) => {
            tracing::error!("{}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Record a warning for each reference to a variable nobody defines.
fn report_undefined(
    conf_d: &Path,
    defined: &HashSet<String>,
    comment_marker: &str,
    step: &mut AuditStep,
) {
    for path in tree::files_with_extension(conf_d, "vhost", true) {
        let fragment = match Fragment::load(&path) {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::error!("{}: {}", path.display(), e);
                continue;
            }
        };
        for usage in undefined_variables(&fragment, defined, comment_marker) {
            step.record(
                OperationKind::Warning,
                usage.location,
                format!("Undefined variable '{}'", usage.name),
            );
        }
    }
}
