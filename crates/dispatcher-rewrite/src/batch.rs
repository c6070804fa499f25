//! Applying rewrites to files and folder trees.
//!
//! Each file is read whole, rewritten in memory and written back only when
//! it changed. Failures are logged per file and never stop a tree walk.

use crate::Result;
use dispatcher_audit::AuditStep;
use dispatcher_fs::{Fragment, tree};
use std::path::Path;

/// Load `path`, apply `rewrite`, and save when it reports a change.
pub fn rewrite_file(
    path: &Path,
    step: &mut AuditStep,
    rewrite: impl FnOnce(&mut Fragment, &mut AuditStep) -> bool,
) -> Result<bool> {
    let mut fragment = Fragment::load(path)?;
    if !rewrite(&mut fragment, step) {
        return Ok(false);
    }
    fragment.save()?;
    Ok(true)
}

/// Apply `rewrite` to every `*.extension` file below `dir`.
///
/// Symbolic links are skipped so linked fragments are rewritten once,
/// through their real file. Returns the number of files changed.
pub fn rewrite_tree(
    dir: &Path,
    extension: &str,
    step: &mut AuditStep,
    mut rewrite: impl FnMut(&mut Fragment, &mut AuditStep) -> bool,
) -> usize {
    let mut changed = 0;
    for path in tree::files_with_extension(dir, extension, true) {
        match rewrite_file(&path, step, &mut rewrite) {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(e) => tracing::error!("{}: {}", path.display(), e),
        }
    }
    changed
}

/// Like [`rewrite_tree`], restricted to the files directly inside `dir`.
pub fn rewrite_folder(
    dir: &Path,
    extension: &str,
    step: &mut AuditStep,
    mut rewrite: impl FnMut(&mut Fragment, &mut AuditStep) -> bool,
) -> usize {
    let mut changed = 0;
    for path in tree::files_with_extension(dir, extension, false) {
        match rewrite_file(&path, step, &mut rewrite) {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(e) => tracing::error!("{}: {}", path.display(), e),
        }
    }
    changed
}
