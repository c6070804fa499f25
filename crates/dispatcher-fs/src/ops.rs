//! Audited file and folder operations.
//!
//! Every operation is best effort: a missing path is a silent no-op, an
//! OS-level failure is logged and skipped, and each change that did happen
//! is recorded against the running [`AuditStep`].

use crate::NormalizedPath;
use crate::tree::{self, file_name, has_extension};
use dispatcher_audit::{AuditStep, OperationKind};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn exists_as_file(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| !meta.is_dir())
}

fn parent_location(path: &Path) -> String {
    NormalizedPath::new(path.parent().unwrap_or(path)).to_string()
}

/// Delete a single file (or link). Returns whether it was removed.
pub fn delete_file(path: &Path, step: &mut AuditStep) -> bool {
    if !exists_as_file(path) {
        return false;
    }
    match fs::remove_file(path) {
        Ok(()) => {
            let location = NormalizedPath::new(path);
            tracing::info!(path = %location, "Deleted file");
            step.record(
                OperationKind::Deleted,
                parent_location(path),
                format!("Deleted file {location}"),
            );
            true
        }
        Err(e) => {
            tracing::error!("{}: {}", path.display(), e);
            false
        }
    }
}

/// Delete a folder and everything below it.
pub fn delete_folder(path: &Path, step: &mut AuditStep) -> bool {
    if !path.is_dir() {
        return false;
    }
    match fs::remove_dir_all(path) {
        Ok(()) => {
            let location = NormalizedPath::new(path);
            tracing::info!(path = %location, "Deleted folder");
            step.record(
                OperationKind::Deleted,
                location.to_string(),
                format!("Deleted folder {location}"),
            );
            true
        }
        Err(e) => {
            tracing::error!("{}: {}", path.display(), e);
            false
        }
    }
}

/// Rename a file (or link) in place.
pub fn rename_file(src: &Path, dst: &Path, step: &mut AuditStep) -> bool {
    if !exists_as_file(src) {
        return false;
    }
    rename(src, dst, "file", step)
}

/// Rename a folder in place.
pub fn rename_folder(src: &Path, dst: &Path, step: &mut AuditStep) -> bool {
    if !src.is_dir() {
        return false;
    }
    rename(src, dst, "folder", step)
}

fn rename(src: &Path, dst: &Path, what: &str, step: &mut AuditStep) -> bool {
    match fs::rename(src, dst) {
        Ok(()) => {
            tracing::info!(from = %src.display(), to = %dst.display(), "Renamed {what}");
            step.record(
                OperationKind::Renamed,
                parent_location(src),
                format!("Renamed {what} {} to {}", file_name(src), file_name(dst)),
            );
            true
        }
        Err(e) => {
            tracing::error!("{}: {}", src.display(), e);
            false
        }
    }
}

/// Copy `src` into the folder `dest_dir`, keeping its file name.
///
/// Returns the path of the copy.
pub fn copy_file_into(src: &Path, dest_dir: &Path, step: &mut AuditStep) -> Option<PathBuf> {
    if !src.is_file() {
        tracing::warn!(path = %src.display(), "Template file not found, nothing copied");
        return None;
    }
    if let Err(e) = fs::create_dir_all(dest_dir) {
        tracing::error!("{}: {}", dest_dir.display(), e);
        return None;
    }
    let dest = dest_dir.join(file_name(src));
    match fs::copy(src, &dest) {
        Ok(_) => {
            let location = NormalizedPath::new(dest_dir);
            tracing::info!(file = %file_name(src), to = %location, "Copied file");
            step.record(
                OperationKind::Added,
                location.to_string(),
                format!("Copied file {} to {location}", file_name(src)),
            );
            Some(dest)
        }
        Err(e) => {
            tracing::error!("{}: {}", src.display(), e);
            None
        }
    }
}

/// Delete the files directly inside `dir` that have the given extension.
pub fn delete_files_with_extension(dir: &Path, extension: &str, step: &mut AuditStep) {
    for path in tree::list_files(dir) {
        if has_extension(&path, extension) {
            delete_file(&path, step);
        }
    }
}

/// Delete the files directly inside `dir` whose name contains `needle`
/// somewhere before an extension dot.
pub fn delete_files_containing(dir: &Path, needle: &str, step: &mut AuditStep) {
    for path in tree::list_files(dir) {
        let name = file_name(&path);
        let matches = name
            .match_indices(needle)
            .any(|(idx, _)| name[idx + needle.len()..].contains('.'));
        if matches {
            delete_file(&path, step);
        }
    }
}

/// Delete the files directly inside `dir` that lack the given extension and
/// return every file below `dir` (recursively) that has it.
pub fn delete_files_not_matching(dir: &Path, extension: &str, step: &mut AuditStep) -> Vec<PathBuf> {
    for path in tree::list_files(dir) {
        if !has_extension(&path, extension) {
            delete_file(&path, step);
        }
    }
    tree::files_with_extension(dir, extension, true)
}

/// Delete files in `dest_dir` that have no namesake in `src_dir`.
///
/// Used to drop available fragments no enabled link refers to. Nothing is
/// deleted unless both folders exist.
pub fn remove_unmatched_by_name(src_dir: &Path, dest_dir: &Path, step: &mut AuditStep) {
    if !src_dir.is_dir() || !dest_dir.is_dir() {
        return;
    }
    let kept: HashSet<String> = tree::list_files(src_dir)
        .iter()
        .map(|path| file_name(path))
        .collect();
    for path in tree::list_files(dest_dir) {
        if !kept.contains(&file_name(&path)) {
            delete_file(&path, step);
        }
    }
}

/// Point a link (real or placeholder) at a renamed target.
///
/// `rename` maps the old target file name to the new one. Returns whether
/// the link changed.
pub fn retarget_link(
    link: &Path,
    rename: impl Fn(&str) -> String,
    step: &mut AuditStep,
) -> bool {
    let is_symlink = fs::symlink_metadata(link).is_ok_and(|meta| meta.file_type().is_symlink());
    let old_target = if is_symlink {
        match fs::read_link(link) {
            Ok(target) => NormalizedPath::new(target).to_string(),
            Err(e) => {
                tracing::error!("{}: {}", link.display(), e);
                return false;
            }
        }
    } else if tree::is_link_like(link) {
        match fs::read_to_string(link) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::error!("{}: {}", link.display(), e);
                return false;
            }
        }
    } else {
        return false;
    };

    let (dir, old_name) = match old_target.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, old_target.as_str()),
    };
    let new_name = rename(old_name);
    if new_name == old_name {
        return false;
    }
    let new_target = match dir {
        Some(dir) => format!("{dir}/{new_name}"),
        None => new_name,
    };

    let result = if is_symlink {
        relink(link, &new_target)
    } else {
        fs::write(link, &new_target)
    };
    match result {
        Ok(()) => {
            tracing::info!(link = %link.display(), from = %old_target, to = %new_target, "Renamed link target");
            step.record(
                OperationKind::Renamed,
                NormalizedPath::new(link).to_string(),
                format!("Renamed symlink target {old_target} to {new_target}"),
            );
            true
        }
        Err(e) => {
            tracing::error!("{}: {}", link.display(), e);
            false
        }
    }
}

#[cfg(unix)]
fn relink(link: &Path, target: &str) -> std::io::Result<()> {
    fs::remove_file(link)?;
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn relink(link: &Path, target: &str) -> std::io::Result<()> {
    fs::write(link, target)
}
