//! Directory walking and staging copies

use crate::{Error, Result, io};
use std::fs;
use std::path::{Path, PathBuf};

/// Files under `dir` whose extension is `extension`, sorted by path.
///
/// Symbolic links and dot-files are skipped, so rewrites only ever touch
/// the real fragment a link points at once. A missing directory yields an
/// empty list.
pub fn files_with_extension(dir: &Path, extension: &str, recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect(dir, recursive, &mut |path| {
        if has_extension(path, extension) {
            files.push(path.to_path_buf());
        }
    });
    files.sort();
    files
}

/// Every regular file below `dir`, at any depth, sorted by path.
///
/// Same skipping rules as [`files_with_extension`].
pub fn files_below(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect(dir, true, &mut |path| files.push(path.to_path_buf()));
    files.sort();
    files
}

/// Files and links directly inside `dir`, sorted.
///
/// Dangling links are included; links to directories are not.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_ok_and(|ft| {
                ft.is_file() || (ft.is_symlink() && !entry.path().is_dir())
            })
        })
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files
}

/// Whether `path` has the given extension (without the leading dot).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// The final component of `path` as a string, empty if it has none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `path` behaves like a link into another folder.
///
/// True for real symbolic links, and for checked-out link placeholders:
/// text files holding a single line that starts with `../`.
pub fn is_link_like(path: &Path) -> bool {
    if fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink()) {
        return true;
    }
    match io::read_text(path) {
        Ok(text) => {
            let mut lines = text.lines().filter(|line| !line.trim().is_empty());
            matches!((lines.next(), lines.next()), (Some(first), None) if first.trim_start().starts_with("../"))
        }
        Err(_) => false,
    }
}

/// Recursively copy `src` into `dst`, recreating symbolic links as links.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    let entries = fs::read_dir(src).map_err(|e| Error::io(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| Error::io(&from, e))?;

        if file_type.is_symlink() {
            copy_link(&from, &to)?;
        } else if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| Error::io(&from, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from).map_err(|e| Error::io(from, e))?;
    std::os::unix::fs::symlink(&target, to).map_err(|e| Error::io(to, e))
}

#[cfg(not(unix))]
fn copy_link(from: &Path, to: &Path) -> Result<()> {
    // No portable symlink creation; copy what the link points at
    fs::copy(from, to).map(|_| ()).map_err(|e| Error::io(from, e))
}

fn collect(dir: &Path, recursive: bool, visit: &mut dyn FnMut(&Path)) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                tracing::error!(path = %dir.display(), error = %e, "Cannot read directory");
            }
            return;
        }
    };

    for entry in entries.filter_map(|entry| entry.ok()) {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            if recursive {
                collect(&path, recursive, visit);
            }
        } else if file_type.is_file() {
            visit(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_with_extension_recurses_when_asked() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("a.vhost"), "").unwrap();
        fs::write(temp.path().join("nested/b.vhost"), "").unwrap();
        fs::write(temp.path().join("c.any"), "").unwrap();
        fs::write(temp.path().join(".hidden.vhost"), "").unwrap();

        let flat = files_with_extension(temp.path(), "vhost", false);
        assert_eq!(flat, vec![temp.path().join("a.vhost")]);

        let deep = files_with_extension(temp.path(), "vhost", true);
        assert_eq!(
            deep,
            vec![temp.path().join("a.vhost"), temp.path().join("nested/b.vhost")]
        );
    }

    #[test]
    fn test_files_below_takes_every_extension() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("a.any"), "").unwrap();
        fs::write(temp.path().join("nested/b.txt"), "").unwrap();

        assert_eq!(
            files_below(temp.path()),
            vec![temp.path().join("a.any"), temp.path().join("nested/b.txt")]
        );
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(files_with_extension(&temp.path().join("nope"), "any", true).is_empty());
        assert!(list_files(&temp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_link_placeholder_is_link_like() {
        let temp = TempDir::new().unwrap();
        let placeholder = temp.path().join("default.vhost");
        fs::write(&placeholder, "../available_vhosts/default.vhost").unwrap();
        let regular = temp.path().join("custom.vhost");
        fs::write(&regular, "<VirtualHost *:80>\n</VirtualHost>\n").unwrap();

        assert!(is_link_like(&placeholder));
        assert!(!is_link_like(&regular));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_preserves_symlinks() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("available")).unwrap();
        fs::create_dir_all(src.join("enabled")).unwrap();
        fs::write(src.join("available/site.vhost"), "x\n").unwrap();
        std::os::unix::fs::symlink("../available/site.vhost", src.join("enabled/site.vhost"))
            .unwrap();

        let dst = temp.path().join("dst");
        copy_tree(&src, &dst).unwrap();

        let link = dst.join("enabled/site.vhost");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&link).unwrap(), "x\n");
        assert!(is_link_like(&link));
    }
}
