//! Normalized path handling for report locations and provenance comments

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Audit locations, provenance comments and `file:line` diagnostics are
/// rendered from this form so the report reads the same on every platform.
/// Native paths are only produced at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let inner = if self.inner.is_empty() {
            segment
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self { inner }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// The tail of the path starting at the first component equal to
    /// `marker`, e.g. `src/conf.d/x.vhost` for marker `src`.
    ///
    /// Falls back to the whole path when no component matches.
    pub fn from_marker(&self, marker: &str) -> &str {
        let mut offset = 0;
        for component in self.inner.split('/') {
            if component == marker {
                return &self.inner[offset..];
            }
            offset += component.len() + 1;
        }
        &self.inner
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("target/src/conf.d/a.vhost", "src", "src/conf.d/a.vhost")]
    #[case("./target/src/conf.d/a.vhost", "conf.d", "conf.d/a.vhost")]
    #[case("/srcfoo/conf.d/a.vhost", "src", "/srcfoo/conf.d/a.vhost")]
    #[case("a/b", "missing", "a/b")]
    fn test_from_marker(#[case] path: &str, #[case] marker: &str, #[case] expected: &str) {
        assert_eq!(NormalizedPath::new(path).from_marker(marker), expected);
    }

    #[test]
    fn test_backslashes_are_normalized() {
        let path = NormalizedPath::new("conf.d\\rewrites\\base.rules");
        assert_eq!(path.as_str(), "conf.d/rewrites/base.rules");
        assert_eq!(path.file_name(), Some("base.rules"));
        assert_eq!(path.extension(), Some("rules"));
    }

    #[test]
    fn test_join() {
        let path = NormalizedPath::new("src").join("conf.d");
        assert_eq!(path.as_str(), "src/conf.d");
        assert_eq!(NormalizedPath::new("src/").join("x").as_str(), "src/x");
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        assert_eq!(NormalizedPath::new("a/.hidden").extension(), None);
    }
}
