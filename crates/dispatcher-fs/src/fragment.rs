//! The line store every rewrite operates on.
//!
//! A [`Fragment`] is one configuration file held as an ordered list of
//! lines. Each line keeps its own terminator so that writing the lines back
//! reproduces untouched content byte for byte.

use crate::{NormalizedPath, Result, io};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    path: PathBuf,
    lines: Vec<String>,
}

impl Fragment {
    /// Read a whole file into memory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = io::read_text(path)?;
        Ok(Self::from_text(path, &text))
    }

    /// Build a fragment from in-memory text, as if it had been read from `path`.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward-slash form of the path, used for report locations.
    pub fn location(&self) -> NormalizedPath {
        NormalizedPath::new(&self.path)
    }

    /// `file:line` label for a zero-based line index.
    pub fn line_location(&self, index: usize) -> String {
        format!("{}:{}", self.location(), index + 1)
    }

    /// Lines including their terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Replace the whole line sequence. Returns whether anything changed.
    pub fn set_lines(&mut self, lines: Vec<String>) -> bool {
        if lines == self.lines {
            return false;
        }
        self.lines = lines;
        true
    }

    /// The terminator used by this file: that of its first terminated
    /// line, `\n` when none is terminated.
    pub fn newline(&self) -> &'static str {
        match self.lines.iter().find(|l| l.ends_with('\n')) {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        }
    }

    pub fn text(&self) -> String {
        self.lines.concat()
    }

    /// Overwrite the backing file with the current lines.
    pub fn save(&self) -> Result<()> {
        io::write_text(&self.path, &self.text())?;
        tracing::debug!(path = %self.path.display(), lines = self.lines.len(), "Saved fragment");
        Ok(())
    }
}

/// A line with its terminator removed.
pub fn content(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// The terminator of `line`, empty for a final unterminated line.
pub fn terminator(line: &str) -> &str {
    &line[content(line).len()..]
}
