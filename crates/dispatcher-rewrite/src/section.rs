//! Locating named sections without a grammar.
//!
//! A section starts at a line whose trimmed text begins with a header token
//! (`/rules`, `<VirtualHost`) and ends at the first close token found at
//! exactly the indentation recorded for the section. Nested blocks that reuse
//! the close token at a deeper indentation stay inside the section.
//!
//! ```text
//! /cache {              header, width 0
//!   /rules {            nested, part of the body
//!   }                   width 2, still body
//! }                     width 0, close
//! ```

use crate::indent::leading_width;

/// How a section is delimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionSyntax {
    /// `/name {` ... `}`; the opening brace may sit on the following line.
    Brace,
    /// `<Tag ...>` ... `</Tag>`.
    Tag { close: String },
}

impl SectionSyntax {
    /// Tag syntax closed by `</name>`.
    pub fn tag(name: &str) -> Self {
        Self::Tag {
            close: format!("</{name}>"),
        }
    }

    fn close_token(&self) -> &str {
        match self {
            Self::Brace => "}",
            Self::Tag { close } => close,
        }
    }
}

/// Where a line falls relative to the tracked section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePlace {
    Outside,
    Header,
    /// A lone `{` on the line after a brace header.
    Opener,
    Body,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    AwaitingOpener,
    Inside,
}

/// Classifies lines one at a time against a section header.
#[derive(Debug, Clone)]
pub struct SectionCursor<'a> {
    header: &'a str,
    syntax: &'a SectionSyntax,
    state: State,
    indent: usize,
    depth: usize,
}

impl<'a> SectionCursor<'a> {
    pub fn new(header: &'a str, syntax: &'a SectionSyntax) -> Self {
        Self {
            header,
            syntax,
            state: State::Outside,
            indent: 0,
            depth: 0,
        }
    }

    /// Whether the cursor is currently inside the section.
    pub fn inside(&self) -> bool {
        self.state != State::Outside
    }

    /// Brace depth within the section: 1 for the section body, more inside
    /// nested blocks, 0 outside.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Reference indentation of the current section.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Advance over `line` and report where it falls.
    pub fn classify(&mut self, line: &str) -> LinePlace {
        let trimmed = line.trim();
        match self.state {
            State::Outside => {
                if !trimmed.starts_with(self.header) {
                    return LinePlace::Outside;
                }
                self.indent = leading_width(line);
                self.depth = 1;
                self.state = match self.syntax {
                    SectionSyntax::Brace if !trimmed.ends_with('{') => State::AwaitingOpener,
                    _ => State::Inside,
                };
                LinePlace::Header
            }
            State::AwaitingOpener => {
                // The adopted line fixes the reference indentation
                self.indent = leading_width(line);
                self.state = State::Inside;
                if trimmed == "{" {
                    LinePlace::Opener
                } else {
                    self.track_depth(trimmed);
                    LinePlace::Body
                }
            }
            State::Inside => {
                if trimmed == self.syntax.close_token() && leading_width(line) == self.indent {
                    self.state = State::Outside;
                    self.depth = 0;
                    return LinePlace::Close;
                }
                self.track_depth(trimmed);
                LinePlace::Body
            }
        }
    }

    fn track_depth(&mut self, trimmed: &str) {
        if matches!(self.syntax, SectionSyntax::Brace) {
            let opens = trimmed.matches('{').count();
            let closes = trimmed.matches('}').count();
            self.depth = (self.depth + opens).saturating_sub(closes).max(1);
        }
    }
}

/// Line indices of one section occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    /// The header line.
    pub header: usize,
    /// A lone `{` line adopted from below the header.
    pub opener: Option<usize>,
    /// First body line.
    pub body_start: usize,
    /// The close line, `None` when the section runs to the end of the file.
    pub close: Option<usize>,
    /// Reference indentation width.
    pub indent: usize,
}

impl SectionSpan {
    /// Body line indices, given the total line count.
    pub fn body(&self, len: usize) -> std::ops::Range<usize> {
        self.body_start..self.close.unwrap_or(len)
    }
}

/// Find every occurrence of a section, in file order.
///
/// # Example
/// ```
/// use dispatcher_rewrite::section::{SectionSyntax, locate_sections};
///
/// let lines = ["/cache {", "  /rules {", "  }", "}"];
/// let spans = locate_sections(&lines, "/cache", &SectionSyntax::Brace);
/// assert_eq!(spans.len(), 1);
/// assert_eq!(spans[0].close, Some(3));
/// ```
pub fn locate_sections<S: AsRef<str>>(
    lines: &[S],
    header: &str,
    syntax: &SectionSyntax,
) -> Vec<SectionSpan> {
    let mut cursor = SectionCursor::new(header, syntax);
    let mut spans = Vec::new();
    let mut current: Option<SectionSpan> = None;

    for (idx, line) in lines.iter().enumerate() {
        match cursor.classify(line.as_ref()) {
            LinePlace::Header => {
                current = Some(SectionSpan {
                    header: idx,
                    opener: None,
                    body_start: idx + 1,
                    close: None,
                    indent: cursor.indent(),
                });
            }
            LinePlace::Opener => {
                if let Some(span) = current.as_mut() {
                    span.opener = Some(idx);
                    span.body_start = idx + 1;
                    span.indent = cursor.indent();
                }
            }
            LinePlace::Body => {
                if let Some(span) = current.as_mut() {
                    span.indent = cursor.indent();
                }
            }
            LinePlace::Close => {
                if let Some(mut span) = current.take() {
                    span.close = Some(idx);
                    spans.push(span);
                }
            }
            LinePlace::Outside => {}
        }
    }

    if let Some(span) = current {
        tracing::warn!(header, line = span.header + 1, "Section not closed before end of file");
        spans.push(span);
    }
    spans
}

/// First occurrence of a section, if any.
pub fn locate_section<S: AsRef<str>>(
    lines: &[S],
    header: &str,
    syntax: &SectionSyntax,
) -> Option<SectionSpan> {
    locate_sections(lines, header, syntax).into_iter().next()
}

/// Mask of lines belonging to a section body, header and close excluded.
pub fn body_mask<S: AsRef<str>>(lines: &[S], header: &str, syntax: &SectionSyntax) -> Vec<bool> {
    let mut mask = vec![false; lines.len()];
    for span in locate_sections(lines, header, syntax) {
        for idx in span.body(lines.len()) {
            mask[idx] = true;
        }
    }
    mask
}
