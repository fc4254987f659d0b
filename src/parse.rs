//! Template parsing: locate delimiter-bounded groups in a joined command line.
//!
//! The parser never touches the filesystem. It yields the literal segments of
//! the template interleaved with group slots, plus each group's raw terms and
//! the context needed to expand them later.

mod group_parser;
mod scanner;

pub use group_parser::parse_template;
pub use scanner::{
    has_globs, is_escaped, unescape_glob_chars, unescape_structural, QuoteContext, Scanner,
    GLOB_CHARS,
};

/// Sentinel that frames printable placeholders; never produced by user input.
pub const PLACEHOLDER_MARKER: char = '\x1e';

pub fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_MARKER}GROUP_{index}{PLACEHOLDER_MARKER}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Raw template text; structural escapes are still present.
    Literal(String),
    /// Position of group `n`, numbered in closing order.
    Slot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGroup {
    pub hidden: bool,
    /// Comma-split terms; escaped commas and delimiters are kept verbatim.
    pub raw_terms: Vec<String>,
    /// Path fragment glued to the opening delimiter, if it contains a `/`.
    pub external_path: Option<String>,
    /// Quoting context at the opening delimiter.
    pub quote: QuoteContext,
    /// Byte offset of the opening delimiter.
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    pub segments: Vec<Segment>,
    pub groups: Vec<RawGroup>,
}

impl ParsedTemplate {
    /// Drop group `index`'s external path from the literal that precedes it.
    pub fn absorb_external_path(&mut self, index: usize) {
        let Some(path) = self
            .groups
            .get(index)
            .and_then(|g| g.external_path.clone())
        else {
            return;
        };
        let Some(slot) = self
            .segments
            .iter()
            .position(|seg| *seg == Segment::Slot(index))
        else {
            return;
        };
        if slot == 0 {
            return;
        }
        if let Segment::Literal(text) = &mut self.segments[slot - 1] {
            if text.ends_with(&path) {
                text.truncate(text.len() - path.len());
            }
        }
    }

    /// Template text with printable placeholders in place of each group.
    pub fn marked(&self) -> String {
        self.segments
            .iter()
            .map(|seg| match seg {
                Segment::Literal(text) => text.clone(),
                Segment::Slot(idx) => placeholder(*idx),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn absorb_strips_only_the_path_suffix() {
        let mut parsed = parse_template("ls /tmp/foo/@files:*@ done", &Config::default()).unwrap();
        assert_eq!(
            parsed.groups[0].external_path.as_deref(),
            Some("/tmp/foo/")
        );
        parsed.absorb_external_path(0);
        assert_eq!(
            parsed.segments,
            vec![
                Segment::Literal("ls ".to_string()),
                Segment::Slot(0),
                Segment::Literal(" done".to_string()),
            ]
        );
    }

    #[test]
    fn marked_template_has_one_placeholder_per_group() {
        let parsed = parse_template("@a,b@ x @c@ @d@", &Config::default()).unwrap();
        let marked = parsed.marked();
        assert_eq!(marked.matches(PLACEHOLDER_MARKER).count(), 2 * parsed.groups.len());
        assert!(marked.contains(&placeholder(2)));
    }
}
