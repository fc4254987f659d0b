//! Cartesian-product command generation.
//!
//! `Commands` walks the product as an odometer: one cursor per group, the
//! last group turning fastest. Only the current combination is held in
//! memory, so large products stream instead of materializing.
use log::debug;

use crate::error::{ErrorKind, LupError, LupResult};
use crate::expansion::quote_term;
use crate::parse::{placeholder, unescape_structural, QuoteContext, Segment};

/// One resolved value, unescaped. Quoting is applied per slot when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub value: String,
    /// Filesystem node name; spaces are escaped in unquoted slots.
    pub node: bool,
}

impl Term {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            node: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub hidden: bool,
    pub terms: Vec<Term>,
    pub external_path: Option<String>,
    /// External path text was cut from the template and is rendered here.
    pub absorbed: bool,
    pub quote: QuoteContext,
    /// Earlier group this one repeats, 1-indexed. Decided from the written
    /// terms, so expanded values that happen to be numbers never qualify.
    pub backref: Option<usize>,
}

/// A lone bare integer term refers back to an earlier group.
pub fn parse_backref<S: AsRef<str>>(terms: &[S]) -> Option<usize> {
    match terms {
        [only] => {
            let only = only.as_ref();
            if !only.is_empty() && only.chars().all(|c| c.is_ascii_digit()) {
                Some(only.parse::<usize>().unwrap_or(usize::MAX))
            } else {
                None
            }
        }
        _ => None,
    }
}

impl Group {
    /// Slot text for `term`, or `None` when the group is hidden.
    fn render(&self, term: &Term) -> Option<String> {
        if self.hidden {
            return None;
        }
        let quoted = quote_term(&term.value, term.node, self.quote);
        match (&self.external_path, self.absorbed) {
            (Some(path), true) => Some(format!("{path}{quoted}")),
            _ => Some(quoted),
        }
    }
}

fn is_visible(piece: &(Option<&str>, bool)) -> bool {
    piece.0.is_some_and(|text| !text.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Literal segments have their structural escapes restored here.
    pub fn new(segments: Vec<Segment>, delimiter: char) -> Self {
        let segments = segments
            .into_iter()
            .map(|seg| match seg {
                Segment::Literal(text) => Segment::Literal(unescape_structural(&text, delimiter)),
                slot => slot,
            })
            .collect();
        Self { segments }
    }

    pub fn slot_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|seg| matches!(seg, Segment::Slot(_)))
            .count()
    }

    pub fn marked(&self) -> String {
        self.segments
            .iter()
            .map(|seg| match seg {
                Segment::Literal(text) => text.clone(),
                Segment::Slot(idx) => placeholder(*idx),
            })
            .collect()
    }

    /// Hidden slots are `None`. Whitespace they strand at either end of the
    /// command is dropped; everything else is kept as written.
    fn render(&self, slots: &[Option<String>]) -> String {
        let pieces: Vec<(Option<&str>, bool)> = self
            .segments
            .iter()
            .map(|seg| match seg {
                Segment::Literal(text) => (Some(text.as_str()), true),
                Segment::Slot(idx) => (slots[*idx].as_deref(), false),
            })
            .collect();
        let Some(first) = pieces.iter().position(is_visible) else {
            return String::new();
        };
        let last = pieces.iter().rposition(is_visible).unwrap_or(first);
        let hidden_before = pieces[..first].iter().any(|piece| piece.0.is_none());
        let hidden_after = pieces[last + 1..].iter().any(|piece| piece.0.is_none());

        let mut out = String::new();
        for (idx, &(text, literal)) in pieces.iter().enumerate() {
            let mut text = text.unwrap_or("");
            if literal && idx == first && hidden_before {
                text = text.trim_start();
            }
            if literal && idx == last && hidden_after {
                text = text.trim_end();
            }
            out.push_str(text);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    template: Template,
    groups: Vec<Group>,
}

impl Generator {
    /// Validates every backreference so no command is yielded before a failure.
    pub fn new(template: Template, groups: Vec<Group>) -> LupResult<Self> {
        if template.slot_count() != groups.len() {
            return Err(LupError::new(
                ErrorKind::Parse,
                format!(
                    "Template has {} placeholders for {} groups",
                    template.slot_count(),
                    groups.len()
                ),
            ));
        }
        for (idx, group) in groups.iter().enumerate() {
            match group.backref {
                Some(0) => {
                    return Err(LupError::new(
                        ErrorKind::Backref,
                        format!("Invalid backref 0 in group {}", idx + 1),
                    )
                    .with_context("Backrefs count groups from 1"));
                }
                Some(n) if n > idx => {
                    return Err(LupError::new(
                        ErrorKind::Backref,
                        format!(
                            "Forward references are not possible: group {} refers to group {n}",
                            idx + 1
                        ),
                    )
                    .with_context(format!(
                        "A backref can only name one of the {idx} groups before it"
                    )));
                }
                _ => {}
            }
        }
        debug!(
            "generate event=ready groups={} template={:?}",
            groups.len(),
            template.marked()
        );
        Ok(Self { template, groups })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Number of commands the product yields, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.backref.is_none())
            .try_fold(1usize, |acc, g| acc.checked_mul(g.terms.len()))
            .unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn commands(&self) -> Commands<'_> {
        Commands {
            generator: self,
            cursors: vec![0; self.groups.len()],
            done: self.is_empty(),
        }
    }
}

impl<'a> IntoIterator for &'a Generator {
    type Item = String;
    type IntoIter = Commands<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands()
    }
}

pub struct Commands<'a> {
    generator: &'a Generator,
    cursors: Vec<usize>,
    done: bool,
}

impl Commands<'_> {
    fn current(&self) -> String {
        let groups = &self.generator.groups;
        let mut bound: Vec<&Term> = Vec::with_capacity(groups.len());
        let mut slots = Vec::with_capacity(groups.len());
        for (idx, group) in groups.iter().enumerate() {
            match group.backref {
                Some(n) => {
                    // Re-quoted for this slot's own context.
                    let term = bound[n - 1];
                    bound.push(term);
                    slots.push(
                        (!group.hidden).then(|| quote_term(&term.value, term.node, group.quote)),
                    );
                }
                None => {
                    let term = &group.terms[self.cursors[idx]];
                    bound.push(term);
                    slots.push(group.render(term));
                }
            }
        }
        self.generator.template.render(&slots)
    }

    fn advance(&mut self) {
        let groups = &self.generator.groups;
        for idx in (0..groups.len()).rev() {
            if groups[idx].backref.is_some() {
                continue;
            }
            self.cursors[idx] += 1;
            if self.cursors[idx] < groups[idx].terms.len() {
                return;
            }
            self.cursors[idx] = 0;
        }
        self.done = true;
    }
}

impl Iterator for Commands<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let command = self.current();
        self.advance();
        Some(command)
    }
}
