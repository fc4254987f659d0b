//! Directive expansion turns one raw term into its resolved terms.
//! Structural escapes are removed first, then at most one directive applies:
//! `A..B` ranges, `lines:` files, or `files:`/`dirs:`/`all:` globs.
//! Terms come out as plain values; `quoting` fits them to a slot later.
use log::debug;

use crate::error::LupResult;
use crate::parse::unescape_structural;

mod lines;
mod nodes;
mod quoting;
mod range;

pub use lines::read_lines;
pub use nodes::{expand_nodes, NodeExpansion, NodeKind};
pub use quoting::quote_term;
pub use range::{expand_range, parse_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    Range { first: &'a str, last: &'a str },
    Lines { path: &'a str },
    Nodes { kind: NodeKind, pattern: &'a str },
    Literal,
}

pub fn parse_directive(term: &str) -> Directive<'_> {
    if let Some((first, last)) = parse_range(term) {
        return Directive::Range { first, last };
    }
    if let Some(path) = term.strip_prefix("lines:") {
        return Directive::Lines { path };
    }
    if let Some((kind, pattern)) = NodeKind::split_directive(term) {
        return Directive::Nodes { kind, pattern };
    }
    Directive::Literal
}

/// Terms produced by one raw term. Quoting for the slot happens at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedTerms {
    pub terms: Vec<String>,
    /// Terms are filesystem node names.
    pub nodes: bool,
    /// The group's external path moves out of the template and into the group.
    pub absorbed: bool,
}

pub fn expand_term(
    raw: &str,
    external_path: Option<&str>,
    delimiter: char,
) -> LupResult<ExpandedTerms> {
    let term = unescape_structural(raw, delimiter);
    let (terms, nodes, absorbed) = match parse_directive(&term) {
        Directive::Range { first, last } => (expand_range(first, last)?, false, false),
        Directive::Lines { path } => (read_lines(path)?, false, false),
        Directive::Nodes { kind, pattern } => {
            let expansion = expand_nodes(kind, pattern, external_path)?;
            (expansion.nodes, true, expansion.absorbed)
        }
        Directive::Literal => (vec![term.clone()], false, false),
    };
    debug!(
        "expand event=term raw={raw:?} produced={} absorbed={absorbed}",
        terms.len()
    );
    Ok(ExpandedTerms {
        terms,
        nodes,
        absorbed,
    })
}
