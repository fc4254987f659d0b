use crate::parse::QuoteContext;

/// Re-escape a resolved term for the quoting context its group sits in.
pub fn escape_term(term: &str, quote: QuoteContext) -> String {
    match quote {
        QuoteContext::Plain => term.replace('\'', "\\'").replace('"', "\\\""),
        QuoteContext::Single => term.replace('\'', "'\\''"),
        QuoteContext::Double => term.to_string(),
    }
}

pub fn escape_spaces(term: &str) -> String {
    term.replace(' ', "\\ ")
}

/// Escape a term for one slot. Unquoted node names also get their spaces
/// escaped so each stays a single word.
pub fn quote_term(term: &str, node: bool, quote: QuoteContext) -> String {
    if node && quote == QuoteContext::Plain {
        escape_term(&escape_spaces(term), quote)
    } else {
        escape_term(term, quote)
    }
}
