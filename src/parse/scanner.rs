//! Escape/quote tracking for the template scanner.
//!
//! A single state machine replaces separate "escaping" and "in quotes" flags:
//!
//! - `Plain`: `\` escapes the next character, `'` and `"` open quotes.
//! - `Single`: `'` closes; `\` still escapes anything but `'`, so `\@` and
//!   `\,` keep working inside single-quoted words.
//! - `Double`: `"` closes; `\` escapes the next character.
//! - `Escaped`: the next character is literal, then the prior quote state
//!   resumes.
//!
//! Quote transitions can be switched off per character, which the group
//! parser does while a group is open.

/// Characters treated as glob metacharacters in filesystem directives.
pub const GLOB_CHARS: [char; 5] = ['*', '?', '!', '{', '}'];

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum QuoteContext {
    #[default]
    Plain,
    Single,
    Double,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ScanState {
    Plain,
    Escaped { resume: QuoteContext },
    Single,
    Double,
}

impl ScanState {
    fn from_context(ctx: QuoteContext) -> Self {
        match ctx {
            QuoteContext::Plain => ScanState::Plain,
            QuoteContext::Single => ScanState::Single,
            QuoteContext::Double => ScanState::Double,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scanner {
    state: ScanState,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Plain,
        }
    }

    /// Feed one character. Returns `true` when the character was consumed as
    /// an escaped literal.
    pub fn step(&mut self, ch: char, track_quotes: bool) -> bool {
        match self.state {
            ScanState::Escaped { resume } => {
                if resume == QuoteContext::Single && ch == '\'' && track_quotes {
                    // Backslashes are literal at the end of a single-quoted word.
                    self.state = ScanState::Plain;
                    return false;
                }
                self.state = ScanState::from_context(resume);
                true
            }
            ScanState::Plain => {
                match ch {
                    '\\' => {
                        self.state = ScanState::Escaped {
                            resume: QuoteContext::Plain,
                        }
                    }
                    '\'' if track_quotes => self.state = ScanState::Single,
                    '"' if track_quotes => self.state = ScanState::Double,
                    _ => {}
                }
                false
            }
            ScanState::Single => {
                match ch {
                    '\\' => {
                        self.state = ScanState::Escaped {
                            resume: QuoteContext::Single,
                        }
                    }
                    '\'' if track_quotes => self.state = ScanState::Plain,
                    _ => {}
                }
                false
            }
            ScanState::Double => {
                match ch {
                    '\\' => {
                        self.state = ScanState::Escaped {
                            resume: QuoteContext::Double,
                        }
                    }
                    '"' if track_quotes => self.state = ScanState::Plain,
                    _ => {}
                }
                false
            }
        }
    }

    pub fn is_escaping(&self) -> bool {
        matches!(self.state, ScanState::Escaped { .. })
    }

    pub fn quote_context(&self) -> QuoteContext {
        match self.state {
            ScanState::Plain => QuoteContext::Plain,
            ScanState::Single => QuoteContext::Single,
            ScanState::Double => QuoteContext::Double,
            ScanState::Escaped { resume } => resume,
        }
    }
}

/// True when the character at byte `n` follows an unescaped backslash.
pub fn is_escaped(text: &str, n: usize) -> bool {
    if n == 0 || n > text.len() {
        return false;
    }
    let run = text.as_bytes()[..n]
        .iter()
        .rev()
        .take_while(|b| **b == b'\\')
        .count();
    run % 2 == 1
}

/// Split on unescaped `sep`, keeping escapes intact in each piece.
pub fn split_unescaped(text: &str, sep: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut buf = String::new();
    let mut scanner = Scanner::new();
    for ch in text.chars() {
        let escaped = scanner.step(ch, false);
        if ch == sep && !escaped {
            pieces.push(std::mem::take(&mut buf));
            continue;
        }
        buf.push(ch);
    }
    pieces.push(buf);
    pieces
}

/// Restore `\<delimiter>` and `\,` to their literal characters.
pub fn unescape_structural(text: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek().copied() {
                Some(next) if next == delimiter || next == ',' => {
                    out.push(next);
                    chars.next();
                }
                Some('\\') => {
                    out.push_str("\\\\");
                    chars.next();
                }
                _ => out.push('\\'),
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Undo the shell quoting a group body picked up from its surrounding word.
///
/// A single-quoted word spells `'` as `'\''`; an unquoted word spells quotes
/// as `\'` and `\"`. Terms are re-escaped for their slot when rendered.
pub fn unquote_group_body(body: &str, quote: QuoteContext) -> String {
    match quote {
        QuoteContext::Single => body.replace("'\\''", "'"),
        QuoteContext::Plain => {
            let mut out = String::with_capacity(body.len());
            let mut chars = body.chars();
            while let Some(ch) = chars.next() {
                if ch != '\\' {
                    out.push(ch);
                    continue;
                }
                match chars.next() {
                    Some(next @ ('\'' | '"')) => out.push(next),
                    Some(next) => {
                        out.push(ch);
                        out.push(next);
                    }
                    None => out.push(ch),
                }
            }
            out
        }
        QuoteContext::Double => body.to_string(),
    }
}

/// True when `text` holds at least one unescaped glob metacharacter.
pub fn has_globs(text: &str) -> bool {
    let mut scanner = Scanner::new();
    text.chars()
        .any(|ch| !scanner.step(ch, false) && GLOB_CHARS.contains(&ch))
}

pub fn unescape_glob_chars(text: &str) -> String {
    let mut out = text.to_string();
    for ch in GLOB_CHARS {
        out = out.replace(&format!("\\{ch}"), &ch.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escaped_positions() {
        assert!(is_escaped("He\\llo", 3));
        assert!(!is_escaped("He\\llo", 4));
        assert!(!is_escaped("He\\llo", 2));
        assert!(is_escaped("\\Hello", 1));
        assert!(is_escaped("Hell\\o", 5));
        assert!(!is_escaped("a\\\\b", 3));
        assert!(!is_escaped("abc", 0));
    }

    #[test]
    fn quote_context_follows_quotes() {
        let mut scanner = Scanner::new();
        let mut seen = Vec::new();
        for ch in "a 'b' \"c\\\"d\" e".chars() {
            scanner.step(ch, true);
            seen.push(scanner.quote_context());
        }
        assert_eq!(seen[0], QuoteContext::Plain);
        assert_eq!(seen[2], QuoteContext::Single);
        assert_eq!(seen[4], QuoteContext::Plain);
        // The escaped quote inside double quotes does not close them.
        assert_eq!(seen[10], QuoteContext::Double);
        assert_eq!(seen[12], QuoteContext::Plain);
    }

    #[test]
    fn suppressed_quotes_do_not_toggle() {
        let mut scanner = Scanner::new();
        for ch in "it's".chars() {
            scanner.step(ch, false);
        }
        assert_eq!(scanner.quote_context(), QuoteContext::Plain);
    }

    #[test]
    fn backslash_before_closing_single_quote_is_literal() {
        let mut scanner = Scanner::new();
        for ch in "'a\\'".chars() {
            scanner.step(ch, true);
        }
        assert_eq!(scanner.quote_context(), QuoteContext::Plain);
        assert!(!scanner.is_escaping());
    }

    #[test]
    fn escapes_work_inside_single_quotes() {
        let mut scanner = Scanner::new();
        let mut literal = Vec::new();
        for ch in "'x\\@y'".chars() {
            literal.push(scanner.step(ch, true));
        }
        assert_eq!(literal, vec![false, false, false, true, false, false]);
    }

    #[test]
    fn structural_unescape() {
        assert_eq!(unescape_structural("Test \\@1\\, both", '@'), "Test @1, both");
        assert_eq!(unescape_structural("Test\\@ at", '@'), "Test@ at");
        assert_eq!(unescape_structural("Test \\,comma", '@'), "Test ,comma");
        assert_eq!(unescape_structural("keep \\* and \\n", '@'), "keep \\* and \\n");
        assert_eq!(unescape_structural("pct\\%", '%'), "pct%");
    }

    #[test]
    fn split_respects_escapes() {
        assert_eq!(
            split_unescaped("hello,\\@well\\, goodbye\\@,farewell", ','),
            vec!["hello", "\\@well\\, goodbye\\@", "farewell"]
        );
        assert_eq!(split_unescaped("", ','), vec![""]);
        assert_eq!(split_unescaped("a,,b", ','), vec!["a", "", "b"]);
    }

    #[test]
    fn group_bodies_lose_their_word_quoting() {
        assert_eq!(
            unquote_group_body("it'\\''s,ok", QuoteContext::Single),
            "it's,ok"
        );
        assert_eq!(
            unquote_group_body("it\\'s,\\\"x\\\"", QuoteContext::Plain),
            "it's,\"x\""
        );
        assert_eq!(unquote_group_body("a\\,b\\\\'", QuoteContext::Plain), "a\\,b\\\\'");
        assert_eq!(unquote_group_body("it'\\''s", QuoteContext::Double), "it'\\''s");
    }

    #[test]
    fn glob_detection() {
        assert!(has_globs("/tmp/*/"));
        assert!(has_globs("/tmp/a?c/"));
        assert!(has_globs("/tmp/1!2/"));
        assert!(has_globs("/tmp/3{4/"));
        assert!(has_globs("/tmp/5}6/"));
        assert!(!has_globs("/tmp/506/"));
        assert!(!has_globs("/tmp/a\\*b/"));
    }

    #[test]
    fn glob_unescape() {
        assert_eq!(unescape_glob_chars("a\\*b\\?c\\!d\\{e\\}"), "a*b?c!d{e}");
        assert_eq!(unescape_glob_chars("plain\\ text"), "plain\\ text");
    }

    proptest! {
        #[test]
        fn escaped_commas_never_split(parts in proptest::collection::vec("[a-z ]{0,8}", 1..6)) {
            let joined = parts.join("\\,");
            let pieces = split_unescaped(&joined, ',');
            prop_assert_eq!(pieces.len(), 1);
            prop_assert_eq!(unescape_structural(&pieces[0], '@'), parts.join(","));
        }

        #[test]
        fn unescaped_commas_split_exactly(parts in proptest::collection::vec("[a-z]{0,8}", 1..6)) {
            let joined = parts.join(",");
            prop_assert_eq!(split_unescaped(&joined, ','), parts);
        }
    }
}
