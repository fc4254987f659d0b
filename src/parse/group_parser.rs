//! Group discovery.
//!
//! Scans the joined command line once. Outside a group the scanner tracks
//! quotes so each group knows the quoting context it sits in; inside a group
//! only backslash escapes matter.
use log::debug;

use crate::config::Config;
use crate::error::{ErrorKind, LupError, LupResult};

use super::scanner::{split_unescaped, unquote_group_body, QuoteContext, Scanner};
use super::{ParsedTemplate, RawGroup, Segment};

struct OpenGroup {
    start: usize,
    quote: QuoteContext,
    path_start: usize,
}

pub fn parse_template(line: &str, config: &Config) -> LupResult<ParsedTemplate> {
    let delimiter = config.delimiter;
    let delim_len = delimiter.len_utf8();
    let mut segments = Vec::new();
    let mut groups = Vec::new();
    let mut scanner = Scanner::new();
    let mut open: Option<OpenGroup> = None;
    let mut literal_start = 0;
    // Start of the current word fragment; a group glued to it inherits it as a path.
    let mut run_start = 0;
    // Start of the current quoted stretch, where whitespace is part of the word.
    let mut quoted_start = 0;

    for (idx, ch) in line.char_indices() {
        let in_group = open.is_some();
        if scanner.step(ch, !in_group) {
            continue;
        }
        if ch == delimiter {
            match open.take() {
                None => {
                    let quote = scanner.quote_context();
                    open = Some(OpenGroup {
                        start: idx,
                        quote,
                        path_start: path_start(line, quote, quoted_start, run_start, idx),
                    });
                }
                Some(group) => {
                    let content = &line[group.start + delim_len..idx];
                    let candidate = &line[group.path_start..group.start];
                    let external_path = candidate.contains('/').then(|| candidate.to_string());
                    let raw = build_raw_group(content, external_path, group.quote, group.start, config);
                    debug!(
                        "parse event=group index={} start={} hidden={} terms={} quote={:?}",
                        groups.len(),
                        group.start,
                        raw.hidden,
                        raw.raw_terms.len(),
                        raw.quote
                    );
                    segments.push(Segment::Literal(line[literal_start..group.start].to_string()));
                    segments.push(Segment::Slot(groups.len()));
                    groups.push(raw);
                    literal_start = idx + delim_len;
                    run_start = literal_start;
                    quoted_start = literal_start;
                }
            }
            continue;
        }
        if in_group {
            continue;
        }
        if ch == '\'' || ch == '"' {
            run_start = idx + ch.len_utf8();
            quoted_start = run_start;
        } else if ch.is_whitespace() {
            run_start = idx + ch.len_utf8();
        }
    }

    if let Some(group) = open {
        return Err(LupError::new(
            ErrorKind::Parse,
            format!("Unterminated group opened with '{delimiter}'"),
        )
        .with_position(group.start)
        .with_context(format!(
            "Close the group with another '{delimiter}' or escape a literal one as \\{delimiter}"
        )));
    }
    segments.push(Segment::Literal(line[literal_start..].to_string()));

    Ok(ParsedTemplate { segments, groups })
}

/// Inside quotes a path may hold spaces (`'/tmp/my dir/@files:*@'`), so the
/// whole quoted stretch counts when it reads as a path. Otherwise the run
/// since the last whitespace does, which keeps `'cp /a/@files:*@ /b/'` working.
fn path_start(
    line: &str,
    quote: QuoteContext,
    quoted_start: usize,
    run_start: usize,
    open_at: usize,
) -> usize {
    let quoted = &line[quoted_start..open_at];
    if quote != QuoteContext::Plain && quoted.starts_with(['/', '.', '~']) {
        quoted_start
    } else {
        run_start
    }
}

fn build_raw_group(
    content: &str,
    external_path: Option<String>,
    quote: QuoteContext,
    start: usize,
    config: &Config,
) -> RawGroup {
    let (hidden, body) = strip_hidden_marker(content, config.hidden_marker);
    let body = unquote_group_body(&body, quote);
    RawGroup {
        hidden,
        raw_terms: split_unescaped(&body, ','),
        external_path,
        quote,
        start,
    }
}

/// Detect the hidden marker, looking past any leading quote characters.
fn strip_hidden_marker(content: &str, marker: &str) -> (bool, String) {
    let rest = content.trim_start_matches(['\'', '"']);
    let lead = content.len() - rest.len();
    match rest.strip_prefix(marker) {
        Some(after) => (true, format!("{}{}", &content[..lead], after)),
        None => (false, content.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParsedTemplate {
        parse_template(line, &Config::default()).unwrap()
    }

    #[test]
    fn groups_split_on_unescaped_commas() {
        let parsed = parse("echo @hello,\\@well\\, goodbye\\@,farewell@");
        assert_eq!(parsed.groups.len(), 1);
        assert_eq!(
            parsed.groups[0].raw_terms,
            vec!["hello", "\\@well\\, goodbye\\@", "farewell"]
        );
        assert_eq!(
            parsed.segments,
            vec![
                Segment::Literal("echo ".to_string()),
                Segment::Slot(0),
                Segment::Literal(String::new()),
            ]
        );
    }

    #[test]
    fn groups_numbered_left_to_right() {
        let parsed = parse("@rm,nano@ foo_@1,2@");
        assert_eq!(parsed.groups.len(), 2);
        assert_eq!(parsed.groups[0].raw_terms, vec!["rm", "nano"]);
        assert_eq!(parsed.groups[1].raw_terms, vec!["1", "2"]);
        assert_eq!(parsed.groups[1].external_path, None);
        assert_eq!(parsed.groups[1].start, 14);
    }

    #[test]
    fn escaped_delimiters_stay_literal() {
        let parsed = parse("mail me\\@host @a,b@");
        assert_eq!(parsed.groups.len(), 1);
        assert_eq!(
            parsed.segments[0],
            Segment::Literal("mail me\\@host ".to_string())
        );
    }

    #[test]
    fn hidden_marker_is_stripped() {
        let parsed = parse("@-:1..3@ echo");
        assert!(parsed.groups[0].hidden);
        assert_eq!(parsed.groups[0].raw_terms, vec!["1..3"]);

        let parsed = parse("@'-:a,b'@");
        assert!(parsed.groups[0].hidden);
        assert_eq!(parsed.groups[0].raw_terms, vec!["'a", "b'"]);

        let parsed = parse("@a,-:b@");
        assert!(!parsed.groups[0].hidden);
    }

    #[test]
    fn quote_context_recorded_at_open() {
        let parsed = parse("echo \"Iteration @1@\" '@a@' @b@");
        assert_eq!(parsed.groups[0].quote, QuoteContext::Double);
        assert_eq!(parsed.groups[1].quote, QuoteContext::Single);
        assert_eq!(parsed.groups[2].quote, QuoteContext::Plain);
    }

    #[test]
    fn apostrophes_inside_groups_do_not_toggle_quotes() {
        let parsed = parse("echo @it's,fine@ @x@");
        assert_eq!(parsed.groups[0].raw_terms, vec!["it's", "fine"]);
        assert_eq!(parsed.groups[1].quote, QuoteContext::Plain);
    }

    #[test]
    fn external_path_captured_from_glued_fragment() {
        let parsed = parse("cat /tmp/foo/@files:*@");
        assert_eq!(parsed.groups[0].external_path.as_deref(), Some("/tmp/foo/"));

        let parsed = parse("echo '/tmp/foo/@files:*@ (@1@)'");
        assert_eq!(parsed.groups[0].external_path.as_deref(), Some("/tmp/foo/"));
        assert_eq!(parsed.groups[1].external_path, None);

        let parsed = parse("echo prefix_@a@");
        assert_eq!(parsed.groups[0].external_path, None);
    }

    #[test]
    fn quoted_external_path_keeps_its_spaces() {
        let parsed = parse("cat '/tmp/my dir/@files:*@'");
        assert_eq!(
            parsed.groups[0].external_path.as_deref(),
            Some("/tmp/my dir/")
        );

        let parsed = parse("sh -c 'cp /a/@files:*@ /b/'");
        assert_eq!(parsed.groups[0].external_path.as_deref(), Some("/a/"));

        let parsed = parse("echo '/x/@files:*@ /y/@dirs:*@'");
        assert_eq!(parsed.groups[1].external_path.as_deref(), Some("/y/"));
    }

    #[test]
    fn single_quoted_apostrophes_are_decoded() {
        let parsed = parse("echo '@it'\\''s,ok@'");
        assert_eq!(parsed.groups[0].quote, QuoteContext::Single);
        assert_eq!(parsed.groups[0].raw_terms, vec!["it's", "ok"]);

        let parsed = parse("echo @it\\'s,\\\"ok\\\"@");
        assert_eq!(parsed.groups[0].raw_terms, vec!["it's", "\"ok\""]);
    }

    #[test]
    fn path_after_previous_group_starts_fresh() {
        let parsed = parse("@a@/x/@files:*@");
        assert_eq!(parsed.groups[1].external_path.as_deref(), Some("/x/"));
    }

    #[test]
    fn empty_group_has_one_empty_term() {
        let parsed = parse("echo @@");
        assert_eq!(parsed.groups[0].raw_terms, vec![""]);
    }

    #[test]
    fn no_groups_is_one_literal() {
        let parsed = parse("echo hello");
        assert!(parsed.groups.is_empty());
        assert_eq!(parsed.segments, vec![Segment::Literal("echo hello".to_string())]);
    }

    #[test]
    fn unterminated_group_is_fatal() {
        let err = parse_template("echo @a,b", &Config::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.position, Some(5));

        let err = parse_template("@a@ @b", &Config::default()).unwrap_err();
        assert_eq!(err.position, Some(4));
    }

    #[test]
    fn custom_delimiter() {
        let config = Config {
            delimiter: '%',
            ..Config::default()
        };
        let parsed = parse_template("echo user@host %a,b%", &config).unwrap();
        assert_eq!(parsed.groups.len(), 1);
        assert_eq!(parsed.groups[0].raw_terms, vec!["a", "b"]);
    }
}
