use crate::error::{ErrorKind, LupError, LupResult};

/// Split `A..B` where both bounds are plain decimal digits.
pub fn parse_range(term: &str) -> Option<(&str, &str)> {
    let (first, last) = term.split_once("..")?;
    if is_digits(first) && is_digits(last) {
        Some((first, last))
    } else {
        None
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Inclusive integer sequence from `first` to `last`, counting up or down.
pub fn expand_range(first: &str, last: &str) -> LupResult<Vec<String>> {
    let start = parse_bound(first)?;
    let end = parse_bound(last)?;
    if start == end {
        return Err(LupError::new(
            ErrorKind::Range,
            "Integer range starts and ends on the same number",
        )
        .with_context(format!("{first}..{last} would only produce one value")));
    }
    let values: Vec<String> = if start < end {
        (start..=end).map(|n| n.to_string()).collect()
    } else {
        (end..=start).rev().map(|n| n.to_string()).collect()
    };
    Ok(values)
}

fn parse_bound(text: &str) -> LupResult<u64> {
    text.parse::<u64>().map_err(|_| {
        LupError::new(
            ErrorKind::Range,
            format!("Range bound {text} is too large"),
        )
    })
}
