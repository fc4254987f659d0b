use std::io::{self, IsTerminal, Read};

/// Read all of stdin once, unless it is an interactive terminal.
pub fn capture_stdin() -> io::Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut raw = String::new();
    stdin.lock().read_to_string(&mut raw)?;
    Ok(normalize_input(raw))
}

/// Trailing line breaks are dropped; empty input counts as no input.
pub fn normalize_input(input: String) -> Option<String> {
    let trimmed = input.trim_end_matches(&['\n', '\r'][..]);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
