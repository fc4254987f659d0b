use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::{ErrorKind, LupError, LupResult};

/// One term per line of `path`, including a final unterminated line.
pub fn read_lines(path: &str) -> LupResult<Vec<String>> {
    let file = File::open(path).map_err(|err| {
        LupError::new(ErrorKind::Lines, format!("Couldn't open {path}: {err}"))
            .with_context("lines: expects a readable text file")
    })?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|err| {
            LupError::new(ErrorKind::Lines, format!("Couldn't read {path}: {err}"))
        })?;
        lines.push(line);
    }
    Ok(lines)
}
