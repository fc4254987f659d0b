//! Error types and reporting for template expansion.
//!
//! Every fatal condition is raised as a `LupError` before any command runs.
//! Each carries:
//! - Error kind (parse, backref, range, filesystem directive, etc.)
//! - Human-readable message
//! - Optional hint about the offending input
//! - Optional byte position in the joined command line
//!
//! The kind also decides the process exit code.

use std::fmt;
use std::io;

/// Categorized failure classes, one exit code each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognized command-line flag
    Usage,
    /// Group opened but never closed
    Parse,
    /// Backreference pointing forward, at zero, or past the group count
    Backref,
    /// Integer range with equal or unparseable bounds
    Range,
    /// External path combined with an absolute directive pattern
    MixedPaths,
    /// Filesystem directive matched nothing after filtering
    NoMatches,
    /// Could not stat a glob match
    Stat,
    /// Could not make a match relative to its external path
    Path,
    /// Could not open or read a `lines:` file
    Lines,
    /// Malformed glob pattern
    Glob,
    /// Other I/O failure (stdin capture)
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Parse => 3,
            ErrorKind::Backref => 4,
            ErrorKind::Range => 6,
            ErrorKind::MixedPaths => 7,
            ErrorKind::NoMatches => 8,
            ErrorKind::Stat => 9,
            ErrorKind::Path => 10,
            ErrorKind::Lines => 11,
            ErrorKind::Glob => 12,
            ErrorKind::Io => 13,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Usage => write!(f, "Usage error"),
            ErrorKind::Parse => write!(f, "Parse error"),
            ErrorKind::Backref => write!(f, "Backref error"),
            ErrorKind::Range => write!(f, "Range error"),
            ErrorKind::MixedPaths => write!(f, "Path error"),
            ErrorKind::NoMatches => write!(f, "No matches"),
            ErrorKind::Stat => write!(f, "Stat error"),
            ErrorKind::Path => write!(f, "Path error"),
            ErrorKind::Lines => write!(f, "Lines error"),
            ErrorKind::Glob => write!(f, "Glob error"),
            ErrorKind::Io => write!(f, "I/O error"),
        }
    }
}

/// Rich error type with context information
#[derive(Debug, Clone)]
pub struct LupError {
    pub kind: ErrorKind,
    pub message: String,
    /// Additional context explaining what was being processed
    pub context: Option<String>,
    /// Byte position in the joined command line where the error occurred
    pub position: Option<usize>,
}

impl LupError {
    /// Create a new error with just the kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        LupError {
            kind,
            message: message.into(),
            context: None,
            position: None,
        }
    }

    /// Add context string (e.g., "Escape literal delimiters as \\@")
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add byte position in input where error occurred
    pub fn with_position(mut self, pos: usize) -> Self {
        self.position = Some(pos);
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    /// Format error with a snippet of the input showing where the problem is
    pub fn display_with_input(&self, input: &str) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);

        if let Some(pos) = self.position {
            if pos < input.len() && input.is_char_boundary(pos) {
                let start = floor_boundary(input, pos.saturating_sub(15));
                let end = floor_boundary(input, (pos + 15).min(input.len()));
                let snippet = &input[start..end];

                msg.push_str(&format!("\n  near: '{}'", snippet.replace('\n', "↵")));
                msg.push('\n');

                let offset = input[start..pos].chars().count();
                msg.push_str(&format!("  {}{}", " ".repeat(offset + 7), "^"));
            } else {
                msg.push_str(&format!("\n  at position {} (end of input)", pos));
            }
        }
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }

        msg
    }

    /// Simplified display without input context
    pub fn display_simple(&self) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }
        msg
    }
}

fn floor_boundary(input: &str, mut idx: usize) -> usize {
    while idx > 0 && !input.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

impl fmt::Display for LupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_simple())
    }
}

impl std::error::Error for LupError {}

impl From<io::Error> for LupError {
    fn from(err: io::Error) -> Self {
        LupError::new(ErrorKind::Io, err.to_string())
    }
}

/// Convenience type alias for Results with LupError
pub type LupResult<T> = Result<T, LupError>;
