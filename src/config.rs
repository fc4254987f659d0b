use std::env;
use std::path::Path;

use log::warn;

use crate::error::{ErrorKind, LupError, LupResult};

pub const DEFAULT_DELIMITER: char = '@';
pub const HIDDEN_MARKER: &str = "-:";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = r#"Usage: lup [OPTION] COMMANDLINE

Run multiple similar commands expanding at-symbol encapsulated, comma-separated
lists similarly to nested for loops.

e.g:

  lup @rm,nano@ foo_@1,2@

Expands to and executes:

  rm foo_1
  rm foo_2
  nano foo_1
  nano foo_2

Literal @ symbols, and literal commas inside a group, are escaped with a
backslash.

Iterating     @9..0@ counts down, @0..9@ counts up
Hiding        @-:1..5@ iterates without printing its value
Backrefs      @1@ repeats the value group 1 holds on the same line
Reading files @lines:/path/to/file@ injects one line per command
Filesystem    @files:dir/*@, @dirs:dir/*@ and @all:dir/*@ iterate nodes;
              a path right before the group (dir/@files:*@) is inherited

Options:

  -h, --help     Show this help message and exit
  -V, --version  Show version information and exit
  -t, --test     Show commands, but do not execute them

Environment:

  LUP_LOG        Log filter (default: warn)
  LUP_SHELL      Shell used to pipe captured stdin (default: $SHELL or sh)
  LUP_DELIMITER  Group delimiter character (default: @)"#;

/// Interpreter used when captured stdin has to be piped into a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shell {
    Posix(String),
    PowerShell,
}

impl Shell {
    pub fn program(&self) -> &str {
        match self {
            Shell::Posix(name) => name,
            Shell::PowerShell => "powershell",
        }
    }

    /// Command used to replay captured input into a pipeline.
    pub fn echo_command(&self) -> &'static str {
        match self {
            Shell::Posix(_) => "echo",
            Shell::PowerShell => "Write-Host",
        }
    }

    fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let base = lower.trim_end_matches(".exe");
        if base == "powershell" || base == "pwsh" {
            Shell::PowerShell
        } else {
            Shell::Posix(name.to_string())
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        if cfg!(windows) {
            Shell::PowerShell
        } else {
            Shell::Posix("sh".to_string())
        }
    }
}

/// Settings threaded through parsing, generation and execution.
#[derive(Debug, Clone)]
pub struct Config {
    pub delimiter: char,
    pub hidden_marker: &'static str,
    pub shell: Shell,
    pub dry_run: bool,
    /// Captured stdin, replayed into every generated command.
    pub input: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            hidden_marker: HIDDEN_MARKER,
            shell: Shell::default(),
            dry_run: false,
            input: None,
        }
    }
}

impl Config {
    /// Default settings adjusted by `LUP_DELIMITER`, `LUP_SHELL` and `SHELL`.
    pub fn from_env() -> Self {
        Self {
            delimiter: delimiter_from_env(),
            shell: detect_shell(),
            ..Self::default()
        }
    }
}

pub fn detect_shell() -> Shell {
    if let Some(name) = env::var("LUP_SHELL").ok().filter(|v| !v.trim().is_empty()) {
        return Shell::from_name(name.trim());
    }
    if let Ok(path) = env::var("SHELL") {
        if let Some(name) = Path::new(path.trim()).file_name().and_then(|n| n.to_str()) {
            if !name.is_empty() {
                return Shell::from_name(name);
            }
        }
    }
    Shell::default()
}

fn delimiter_from_env() -> char {
    let Ok(value) = env::var("LUP_DELIMITER") else {
        return DEFAULT_DELIMITER;
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if is_valid_delimiter(ch) => ch,
        _ => {
            warn!("ignoring LUP_DELIMITER={value:?}: expected one non-structural character");
            DEFAULT_DELIMITER
        }
    }
}

fn is_valid_delimiter(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, ',' | '\\' | '\'' | '"')
}

#[derive(Debug)]
pub enum Invocation {
    Run { config: Config, tokens: Vec<String> },
    Help,
    Version,
}

/// Strip leading flags; everything from the first non-flag token on is template.
pub fn parse_args<I>(args: I, mut config: Config) -> LupResult<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut tokens = Vec::new();
    for arg in args {
        if !tokens.is_empty() || !arg.starts_with('-') {
            tokens.push(arg);
            continue;
        }
        match arg.as_str() {
            "-V" | "--version" => return Ok(Invocation::Version),
            "-h" | "--help" => return Ok(Invocation::Help),
            "-t" | "--test" => config.dry_run = true,
            other => {
                return Err(LupError::new(
                    ErrorKind::Usage,
                    format!("Flag not recognised ({other})"),
                )
                .with_context("try using lup -h to see the help"));
            }
        }
    }
    if tokens.is_empty() {
        return Ok(Invocation::Help);
    }
    Ok(Invocation::Run { config, tokens })
}
