//! Template expansion engine for `lup`.
//!
//! A command line holding `@a,b@`-style groups expands into the cartesian
//! product of concrete commands. The library exposes parsing, expansion and
//! generation separately so fuzz targets and tests can link them without the
//! binary's logging setup.

mod command;
mod config;
mod error;
mod execution;
mod expansion;
mod generate;
mod io_helpers;
mod parse;

pub use command::{build, build_line, join_tokens};
pub use config::{
    detect_shell, parse_args, Config, Invocation, Shell, DEFAULT_DELIMITER, HIDDEN_MARKER, USAGE,
    VERSION,
};
pub use error::{ErrorKind, LupError, LupResult};
pub use execution::{command_argv, display_command, execute, execute_to, ExecutionReport};
pub use expansion::{
    expand_nodes, expand_range, expand_term, parse_directive, read_lines, Directive,
    ExpandedTerms, NodeExpansion, NodeKind,
};
pub use generate::{parse_backref, Commands, Generator, Group, Template, Term};
pub use io_helpers::capture_stdin;
pub use parse::{
    is_escaped, parse_template, ParsedTemplate, QuoteContext, RawGroup, Segment,
};

/// Fuzz helper for parser-only targets.
pub fn fuzz_parse_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    if let Ok(parsed) = parse::parse_template(&input, &Config::default()) {
        let _ = parsed.marked();
    }
}

/// Fuzz helper for parser+generation targets; filesystem directives are skipped.
pub fn fuzz_expand_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    if ["lines:", "files:", "dirs:", "all:"]
        .iter()
        .any(|directive| input.contains(directive))
    {
        return;
    }
    if let Ok(generator) = build_line(&input, &Config::default()) {
        for command in generator.commands().take(256) {
            let _ = command_argv(&command, &Config::default());
        }
    }
}
