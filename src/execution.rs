//! Runs generated commands one after another.
//!
//! Each command is split into argv and spawned directly with inherited stdio.
//! When stdin was captured, the command is handed to the shell instead so the
//! input can be piped in front of it. A failing command never stops the batch.
use std::io::{self, Write};

use log::{debug, error};

use crate::config::{Config, Shell};

mod spawning;

pub use spawning::{exit_status_code, run_argv};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub attempted: usize,
    pub failed: usize,
}

impl ExecutionReport {
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Text shown for a command in dry-run mode.
pub fn display_command(command: &str, config: &Config) -> String {
    match (&config.shell, config.input.as_deref()) {
        (Shell::Posix(_), None) => command.to_string(),
        (shell, input) => shell_words::join(shell_argv(shell, command, input)),
    }
}

/// argv for one command, or the reason it can't be split.
pub fn command_argv(command: &str, config: &Config) -> Result<Vec<String>, String> {
    match (&config.shell, config.input.as_deref()) {
        (Shell::Posix(_), None) => shell_words::split(command)
            .map_err(|err| format!("couldn't split command: {err}")),
        (shell, input) => Ok(shell_argv(shell, command, input)),
    }
}

fn shell_argv(shell: &Shell, command: &str, input: Option<&str>) -> Vec<String> {
    let script = match input {
        Some(input) => format!(
            "{} {} | {}",
            shell.echo_command(),
            shell_words::quote(input),
            command
        ),
        None => command.to_string(),
    };
    let flag = match shell {
        Shell::Posix(_) => "-c",
        Shell::PowerShell => "-Command",
    };
    vec![shell.program().to_string(), flag.to_string(), script]
}

pub fn execute<I>(commands: I, config: &Config) -> ExecutionReport
where
    I: IntoIterator<Item = String>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_to(commands, config, &mut out)
}

pub fn execute_to<I, W>(commands: I, config: &Config, out: &mut W) -> ExecutionReport
where
    I: IntoIterator<Item = String>,
    W: Write,
{
    let mut report = ExecutionReport::default();
    for command in commands {
        report.attempted += 1;
        if config.dry_run {
            if let Err(err) = writeln!(out, "{}", display_command(&command, config)) {
                error!("couldn't print command: {err}");
            }
            continue;
        }
        let argv = match command_argv(&command, config) {
            Ok(argv) => argv,
            Err(msg) => {
                error!("{msg}: {command}");
                report.failed += 1;
                continue;
            }
        };
        if argv.is_empty() {
            debug!("exec event=skip reason=empty command={command:?}");
            continue;
        }
        // Keep our own output ahead of the child's.
        let _ = out.flush();
        match run_argv(&argv) {
            Ok(status) if status.success() => {}
            Ok(status) => {
                error!(
                    "command exited with status {}: {command}",
                    exit_status_code(status)
                );
                report.failed += 1;
            }
            Err(err) => {
                error!("{err}");
                report.failed += 1;
            }
        }
    }
    debug!(
        "exec event=done attempted={} failed={}",
        report.attempted, report.failed
    );
    report
}
