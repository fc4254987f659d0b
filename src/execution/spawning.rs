use std::fs;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

/// Spawn `argv` with inherited stdio and wait for it.
pub fn run_argv(argv: &[String]) -> io::Result<ExitStatus> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    let mut child = command
        .spawn()
        .map_err(|err| wrap_spawn_error(program, err))?;
    debug!("exec event=spawn pid={} program={program}", child.id());
    let status = child.wait()?;
    debug!(
        "exec event=exit program={program} status={}",
        exit_status_code(status)
    );
    Ok(status)
}

#[cfg(unix)]
pub fn exit_status_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    if let Some(code) = status.code() {
        code
    } else if let Some(sig) = status.signal() {
        128 + sig
    } else {
        1
    }
}

#[cfg(not(unix))]
pub fn exit_status_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

fn wrap_spawn_error(cmd: &str, err: io::Error) -> io::Error {
    let (message, kind) = spawn_error_message(cmd, &err);
    io::Error::new(kind, message)
}

pub fn spawn_error_message(cmd: &str, err: &io::Error) -> (String, io::ErrorKind) {
    match err.kind() {
        io::ErrorKind::NotFound => (format!("{cmd}: command not found"), io::ErrorKind::NotFound),
        io::ErrorKind::PermissionDenied => {
            if cmd.contains('/') && fs::metadata(cmd).is_ok_and(|meta| meta.is_dir()) {
                return (format!("{cmd}: is a directory"), io::ErrorKind::PermissionDenied);
            }
            (
                format!("{cmd}: permission denied"),
                io::ErrorKind::PermissionDenied,
            )
        }
        _ => (format!("{cmd}: {err}"), err.kind()),
    }
}
