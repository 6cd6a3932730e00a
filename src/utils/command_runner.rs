use std::ffi::OsStr;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use crate::Error;

/// Runs a command with inherited stdio and waits for it to exit.
///
/// The tool's own output goes straight to the terminal; nothing is captured.
pub fn run_inherited(command_name: &str, args: &[impl AsRef<OsStr>]) -> Result<ExitStatus, Error> {
    log::debug!(
        "Running command: {} {}",
        command_name,
        args.iter().map(|a| a.as_ref().to_string_lossy()).collect::<Vec<_>>().join(" ")
    );

    let mut cmd = Command::new(command_name);
    cmd.args(args);
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    let status = cmd.status().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::ToolNotFound(command_name.to_string()),
        _ => Error::Io(e),
    })?;

    if status.success() {
        log::debug!("Command '{}' exited successfully", command_name);
    } else {
        log::debug!("Command '{}' exited with {}", command_name, status);
    }
    Ok(status)
}

pub fn is_command_in_path(command_name: &str) -> bool {
    match Command::new(command_name)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => true,
        Err(e) => {
            if let io::ErrorKind::NotFound = e.kind() {
                log::warn!("Command '{}' not found in PATH.", command_name);
                false
            } else {
                // Exists but could not report a version, e.g. permission quirks.
                log::debug!("Command '{}' check resulted in error (assuming it exists): {}", command_name, e);
                true
            }
        }
    }
}
