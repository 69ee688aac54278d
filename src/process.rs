// Subprocess helpers.
// Runs git, composer, and test tools, forwarding their output to the terminal.

use std::fs::File;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::error::{IssueError, Result};

/// Build a command for a program with arguments, running in `dir`.
pub fn command<I, S>(program: &str, args: I, dir: &Path) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).current_dir(dir);
    command
}

fn program_name(command: &Command) -> String {
    command.as_std().get_program().to_string_lossy().into_owned()
}

/// Run to completion with inherited stdio and return the exit status.
pub async fn status(command: &mut Command) -> Result<ExitStatus> {
    let program = program_name(command);
    debug!(command = ?command.as_std(), "running");
    command
        .status()
        .await
        .map_err(|source| IssueError::Spawn { program, source })
}

/// Run to completion, failing with `message` on a non-zero exit.
pub async fn run(command: &mut Command, message: &str) -> Result<()> {
    if status(command).await?.success() {
        Ok(())
    } else {
        Err(IssueError::CommandFailed(message.to_string()))
    }
}

/// Run and capture stdout as lines; stderr is forwarded.
pub async fn output_lines(command: &mut Command, message: &str) -> Result<Vec<String>> {
    let program = program_name(command);
    debug!(command = ?command.as_std(), "capturing output");
    let child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| IssueError::Spawn { program, source })?;
    let output = child.wait_with_output().await?;

    if !output.status.success() {
        return Err(IssueError::CommandFailed(message.to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Run with stdout written to a file.
pub async fn output_to_file(command: &mut Command, path: &Path, message: &str) -> Result<()> {
    let file = File::create(path)?;
    command.stdout(Stdio::from(file));
    run(command, message).await
}

/// Start a background helper and leave it running.
pub fn spawn_detached(command: &mut Command) -> Result<()> {
    let program = program_name(command);
    debug!(command = ?command.as_std(), "spawning in background");
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
        .map_err(|source| IssueError::Spawn { program, source })
}

/// Run and ignore the outcome.
pub async fn best_effort(command: &mut Command) {
    command.stdout(Stdio::null()).stderr(Stdio::null());
    if let Err(err) = status(command).await {
        debug!(error = %err, "ignored command failure");
    }
}
