//! Running gnuplot (or a compatible program) on the generated script.
//! Blocking, without timeout: a hanging renderer hangs the run.

use std::{
    path::Path,
    process::{Command, ExitStatus},
};

use crate::{info, io_utils::bash::cmd_as_bash_string};

pub const DEFAULT_RENDERER: &str = "gnuplot";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not run {command}: {error}")]
    Spawn {
        command: String,
        error: std::io::Error,
    },
    #[error("{command} failed: {status}")]
    Failed { command: String, status: ExitStatus },
}

pub fn render_command(program: &str, script: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg(script);
    cmd
}

/// Run `program` with the script path as its only argument, with
/// inherited stdout/stderr, and wait for it.
pub fn render(program: &str, script: &Path) -> Result<(), RenderError> {
    let mut cmd = render_command(program, script);
    let command = cmd_as_bash_string(&cmd);
    info!("running: {command}");
    let status = cmd.status().map_err(|error| RenderError::Spawn {
        command: command.clone(),
        error,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(RenderError::Failed { command, status })
    }
}
