use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::types::CommandSpec;

/// Where a child's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Share the driver's stdout and stderr.
    Inherit,
    /// Send the child's stdout to the driver's stderr, keeping stdout clean
    /// for machine-readable output.
    Stderr,
    /// Truncate-and-create the file, then send both stdout and stderr into it.
    File(PathBuf),
}

/// Runs external commands to completion.
///
/// Returns `Ok(true)` on a zero exit status, `Ok(false)` on a non-zero one and
/// `Err` when the process could not be started at all.
pub trait CommandRunner {
    fn run(&mut self, command: &CommandSpec, capture: Capture) -> std::io::Result<bool>;
}

/// Spawns real processes inside a working directory and blocks on each.
pub struct ProcessRunner {
    work_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Relative programs with a path component (`./client`) are resolved
    /// against the working directory; bare names go through `PATH`.
    ///
    /// The result must be absolute: the child changes into the working
    /// directory before `exec`.
    fn resolve_program(&self, program: &str) -> std::io::Result<PathBuf> {
        let path = Path::new(program);
        if path.is_relative() && path.components().count() > 1 {
            Ok(std::path::absolute(&self.work_dir)?.join(path))
        } else {
            Ok(path.to_path_buf())
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &CommandSpec, capture: Capture) -> std::io::Result<bool> {
        let program = self.resolve_program(&command.program)?;
        let mut cmd = Command::new(&program);
        cmd.args(&command.args).current_dir(&self.work_dir);

        match capture {
            Capture::Inherit => {}
            Capture::Stderr => {
                cmd.stdout(Stdio::from(std::io::stderr()));
            }
            Capture::File(path) => {
                let file = File::create(self.work_dir.join(path))?;
                cmd.stdout(file.try_clone()?);
                cmd.stderr(file);
            }
        }

        debug!(program = %program.display(), args = ?command.args, "Spawning command");
        let status = cmd.status()?;
        debug!(program = %program.display(), status = %status, "Command exited");
        Ok(status.success())
    }
}
