use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, instrument};

use crate::error::{Result, SemtagError};

/// Captured result of a finished subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs inside the repository working tree
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    workdir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        ProcessExecutor {
            workdir: workdir.into(),
        }
    }

    /// Run a program to completion.
    ///
    /// Stdout and stderr are drained concurrently by `Command::output`. A non-zero
    /// exit is a [SemtagError::Process] carrying the captured stderr.
    #[instrument(skip(self))]
    pub fn run(&self, program: &str, args: &[&str]) -> Result<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| {
                SemtagError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to execute {}: {}", program, e),
                ))
            })?;

        let result = ProcessOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };

        debug!(code = result.code, "process finished");

        if !output.status.success() {
            return Err(SemtagError::Process {
                program: program.to_string(),
                code: result.code,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }
}
