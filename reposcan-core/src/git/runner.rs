//! Blocking `git` subprocess invocation

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Default git executable, resolved through `PATH`
pub const DEFAULT_GIT: &str = "git";

/// Captured result of a single git invocation
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Whether git exited with status zero
    pub success: bool,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

/// A git command runner bound to one working directory
///
/// The working directory is handed to each child process; the current
/// directory of this process is never changed.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
    workdir: PathBuf,
}

impl Git {
    /// Create a runner for `workdir` using the `git` found on `PATH`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self::with_program(DEFAULT_GIT, workdir)
    }

    /// Create a runner using a specific git executable
    pub fn with_program(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }

    /// The directory git runs in
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run git with `args`, capturing output regardless of exit status
    pub fn run(&self, args: &[&str]) -> Result<GitOutput> {
        tracing::trace!(
            workdir = %self.workdir.display(),
            args = ?args,
            "Running git"
        );

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            // Read-only queries must not take the index lock
            .env("GIT_OPTIONAL_LOCKS", "0")
            .output()
            .map_err(|e| Error::Other(format!("Failed to run {}: {}", self.program, e)))?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run git and return trimmed stdout, failing on a non-zero exit
    pub fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;

        if !output.success {
            return Err(Error::Git {
                command: args.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout.trim().to_string())
    }

    /// Run git and report only whether it exited successfully
    ///
    /// Spawn failures count as unsuccessful.
    pub fn succeeds(&self, args: &[&str]) -> bool {
        self.run(args).map(|o| o.success).unwrap_or(false)
    }
}
