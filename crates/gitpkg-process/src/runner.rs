//! Running `git` commands.
//!
//! [`GitRunner`] is the seam every higher layer talks to. [`SystemGit`] is
//! the real implementation on top of [`tokio::process::Command`]; tests
//! substitute scripted runners.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use gitpkg_types::GitOptions;
use tokio::process::{Child, Command};
use tracing::{debug, instrument};

use crate::env::git_env;
use crate::error::{GitError, GitResult};
use crate::locator::BinaryLocator;

/// One `git` command: arguments, working directory, and process options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub options: GitOptions,
}

impl Invocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            options: GitOptions::default(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Run inside `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn options(mut self, options: GitOptions) -> Self {
        self.options = options;
        self
    }

    /// The git subcommand (first argument), e.g. "clone".
    pub fn subcommand(&self) -> Option<String> {
        self.args
            .first()
            .map(|a| a.to_string_lossy().into_owned())
    }

    /// Human-readable command line, e.g. `git checkout v1.0.0`.
    pub fn command_line(&self) -> String {
        let mut line = String::from("git");
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Captured output of a successful command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Executes `git` commands.
///
/// Implementations must fail with a [`GitError::CommandFailed`] on non-zero
/// exit, embedding the command line and captured stderr.
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> GitResult<GitOutput>;
}

/// Runs the installed `git` binary with the sanitized environment.
#[derive(Clone, Debug, Default)]
pub struct SystemGit {
    locator: BinaryLocator,
}

impl SystemGit {
    /// Use the `git` found on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `git` binary.
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            locator: BinaryLocator::explicit(path),
        }
    }

    /// The binary this runner will execute.
    pub fn binary(&self) -> GitResult<&Path> {
        self.locator.locate()
    }

    /// Build the [`Command`] for an invocation without spawning it.
    ///
    /// Fails with a not-found error before anything is spawned when the
    /// binary is missing.
    pub fn command(&self, invocation: &Invocation) -> GitResult<Command> {
        let binary = self.binary()?;
        let mut cmd = Command::new(binary);
        cmd.args(&invocation.args);
        cmd.env_clear();
        cmd.envs(git_env());
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        {
            if let Some(uid) = invocation.options.uid {
                cmd.uid(uid);
            }
            if let Some(gid) = invocation.options.gid {
                cmd.gid(gid);
            }
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        Ok(cmd)
    }

    /// Spawn the command and hand back the live child.
    ///
    /// The caller owns `child.stdout` / `child.stderr` and must wait on the
    /// child. Used when output should be streamed instead of buffered.
    #[instrument(skip(self, invocation), fields(command = %invocation.command_line()))]
    pub fn spawn(&self, invocation: &Invocation) -> GitResult<Child> {
        let mut cmd = self.command(invocation)?;
        debug!("spawning git (streamed)");
        cmd.spawn()
            .map_err(|e| GitError::spawn(invocation.command_line(), e))
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    #[instrument(skip(self, invocation), fields(command = %invocation.command_line()))]
    async fn run(&self, invocation: &Invocation) -> GitResult<GitOutput> {
        let mut cmd = self.command(invocation)?;
        debug!("spawning git");

        let output = cmd
            .output()
            .await
            .map_err(|e| GitError::spawn(invocation.command_line(), e))?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            debug!(status = %output.status, "git exited unsuccessfully");
            return Err(GitError::CommandFailed {
                command: invocation.command_line(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        debug!(
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "git succeeded"
        );
        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
        })
    }
}
