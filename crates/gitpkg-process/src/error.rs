//! Error types for git process execution.
//!
//! [`GitError`] is `Clone` so that one failed remote query can be handed to
//! every caller waiting on it.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Machine-checkable error category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No usable `git` binary; nothing was spawned.
    NotFound,
    /// The process could not be started.
    Spawn,
    /// The process ran and exited unsuccessfully.
    ProcessFailed,
}

/// Errors that can occur while running `git`.
#[derive(Clone, Debug, Error)]
pub enum GitError {
    /// The git binary could not be located.
    #[error("no git binary found in $PATH")]
    NotFound,

    /// An explicitly configured git binary is missing or not executable.
    #[error("git binary not found at {path}")]
    BinaryMissing { path: String },

    /// Spawning or waiting on the child process failed.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The command exited with a non-zero status.
    #[error("command failed: `{command}` ({}): {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl GitError {
    /// The error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GitError::NotFound | GitError::BinaryMissing { .. } => ErrorKind::NotFound,
            GitError::Spawn { .. } => ErrorKind::Spawn,
            GitError::CommandFailed { .. } => ErrorKind::ProcessFailed,
        }
    }

    /// Short error code. Missing-binary errors report `ENOGIT`.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "ENOGIT",
            ErrorKind::Spawn => "ESPAWN",
            ErrorKind::ProcessFailed => "EGITFAILED",
        }
    }

    /// Returns `true` if no git binary was available.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The command line that failed, if a process was involved.
    pub fn command(&self) -> Option<&str> {
        match self {
            GitError::Spawn { command, .. } | GitError::CommandFailed { command, .. } => {
                Some(command)
            }
            GitError::NotFound | GitError::BinaryMissing { .. } => None,
        }
    }

    /// Captured standard error of a failed command.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            GitError::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    pub(crate) fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        GitError::Spawn {
            command: command.into(),
            source: Arc::new(source),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Convenience type alias for git operations.
pub type GitResult<T> = Result<T, GitError>;
