//! Git binary discovery.
//!
//! The `PATH` lookup runs once per process and is reused by every later
//! invocation. A missing binary is reported before anything is spawned.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::error::{GitError, GitResult};

const GIT: &str = "git";

static GIT_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// The `git` found on `PATH`, looked up on first use.
pub fn git_path() -> Option<&'static Path> {
    GIT_PATH
        .get_or_init(|| match which::which(GIT) {
            Ok(path) => {
                debug!(path = %path.display(), "located git binary");
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, "no git binary on PATH");
                None
            }
        })
        .as_deref()
}

/// Like [`git_path`], but fails with [`GitError::NotFound`] when absent.
pub fn require_git() -> GitResult<&'static Path> {
    git_path().ok_or(GitError::NotFound)
}

/// Where to find `git`: on `PATH`, or at an explicit location.
///
/// An explicit location is validated once, on first use, and the outcome is
/// kept for the lifetime of the locator.
#[derive(Debug, Default)]
pub struct BinaryLocator {
    explicit: Option<PathBuf>,
    resolved: OnceLock<Option<PathBuf>>,
}

impl BinaryLocator {
    /// Search `PATH` (process-wide memoized).
    pub fn from_path() -> Self {
        Self::default()
    }

    /// Use a specific binary instead of searching `PATH`.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
            resolved: OnceLock::new(),
        }
    }

    /// Resolve the binary, failing if it is not there.
    pub fn locate(&self) -> GitResult<&Path> {
        let Some(explicit) = &self.explicit else {
            return require_git();
        };
        self.resolved
            .get_or_init(|| which::which(explicit).ok())
            .as_deref()
            .ok_or_else(|| GitError::BinaryMissing {
                path: explicit.display().to_string(),
            })
    }
}

impl Clone for BinaryLocator {
    fn clone(&self) -> Self {
        match &self.explicit {
            Some(path) => Self::explicit(path.clone()),
            None => Self::from_path(),
        }
    }
}
