//! Process plumbing for gitpkg.
//!
//! Every operation in gitpkg ends up here: locate the `git` binary, build a
//! sanitized environment, spawn the command, and collect its output.
//!
//! # Modules
//!
//! - [`error`]: [`GitError`] and its machine-checkable [`ErrorKind`]
//! - [`locator`]: One-time `git` binary discovery
//! - [`env`]: Memoized, sanitized child environment
//! - [`runner`]: The [`GitRunner`] trait and the [`SystemGit`] implementation

pub mod env;
pub mod error;
pub mod locator;
pub mod runner;

pub use env::{build_env, git_env, ALLOWED_GIT_VARS};
pub use error::{ErrorKind, GitError, GitResult};
pub use locator::{git_path, require_git, BinaryLocator};
pub use runner::{GitOutput, GitRunner, Invocation, SystemGit};
