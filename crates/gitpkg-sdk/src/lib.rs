//! High-level SDK for gitpkg.
//!
//! [`GitClient`] is the entry point for embedding gitpkg: it resolves what a
//! remote repository advertises (branches, tags, semantic versions,
//! dist-tags) and materializes working copies at a given commit.

pub mod client;
pub mod config;
pub mod error;

pub use client::GitClient;
pub use config::ClientConfig;
pub use error::{ConfigError, ConfigResult};

// Re-export key types
pub use gitpkg_process::{ErrorKind, GitError, GitResult};
pub use gitpkg_types::{GitOptions, RefType, RemoteReference, ResolutionResult};
