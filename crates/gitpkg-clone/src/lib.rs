//! Clone and checkout workflows for gitpkg.
//!
//! - [`args`]: `git clone` argument construction
//! - [`workflow`]: Ordered step pipelines and the single-step operations
//! - [`cloner`]: [`Cloner`], the entry point used by the SDK

pub mod args;
pub mod cloner;
pub mod workflow;

pub use args::CloneArgs;
pub use cloner::Cloner;
pub use workflow::{checkout, head_sha, update_submodules, Step, Workflow};
