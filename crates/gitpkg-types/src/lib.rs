//! Foundation types for gitpkg.
//!
//! This crate provides the plain data types shared by every other gitpkg
//! crate: the references advertised by a remote repository, the derived
//! resolution result, and the per-call options accepted by every operation.
//!
//! # Key Types
//!
//! - [`RemoteReference`]: One advertised ref: commit id, bare name, kind
//! - [`RefType`]: Classification of a ref (tag, branch, head, other)
//! - [`ResolutionResult`]: Refs, shas, versions and dist-tags of one remote
//! - [`GitOptions`]: Normalized process credentials for spawned commands

pub mod options;
pub mod reference;
pub mod resolution;

pub use options::GitOptions;
pub use reference::{RefType, RemoteReference};
pub use resolution::ResolutionResult;
