//! Remote reference resolution for gitpkg.
//!
//! Given a repository URL or path, this crate answers which branches and tags
//! the remote advertises, which semantic versions those tags carry, and which
//! version the remote's `HEAD` (and `latest`) point at.
//!
//! # Architecture
//!
//! - **Parsing** turns raw `git ls-remote` lines into a
//!   [`ResolutionResult`]. Malformed lines are dropped, peeled tags are
//!   ignored, and dist-tags are derived once the whole listing is read.
//! - **Caching** keeps up to 100 results for 5 minutes, evicting the least
//!   recently used entry on overflow.
//! - **Deduplication** makes concurrent requests for one repository share a
//!   single `git ls-remote` and observe the same outcome.
//!
//! # Modules
//!
//! - [`parse`]: Listing parser, version capture, dist-tag derivation
//! - [`cache`]: [`RefCache`], the LRU + TTL cache
//! - [`inflight`]: [`InFlight`], the pending-query registry
//! - [`resolver`]: [`RefResolver`], tying the three together

pub mod cache;
pub mod inflight;
pub mod parse;
pub mod resolver;

pub use cache::{RefCache, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use gitpkg_process::{ErrorKind, GitError, GitResult};
pub use gitpkg_types::{RefType, RemoteReference, ResolutionResult};
pub use inflight::InFlight;
pub use parse::{parse_line, parse_listing, version_of};
pub use resolver::{list_remote, RefResolver};
