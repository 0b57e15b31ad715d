//! The per-repository resolution result.
//!
//! A [`ResolutionResult`] is built once per remote query and then shared
//! read-only between every caller that asked for the same repository.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reference::RemoteReference;

/// Everything learned from one remote listing.
///
/// `shas` is derived from `refs`, and every value in `versions` and
/// `dist_tags` is also a value in `refs`. Use [`ResolutionResult::insert`] to
/// keep `refs` and `shas` in step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Bare reference name to reference. Last seen wins.
    pub refs: BTreeMap<String, RemoteReference>,
    /// Commit id to the names pointing at it, in listing order.
    pub shas: BTreeMap<String, Vec<String>>,
    /// Semantic version (`MAJOR.MINOR.PATCH`) to the tag that carries it.
    pub versions: BTreeMap<String, RemoteReference>,
    /// Dist-tag name (`HEAD`, `latest`) to reference.
    #[serde(rename = "distTags")]
    pub dist_tags: BTreeMap<String, RemoteReference>,
}

impl ResolutionResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference in `refs` and `shas`.
    ///
    /// A reference replacing one with the same name takes the old one out of
    /// `shas`, and any `versions` or `dist_tags` entry that pointed at it is
    /// dropped.
    pub fn insert(&mut self, reference: RemoteReference) {
        match self.refs.insert(reference.name.clone(), reference.clone()) {
            Some(previous) if previous == reference => return,
            Some(previous) => self.forget(&previous),
            None => {}
        }
        self.shas
            .entry(reference.sha)
            .or_default()
            .push(reference.name);
    }

    fn forget(&mut self, previous: &RemoteReference) {
        if let Some(names) = self.shas.get_mut(&previous.sha) {
            names.retain(|name| *name != previous.name);
            if names.is_empty() {
                self.shas.remove(&previous.sha);
            }
        }
        self.versions.retain(|_, r| r != previous);
        self.dist_tags.retain(|_, r| r != previous);
    }

    /// The remote's `HEAD`, if it was advertised.
    pub fn head(&self) -> Option<&RemoteReference> {
        self.refs.get("HEAD")
    }

    /// Look up a reference by bare name.
    pub fn get(&self, name: &str) -> Option<&RemoteReference> {
        self.refs.get(name)
    }

    /// Look up the tag carrying a version (e.g. "1.2.3").
    pub fn version(&self, version: &str) -> Option<&RemoteReference> {
        self.versions.get(version)
    }

    /// Look up a dist-tag (e.g. "latest").
    pub fn dist_tag(&self, tag: &str) -> Option<&RemoteReference> {
        self.dist_tags.get(tag)
    }

    /// Names of every reference pointing at `sha`.
    pub fn names_for_sha(&self, sha: &str) -> &[String] {
        self.shas.get(sha).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a user-supplied spec against this result.
    ///
    /// Tries dist-tags, then versions (with an optional leading `v`), then
    /// ref names, then full commit ids. For a commit id, the first name
    /// recorded for it is returned.
    pub fn resolve_spec(&self, spec: &str) -> Option<&RemoteReference> {
        if let Some(r) = self.dist_tags.get(spec) {
            return Some(r);
        }
        let bare = spec.strip_prefix('v').unwrap_or(spec);
        if let Some(r) = self.versions.get(bare) {
            return Some(r);
        }
        if let Some(r) = self.refs.get(spec) {
            return Some(r);
        }
        self.shas
            .get(spec)
            .and_then(|names| names.first())
            .and_then(|name| self.refs.get(name))
    }

    /// Returns `true` if the remote advertised nothing usable.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
