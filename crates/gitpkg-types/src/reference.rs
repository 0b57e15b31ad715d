//! Remote reference types.
//!
//! A [`RemoteReference`] is what a single `git ls-remote` line turns into once
//! the `refs/<namespace>/` prefix has been stripped.

use std::fmt;

use serde::{Deserialize, Serialize};

const REFS_TAGS: &str = "refs/tags/";
const REFS_HEADS: &str = "refs/heads/";
const HEAD: &str = "HEAD";

/// Classification of an advertised reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    /// Anything under `refs/tags/`.
    Tag,
    /// Anything under `refs/heads/`.
    Branch,
    /// The symbolic `HEAD` of the remote.
    Head,
    /// Pull-request refs, notes, and everything else.
    Other,
}

impl RefType {
    /// Classify a raw listing line (or raw ref path).
    ///
    /// Tags are checked first, then branches, then a trailing `HEAD`. The
    /// check runs on the unstripped text so the namespace is still visible.
    pub fn classify(raw: &str) -> Self {
        if raw.contains(REFS_TAGS) {
            RefType::Tag
        } else if raw.contains(REFS_HEADS) {
            RefType::Branch
        } else if raw.trim_end().ends_with(HEAD) {
            RefType::Head
        } else {
            RefType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefType::Tag => "tag",
            RefType::Branch => "branch",
            RefType::Head => "head",
            RefType::Other => "other",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reference advertised by a remote repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteReference {
    /// Commit id the reference points at.
    pub sha: String,
    /// Bare reference name (e.g. "main", "v1.2.3", "HEAD").
    #[serde(rename = "ref")]
    pub name: String,
    /// Reference classification.
    #[serde(rename = "type")]
    pub kind: RefType,
}

impl RemoteReference {
    pub fn new(sha: impl Into<String>, name: impl Into<String>, kind: RefType) -> Self {
        Self {
            sha: sha.into(),
            name: name.into(),
            kind,
        }
    }

    /// Returns `true` if this is a tag reference.
    pub fn is_tag(&self) -> bool {
        self.kind == RefType::Tag
    }

    /// Returns `true` if this is a branch reference.
    pub fn is_branch(&self) -> bool {
        self.kind == RefType::Branch
    }

    /// Abbreviated commit id (first 7 characters).
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

impl fmt::Display for RemoteReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.short_sha(), self.name, self.kind)
    }
}
