//! Parsing `git ls-remote` output into a [`ResolutionResult`].
//!
//! Each line is `<sha><whitespace><ref path>`. Lines that do not split into
//! two fields are dropped; remotes and proxies occasionally emit noise and one
//! bad line must not sink the whole listing.

use std::sync::LazyLock;

use gitpkg_types::{RefType, RemoteReference, ResolutionResult};
use regex::Regex;

/// Suffix of peeled annotated-tag entries (`refs/tags/v1.0.0^{}`).
const PEELED: &str = "^{}";

/// Matches a trailing `MAJOR.MINOR.PATCH`, optionally preceded by `v`.
static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v?(\d+\.\d+\.\d+)$").expect("version pattern is a valid regex")
});

/// Strip a leading `refs/<namespace>/` from a ref path.
///
/// Paths without a namespace (`HEAD`, `refs/stash`) are returned unchanged.
pub fn bare_name(path: &str) -> &str {
    path.strip_prefix("refs/")
        .and_then(|rest| rest.split_once('/'))
        .filter(|(namespace, _)| !namespace.is_empty())
        .map_or(path, |(_, name)| name)
}

/// The `MAJOR.MINOR.PATCH` carried by a tag name, if any.
pub fn version_of(name: &str) -> Option<&str> {
    VERSION
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse one listing line. Returns `None` for lines that carry no reference.
pub fn parse_line(line: &str) -> Option<RemoteReference> {
    let mut fields = line.split_whitespace();
    let (Some(sha), Some(path)) = (fields.next(), fields.next()) else {
        return None;
    };
    let name = bare_name(path);
    if name.is_empty() || path.ends_with(PEELED) {
        return None;
    }
    Some(RemoteReference::new(sha, name, RefType::classify(line)))
}

/// Parse a complete listing.
pub fn parse_listing(stdout: &str) -> ResolutionResult {
    let mut result = ResolutionResult::new();
    for reference in stdout.lines().filter_map(parse_line) {
        let version = reference
            .is_tag()
            .then(|| version_of(&reference.name))
            .flatten()
            .map(str::to_string);
        result.insert(reference.clone());
        if let Some(version) = version {
            result.versions.insert(version, reference);
        }
    }
    derive_dist_tags(&mut result);
    result
}

/// Fill `dist_tags` from the remote's `HEAD`.
///
/// When a version's commit equals HEAD's commit, that version becomes
/// `HEAD` and the `HEAD` reference itself becomes `latest`, unless the
/// remote advertises its own `latest` ref. When several versions share
/// HEAD's commit, the highest one wins.
pub fn derive_dist_tags(result: &mut ResolutionResult) {
    let Some(head) = result.head().cloned() else {
        return;
    };
    let Some(version) = highest_version_at(result, &head.sha) else {
        return;
    };
    result.dist_tags.insert("HEAD".to_string(), version);
    if !result.refs.contains_key("latest") {
        result.dist_tags.insert("latest".to_string(), head);
    }
}

fn highest_version_at(result: &ResolutionResult, sha: &str) -> Option<RemoteReference> {
    result
        .versions
        .iter()
        .filter(|(_, r)| r.sha == sha)
        .max_by(|(a, _), (b, _)| version_key(a).cmp(&version_key(b)))
        .map(|(_, r)| r.clone())
}

/// Numeric ordering key for a `MAJOR.MINOR.PATCH` string.
///
/// Parts compare by significant digit count, then digit by digit, so
/// arbitrarily long components order correctly.
fn version_key(version: &str) -> Vec<(usize, &str)> {
    version
        .split('.')
        .map(|part| {
            let digits = part.trim_start_matches('0');
            (digits.len(), digits)
        })
        .collect()
}
