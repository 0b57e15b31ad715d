//! `git clone` argument construction.

use std::ffi::OsString;
use std::path::Path;

/// How a repository should be cloned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneArgs {
    /// History depth; `None` clones everything.
    pub depth: Option<u32>,
    /// Branch (or tag) to clone and check out. Implies `--single-branch` when
    /// combined with a depth.
    pub branch: Option<String>,
    /// Pass `core.longpaths=true`, needed on Windows for deep checkouts.
    pub long_paths: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

impl Default for CloneArgs {
    fn default() -> Self {
        Self {
            depth: None,
            branch: None,
            long_paths: cfg!(windows),
            quiet: true,
        }
    }
}

impl CloneArgs {
    /// A full-history clone of the default branch.
    pub fn full() -> Self {
        Self::default()
    }

    /// A depth-1 clone of a single branch.
    pub fn shallow(branch: Option<&str>) -> Self {
        Self {
            depth: Some(1),
            branch: branch.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_long_paths(mut self, long_paths: bool) -> Self {
        self.long_paths = long_paths;
        self
    }

    /// The arguments after `git`, ending with `<repo> <target>`.
    pub fn to_args(&self, repo: &str, target: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["clone".into()];
        if let Some(depth) = self.depth {
            args.push(format!("--depth={depth}").into());
        }
        if self.quiet {
            args.push("-q".into());
        }
        if let Some(branch) = &self.branch {
            args.push("-b".into());
            args.push(branch.into());
        }
        if self.long_paths {
            args.push("--config".into());
            args.push("core.longpaths=true".into());
        }
        args.push(repo.into());
        args.push(target.as_os_str().to_os_string());
        args
    }
}
