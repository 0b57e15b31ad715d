//! The clone entry point.

use std::path::Path;
use std::sync::Arc;

use gitpkg_process::{GitResult, GitRunner, SystemGit};
use gitpkg_types::GitOptions;
use tracing::{debug, instrument};

use crate::workflow::{self, Workflow};

/// Clones repositories and reports the commit that ends up checked out.
pub struct Cloner {
    runner: Arc<dyn GitRunner>,
}

impl Cloner {
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self { runner }
    }

    /// A cloner backed by the system `git`.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemGit::new()))
    }

    /// Full clone of `repo` into `target`, then check out `committish`.
    ///
    /// Returns the commit id of `HEAD` after checkout and submodule update.
    #[instrument(skip(self, target, options), fields(target = %target.display()))]
    pub async fn clone(
        &self,
        repo: &str,
        committish: &str,
        target: &Path,
        options: GitOptions,
    ) -> GitResult<String> {
        let sha = Workflow::full_clone(repo, committish, target)
            .run(self.runner.as_ref(), options)
            .await?;
        debug!(%sha, "clone complete");
        Ok(sha)
    }

    /// Depth-1 clone of `branch` (or the remote's default branch).
    #[instrument(skip(self, target, options), fields(target = %target.display()))]
    pub async fn shallow(
        &self,
        repo: &str,
        branch: Option<&str>,
        target: &Path,
        options: GitOptions,
    ) -> GitResult<String> {
        let sha = Workflow::shallow_clone(repo, branch, target)
            .run(self.runner.as_ref(), options)
            .await?;
        debug!(%sha, "shallow clone complete");
        Ok(sha)
    }

    pub async fn checkout(
        &self,
        target: &Path,
        committish: &str,
        options: GitOptions,
    ) -> GitResult<()> {
        workflow::checkout(self.runner.as_ref(), target, committish, options).await
    }

    pub async fn update_submodules(&self, target: &Path, options: GitOptions) -> GitResult<()> {
        workflow::update_submodules(self.runner.as_ref(), target, options).await
    }

    pub async fn head_sha(&self, target: &Path, options: GitOptions) -> GitResult<String> {
        workflow::head_sha(self.runner.as_ref(), target, options).await
    }
}

impl std::fmt::Debug for Cloner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cloner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use gitpkg_process::{GitError, GitOutput, Invocation};

    struct Log(Mutex<Vec<String>>);

    #[async_trait]
    impl GitRunner for Log {
        async fn run(&self, invocation: &Invocation) -> GitResult<GitOutput> {
            self.0.lock().unwrap().push(invocation.command_line());
            match invocation.subcommand().as_deref() {
                Some("rev-parse") => Ok(GitOutput::new("feedface\n")),
                Some("checkout") => Err(GitError::CommandFailed {
                    command: invocation.command_line(),
                    code: Some(1),
                    stderr: "error: pathspec 'v9.9.9' did not match".into(),
                }),
                _ => Ok(GitOutput::default()),
            }
        }
    }

    #[tokio::test]
    async fn shallow_returns_head() {
        let log = Arc::new(Log(Mutex::new(Vec::new())));
        let cloner = Cloner::new(log.clone());
        let sha = cloner
            .shallow("repo", Some("main"), Path::new("out"), GitOptions::new())
            .await
            .unwrap();
        assert_eq!(sha, "feedface");
        assert_eq!(log.0.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn checkout_failure_names_checkout() {
        let log = Arc::new(Log(Mutex::new(Vec::new())));
        let cloner = Cloner::new(log.clone());
        let err = cloner
            .clone("repo", "v9.9.9", Path::new("out"), GitOptions::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("checkout"));
        assert!(err.to_string().contains("did not match"));
        // Nothing runs after the failing step.
        let log = log.0.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1], "git checkout v9.9.9");
    }
}
