//! Clone workflows as ordered pipelines of git steps.
//!
//! A [`Workflow`] runs its [`Step`]s one after another. The first failure
//! stops the pipeline and is returned unchanged; nothing that earlier steps
//! wrote to disk is cleaned up. The final step reads `HEAD`, whose commit id
//! is the workflow's result.

use std::fmt;
use std::path::{Path, PathBuf};

use gitpkg_process::{GitError, GitOutput, GitResult, GitRunner, Invocation};
use gitpkg_types::GitOptions;
use tracing::{debug, instrument};

use crate::args::CloneArgs;

/// One git command in a workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// `git clone ... <repo> <target>`.
    Clone { repo: String, args: CloneArgs },
    /// `git checkout <committish>` inside the target.
    Checkout { committish: String },
    /// `git submodule update -q --init --recursive` inside the target.
    UpdateSubmodules,
    /// `git rev-parse --revs-only HEAD` inside the target.
    ReadHead,
}

impl Step {
    /// The invocation for this step against `target`.
    pub fn invocation(&self, target: &Path, options: GitOptions) -> Invocation {
        let invocation = match self {
            Step::Clone { repo, args } => Invocation::new(args.to_args(repo, target)),
            Step::Checkout { committish } => {
                Invocation::new(["checkout", committish.as_str()]).current_dir(target)
            }
            Step::UpdateSubmodules => {
                Invocation::new(["submodule", "update", "-q", "--init", "--recursive"])
                    .current_dir(target)
            }
            Step::ReadHead => {
                Invocation::new(["rev-parse", "--revs-only", "HEAD"]).current_dir(target)
            }
        };
        invocation.options(options)
    }

    fn name(&self) -> &'static str {
        match self {
            Step::Clone { .. } => "clone",
            Step::Checkout { .. } => "checkout",
            Step::UpdateSubmodules => "submodule-update",
            Step::ReadHead => "read-head",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered list of steps applied to one checkout directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workflow {
    target: PathBuf,
    steps: Vec<Step>,
}

impl Workflow {
    /// Full clone, checkout of `committish`, submodules, HEAD.
    pub fn full_clone(repo: &str, committish: &str, target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            steps: vec![
                Step::Clone {
                    repo: repo.to_string(),
                    args: CloneArgs::full(),
                },
                Step::Checkout {
                    committish: committish.to_string(),
                },
                Step::UpdateSubmodules,
                Step::ReadHead,
            ],
        }
    }

    /// Depth-1 single-branch clone of `branch`, submodules, HEAD.
    pub fn shallow_clone(repo: &str, branch: Option<&str>, target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            steps: vec![
                Step::Clone {
                    repo: repo.to_string(),
                    args: CloneArgs::shallow(branch),
                },
                Step::UpdateSubmodules,
                Step::ReadHead,
            ],
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order and return the commit id printed by the last.
    #[instrument(skip_all, fields(target = %self.target.display()))]
    pub async fn run(&self, runner: &dyn GitRunner, options: GitOptions) -> GitResult<String> {
        let mut last = (Invocation::default(), GitOutput::default());
        for step in &self.steps {
            debug!(%step, "running workflow step");
            let invocation = step.invocation(&self.target, options);
            let output = runner.run(&invocation).await?;
            last = (invocation, output);
        }
        commit_id(&last.0, &last.1)
    }
}

/// Check out `committish` inside an existing clone.
pub async fn checkout(
    runner: &dyn GitRunner,
    target: &Path,
    committish: &str,
    options: GitOptions,
) -> GitResult<()> {
    let step = Step::Checkout {
        committish: committish.to_string(),
    };
    runner.run(&step.invocation(target, options)).await?;
    Ok(())
}

/// Initialize and update all submodules recursively.
pub async fn update_submodules(
    runner: &dyn GitRunner,
    target: &Path,
    options: GitOptions,
) -> GitResult<()> {
    runner
        .run(&Step::UpdateSubmodules.invocation(target, options))
        .await?;
    Ok(())
}

/// The commit id `HEAD` points at inside `target`.
pub async fn head_sha(
    runner: &dyn GitRunner,
    target: &Path,
    options: GitOptions,
) -> GitResult<String> {
    let invocation = Step::ReadHead.invocation(target, options);
    let output = runner.run(&invocation).await?;
    commit_id(&invocation, &output)
}

/// The trimmed commit id in `output`; empty output is a failure.
fn commit_id(invocation: &Invocation, output: &GitOutput) -> GitResult<String> {
    let sha = output.stdout.trim();
    if sha.is_empty() {
        return Err(GitError::CommandFailed {
            command: invocation.command_line(),
            code: Some(0),
            stderr: "HEAD does not point at a commit".to_string(),
        });
    }
    Ok(sha.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use gitpkg_process::ErrorKind;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    /// Records invocations; fails the first one whose subcommand matches.
    #[derive(Default)]
    struct Recorder {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl Recorder {
        fn failing_on(subcommand: &'static str) -> Self {
            Self {
                fail_on: Some(subcommand),
                ..Self::default()
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(Invocation::command_line)
                .collect()
        }
    }

    #[async_trait]
    impl GitRunner for Recorder {
        async fn run(&self, invocation: &Invocation) -> GitResult<GitOutput> {
            self.calls.lock().unwrap().push(invocation.clone());
            let sub = invocation.subcommand().unwrap_or_default();
            if self.fail_on == Some(sub.as_str()) {
                return Err(GitError::CommandFailed {
                    command: invocation.command_line(),
                    code: Some(1),
                    stderr: format!("error: {sub} failed"),
                });
            }
            if sub == "rev-parse" {
                return Ok(GitOutput::new(format!("{SHA}\n")));
            }
            Ok(GitOutput::default())
        }
    }

    fn without_long_paths(mut workflow: Workflow) -> Workflow {
        for step in &mut workflow.steps {
            if let Step::Clone { args, .. } = step {
                args.long_paths = false;
            }
        }
        workflow
    }

    #[tokio::test]
    async fn full_clone_runs_steps_in_order() {
        let runner = Recorder::default();
        let workflow = without_long_paths(Workflow::full_clone("repo", "v1.0.0", "/tmp/t"));

        let sha = workflow.run(&runner, GitOptions::new()).await.unwrap();
        assert_eq!(sha, SHA);
        assert_eq!(
            runner.commands(),
            [
                "git clone -q repo /tmp/t",
                "git checkout v1.0.0",
                "git submodule update -q --init --recursive",
                "git rev-parse --revs-only HEAD",
            ]
        );
        let calls = runner.calls.lock().unwrap();
        assert!(calls[0].cwd.is_none());
        for call in &calls[1..] {
            assert_eq!(call.cwd.as_deref(), Some(Path::new("/tmp/t")));
        }
    }

    #[tokio::test]
    async fn shallow_clone_skips_checkout() {
        let runner = Recorder::default();
        let workflow = without_long_paths(Workflow::shallow_clone("repo", Some("main"), "/tmp/t"));

        let sha = workflow.run(&runner, GitOptions::new()).await.unwrap();
        assert_eq!(sha, SHA);
        assert_eq!(
            runner.commands(),
            [
                "git clone --depth=1 -q -b main repo /tmp/t",
                "git submodule update -q --init --recursive",
                "git rev-parse --revs-only HEAD",
            ]
        );
    }

    #[tokio::test]
    async fn first_failure_stops_pipeline() {
        let runner = Recorder::failing_on("checkout");
        let workflow = without_long_paths(Workflow::full_clone("repo", "nope", "/tmp/t"));

        let err = workflow.run(&runner, GitOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProcessFailed);
        assert_eq!(err.command(), Some("git checkout nope"));
        assert_eq!(runner.commands().len(), 2);
    }

    #[tokio::test]
    async fn clone_failure_surfaces_unchanged() {
        let runner = Recorder::failing_on("clone");
        let workflow = Workflow::shallow_clone("repo", Some("main"), "/tmp/t");
        let err = workflow.run(&runner, GitOptions::new()).await.unwrap_err();
        assert!(err.command().unwrap().starts_with("git clone"));
        assert_eq!(err.stderr(), Some("error: clone failed"));
        assert_eq!(runner.commands().len(), 1);
    }

    #[tokio::test]
    async fn options_reach_every_step() {
        let runner = Recorder::default();
        let opts = GitOptions::new().with_uid(501).with_gid(20);
        Workflow::full_clone("repo", "main", "/tmp/t")
            .run(&runner, opts)
            .await
            .unwrap();
        for call in runner.calls.lock().unwrap().iter() {
            assert_eq!(call.options, opts);
        }
    }

    /// Succeeds at every step but prints nothing.
    struct Silent;

    #[async_trait]
    impl GitRunner for Silent {
        async fn run(&self, _: &Invocation) -> GitResult<GitOutput> {
            Ok(GitOutput::new("\n"))
        }
    }

    #[tokio::test]
    async fn workflows_reject_empty_head() {
        for workflow in [
            Workflow::shallow_clone("repo", Some("main"), "/tmp/t"),
            Workflow::full_clone("repo", "main", "/tmp/t"),
        ] {
            let err = workflow.run(&Silent, GitOptions::new()).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ProcessFailed);
            assert_eq!(err.command(), Some("git rev-parse --revs-only HEAD"));
        }
    }

    #[tokio::test]
    async fn head_sha_rejects_empty_output() {
        let err = head_sha(&Silent, Path::new("/tmp/t"), GitOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProcessFailed);
    }

    #[tokio::test]
    async fn single_steps() {
        let runner = Recorder::default();
        let target = Path::new("/tmp/t");
        checkout(&runner, target, "abc123", GitOptions::new()).await.unwrap();
        update_submodules(&runner, target, GitOptions::new()).await.unwrap();
        assert_eq!(head_sha(&runner, target, GitOptions::new()).await.unwrap(), SHA);
        assert_eq!(runner.commands()[0], "git checkout abc123");
    }
}
