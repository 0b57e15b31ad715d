use std::path::Path;
use std::sync::Arc;

use gitpkg_clone::Cloner;
use gitpkg_process::{GitResult, GitRunner, SystemGit};
use gitpkg_refs::RefResolver;
use gitpkg_types::{GitOptions, RemoteReference, ResolutionResult};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::ConfigResult;

/// High-level gitpkg API.
///
/// Wraps a [`RefResolver`] and a [`Cloner`] that share one [`GitRunner`].
pub struct GitClient {
    resolver: RefResolver,
    cloner: Cloner,
}

impl GitClient {
    /// A client on the system `git` that shares the process-wide ref cache.
    pub fn new() -> Self {
        Self {
            resolver: RefResolver::global().clone(),
            cloner: Cloner::system(),
        }
    }

    /// A client built from `config`.
    ///
    /// The default config reuses the process-wide resolver; anything else
    /// gets a private cache.
    pub fn from_config(config: &ClientConfig) -> Self {
        if config.is_default() {
            return Self::new();
        }
        let runner: Arc<dyn GitRunner> = match &config.git_binary {
            Some(path) => Arc::new(SystemGit::with_binary(path)),
            None => Arc::new(SystemGit::new()),
        };
        Self::with_runner(runner, config)
    }

    /// Load a TOML config file and build a client from it.
    pub fn from_config_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = ClientConfig::load(path)?;
        Ok(Self::from_config(&config))
    }

    /// A client on a custom runner with its own cache.
    pub fn with_runner(runner: Arc<dyn GitRunner>, config: &ClientConfig) -> Self {
        Self {
            resolver: RefResolver::with_cache(
                Arc::clone(&runner),
                config.cache_capacity,
                config.cache_ttl(),
            ),
            cloner: Cloner::new(runner),
        }
    }

    pub fn resolver(&self) -> &RefResolver {
        &self.resolver
    }

    // ---- Remote resolution ----

    /// Branches, tags, versions and dist-tags advertised by `repo`.
    pub async fn resolve(
        &self,
        repo: &str,
        options: &GitOptions,
    ) -> GitResult<Arc<ResolutionResult>> {
        self.resolver.resolve(repo, options).await
    }

    /// Like [`resolve`](Self::resolve), with loosely typed options.
    pub async fn resolve_with(
        &self,
        repo: &str,
        options: &Value,
    ) -> GitResult<Arc<ResolutionResult>> {
        self.resolve(repo, &GitOptions::normalize(options)).await
    }

    /// Resolve `spec` (dist-tag, version, ref name or sha) against `repo`.
    #[instrument(skip(self, options))]
    pub async fn lookup(
        &self,
        repo: &str,
        spec: &str,
        options: &GitOptions,
    ) -> GitResult<Option<RemoteReference>> {
        let result = self.resolve(repo, options).await?;
        let found = result.resolve_spec(spec).cloned();
        debug!(found = found.is_some(), "spec lookup");
        Ok(found)
    }

    pub fn invalidate(&self, repo: &str) -> bool {
        self.resolver.invalidate(repo)
    }

    pub fn clear_cache(&self) {
        self.resolver.clear_cache();
    }

    // ---- Working copies ----

    /// Full clone of `repo` at `committish` into `target`; returns HEAD.
    pub async fn clone(
        &self,
        repo: &str,
        committish: &str,
        target: &Path,
        options: &GitOptions,
    ) -> GitResult<String> {
        self.cloner.clone(repo, committish, target, *options).await
    }

    /// Depth-1 clone of `branch` into `target`; returns HEAD.
    pub async fn shallow(
        &self,
        repo: &str,
        branch: Option<&str>,
        target: &Path,
        options: &GitOptions,
    ) -> GitResult<String> {
        self.cloner.shallow(repo, branch, target, *options).await
    }

    pub async fn checkout(
        &self,
        target: &Path,
        committish: &str,
        options: &GitOptions,
    ) -> GitResult<()> {
        self.cloner.checkout(target, committish, *options).await
    }

    pub async fn update_submodules(&self, target: &Path, options: &GitOptions) -> GitResult<()> {
        self.cloner.update_submodules(target, *options).await
    }

    pub async fn head_sha(&self, target: &Path, options: &GitOptions) -> GitResult<String> {
        self.cloner.head_sha(target, *options).await
    }
}

impl Default for GitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitClient")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use gitpkg_process::{GitOutput, Invocation};

    const LISTING: &str = "\
1111111111111111111111111111111111111111\tHEAD
1111111111111111111111111111111111111111\trefs/heads/main
1111111111111111111111111111111111111111\trefs/tags/v1.4.0
2222222222222222222222222222222222222222\trefs/tags/v1.3.0
";

    #[derive(Default)]
    struct Fake {
        listings: AtomicUsize,
    }

    #[async_trait]
    impl GitRunner for Fake {
        async fn run(&self, invocation: &Invocation) -> GitResult<GitOutput> {
            match invocation.subcommand().as_deref() {
                Some("ls-remote") => {
                    self.listings.fetch_add(1, Ordering::SeqCst);
                    Ok(GitOutput::new(LISTING))
                }
                Some("rev-parse") => Ok(GitOutput::new("1111111111111111111111111111111111111111\n")),
                _ => Ok(GitOutput::default()),
            }
        }
    }

    fn client(fake: &Arc<Fake>) -> GitClient {
        GitClient::with_runner(fake.clone(), &ClientConfig::default())
    }

    #[tokio::test]
    async fn lookup_by_dist_tag_version_and_branch() {
        let fake = Arc::new(Fake::default());
        let client = client(&fake);
        let opts = GitOptions::new();

        let latest = client.lookup("repo", "latest", &opts).await.unwrap().unwrap();
        assert_eq!(latest.name, "HEAD");
        assert_eq!(latest.sha, "1".repeat(40));
        let head = client.lookup("repo", "HEAD", &opts).await.unwrap().unwrap();
        assert_eq!(head.name, "v1.4.0");
        let older = client.lookup("repo", "v1.3.0", &opts).await.unwrap().unwrap();
        assert_eq!(older.sha, "2".repeat(40));
        let main = client.lookup("repo", "main", &opts).await.unwrap().unwrap();
        assert!(main.is_branch());
        assert!(client.lookup("repo", "v9.0.0", &opts).await.unwrap().is_none());

        assert_eq!(fake.listings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loosely_typed_options_are_normalized() {
        let fake = Arc::new(Fake::default());
        let client = client(&fake);
        let result = client
            .resolve_with("repo", &serde_json::json!({ "uid": "abc", "extra": true }))
            .await
            .unwrap();
        assert_eq!(result.versions.len(), 2);
    }

    #[tokio::test]
    async fn invalidate_requeries() {
        let fake = Arc::new(Fake::default());
        let client = client(&fake);
        client.resolve("repo", &GitOptions::new()).await.unwrap();
        assert!(client.invalidate("repo"));
        client.resolve("repo", &GitOptions::new()).await.unwrap();
        assert_eq!(fake.listings.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clone_and_shallow_return_head() {
        let fake = Arc::new(Fake::default());
        let client = client(&fake);
        let opts = GitOptions::new();
        let target = Path::new("/tmp/gitpkg-sdk-test");
        assert_eq!(
            client.clone("repo", "v1.4.0", target, &opts).await.unwrap(),
            "1".repeat(40)
        );
        assert_eq!(
            client.shallow("repo", None, target, &opts).await.unwrap(),
            "1".repeat(40)
        );
    }

    #[test]
    fn config_file_errors_surface_as_config_errors() {
        let err = GitClient::from_config_file("/nonexistent/gitpkg.toml").unwrap_err();
        assert!(matches!(err, crate::ConfigError::Read { .. }));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gitpkg.toml");
        std::fs::write(&path, "cache_capacity = 7\n").unwrap();
        let client = GitClient::from_config_file(&path).unwrap();
        assert!(client.resolver().cached("repo").is_none());
    }

    #[test]
    fn custom_config_gets_private_cache() {
        let config = ClientConfig {
            cache_capacity: 3,
            ..ClientConfig::default()
        };
        let client = GitClient::from_config(&config);
        assert!(client.resolver().cached("anything").is_none());
    }
}
