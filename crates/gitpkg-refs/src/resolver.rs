//! The remote reference resolver.
//!
//! [`RefResolver::resolve`] answers "what does this remote advertise?" with a
//! [`ResolutionResult`]. Results are cached per repository identifier and
//! concurrent identical requests share a single `git ls-remote`.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use gitpkg_process::{GitResult, GitRunner, Invocation, SystemGit};
use gitpkg_types::{GitOptions, ResolutionResult};
use tracing::{debug, instrument, trace};

use crate::cache::{RefCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::inflight::InFlight;
use crate::parse::parse_listing;

static GLOBAL: LazyLock<RefResolver> =
    LazyLock::new(|| RefResolver::new(Arc::new(SystemGit::new())));

/// Resolves, caches, and deduplicates remote reference listings.
#[derive(Clone)]
pub struct RefResolver {
    runner: Arc<dyn GitRunner>,
    cache: Arc<RefCache<Arc<ResolutionResult>>>,
    inflight: Arc<InFlight<Arc<ResolutionResult>>>,
}

impl RefResolver {
    /// A resolver with the default cache (100 entries, 5 minutes).
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self::with_cache(runner, DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_cache(runner: Arc<dyn GitRunner>, capacity: usize, ttl: Duration) -> Self {
        Self {
            runner,
            cache: Arc::new(RefCache::new(capacity, ttl)),
            inflight: Arc::new(InFlight::new()),
        }
    }

    /// The process-wide resolver backed by the system `git`.
    pub fn global() -> &'static RefResolver {
        &GLOBAL
    }

    /// List the remote's heads and tags, using the cache when possible.
    ///
    /// Callers asking for the same `repo` while a listing is running wait
    /// for that listing instead of starting another. They all receive the
    /// same result, or the same error.
    #[instrument(skip_all, fields(%repo))]
    pub async fn resolve(
        &self,
        repo: &str,
        options: &GitOptions,
    ) -> GitResult<Arc<ResolutionResult>> {
        if let Some(hit) = self.cache.get(repo) {
            trace!("ref cache hit");
            return Ok(hit);
        }

        let runner = Arc::clone(&self.runner);
        let cache = Arc::clone(&self.cache);
        let owned_repo = repo.to_string();
        let options = *options;
        let query = self.inflight.join(repo, move || async move {
            let result = Arc::new(list_remote(runner.as_ref(), &owned_repo, options).await?);
            debug!(
                repo = %owned_repo,
                refs = result.refs.len(),
                versions = result.versions.len(),
                "resolved remote refs"
            );
            cache.insert(owned_repo, Arc::clone(&result));
            Ok(result)
        });
        query.await
    }

    /// A cached result, without querying the remote.
    pub fn cached(&self, repo: &str) -> Option<Arc<ResolutionResult>> {
        self.cache.get(repo)
    }

    /// Forget the cached result for `repo`.
    pub fn invalidate(&self, repo: &str) -> bool {
        self.cache.invalidate(repo)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of listings currently running.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }
}

impl std::fmt::Debug for RefResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefResolver")
            .field("cache", &self.cache)
            .field("inflight", &self.inflight)
            .finish_non_exhaustive()
    }
}

/// Run `git ls-remote -h -t <repo>` and parse its output.
pub async fn list_remote(
    runner: &dyn GitRunner,
    repo: &str,
    options: GitOptions,
) -> GitResult<ResolutionResult> {
    let invocation = Invocation::new(["ls-remote", "-h", "-t"])
        .arg(repo)
        .options(options);
    let output = runner.run(&invocation).await?;
    Ok(parse_listing(&output.stdout))
}
