//! Deduplication of concurrent identical queries.
//!
//! The first caller for a key starts the query; later callers for the same
//! key attach to the same shared future. The registry entry is removed by the
//! query itself when it settles, so removal happens exactly once however many
//! waiters there are, and both success and failure clear it.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use gitpkg_process::GitResult;
use tracing::trace;

/// A query shared between every caller waiting on the same key.
pub type SharedQuery<V> = Shared<BoxFuture<'static, GitResult<V>>>;

/// Registry of queries that have started but not settled.
pub struct InFlight<V> {
    pending: Mutex<HashMap<String, SharedQuery<V>>>,
}

impl<V> InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedQuery<V>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach to the query for `key`, starting it with `start` if none is
    /// pending.
    ///
    /// `start` is only called when this caller is the first one. The returned
    /// future is lazy: the query makes progress while any waiter polls it.
    pub fn join<F, Fut>(self: &Arc<Self>, key: &str, start: F) -> SharedQuery<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GitResult<V>> + Send + 'static,
    {
        let mut pending = self.lock();
        if let Some(existing) = pending.get(key) {
            trace!(key, "joining in-flight query");
            return existing.clone();
        }

        let registry = Arc::clone(self);
        let owned_key = key.to_string();
        let query = start();
        let shared = async move {
            let result = query.await;
            registry.settle(&owned_key);
            result
        }
        .boxed()
        .shared();

        pending.insert(key.to_string(), shared.clone());
        shared
    }

    fn settle(&self, key: &str) {
        trace!(key, "in-flight query settled");
        self.lock().remove(key);
    }

    /// Whether a query for `key` is pending.
    pub fn is_pending(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of pending queries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> fmt::Debug for InFlight<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("InFlight")
            .field("pending", &pending.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<V> Default for InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
