// Result cache keyed by the exact request tuple.
//
// Each (channel, keyword, limit) gets its own OnceCell, so concurrent
// identical requests wait on a single fetch instead of racing to populate the
// entry. A failed fetch drops its key, so the next request retries. With a
// TTL set, every lookup first prunes entries older than the TTL; without one,
// entries live as long as the process.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};
use tokio::time::Instant;
use tracing::debug;

use super::analysis::{AnalysisError, AnalysisPipeline};
use crate::models::Analysis;

/// Cache key: the request parameters, compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub channel: String,
    pub keyword: String,
    pub limit: usize,
}

impl CacheKey {
    pub fn new(channel: &str, keyword: &str, limit: usize) -> Self {
        Self {
            channel: channel.to_string(),
            keyword: keyword.to_string(),
            limit,
        }
    }
}

/// An analysis plus whether it came out of the cache.
#[derive(Debug, Clone)]
pub struct CachedAnalysis {
    pub analysis: Arc<Analysis>,
    pub cached: bool,
}

struct CacheEntry {
    cell: Arc<OnceCell<Arc<Analysis>>>,
    created_at: Instant,
}

/// Process-wide memo of analysis results.
pub struct AnalysisCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Option<Duration>,
}

impl AnalysisCache {
    /// Entries never expire.
    pub fn new() -> Self {
        Self::with_ttl(None)
    }

    /// Entries expire `ttl` after they were created. `None` or a zero
    /// duration means they never do.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: ttl.filter(|d| !d.is_zero()),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Number of keys currently tracked (including expired ones not yet pruned).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Return the cached analysis for `key`, or run `init` to produce it.
    ///
    /// `init` runs at most once per key per TTL window across concurrent
    /// callers. Errors are returned to every waiter of that attempt and are
    /// not stored.
    pub async fn get_or_try_insert_with<F, Fut>(
        &self,
        key: CacheKey,
        init: F,
    ) -> Result<CachedAnalysis, AnalysisError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Analysis, AnalysisError>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            let now = Instant::now();

            if let Some(ttl) = self.ttl {
                let before = entries.len();
                entries.retain(|_, entry| now.duration_since(entry.created_at) < ttl);
                let pruned = before - entries.len();
                if pruned > 0 {
                    debug!(pruned, "Dropped expired cache entries");
                }
            }

            entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry {
                    cell: Arc::new(OnceCell::new()),
                    created_at: now,
                })
                .cell
                .clone()
        };

        let computed = AtomicBool::new(false);
        let result = cell
            .get_or_try_init(|| {
                computed.store(true, Ordering::Relaxed);
                async move { init().await.map(Arc::new) }
            })
            .await;

        match result {
            Ok(analysis) => Ok(CachedAnalysis {
                analysis: analysis.clone(),
                cached: !computed.load(Ordering::Relaxed),
            }),
            Err(e) => {
                // Forget the key unless a later attempt already replaced or filled it
                let mut entries = self.entries.lock().await;
                let stale = entries
                    .get(&key)
                    .is_some_and(|entry| Arc::ptr_eq(&entry.cell, &cell) && !entry.cell.initialized());
                if stale {
                    entries.remove(&key);
                }
                Err(e)
            }
        }
    }

    /// Run `pipeline` through the cache.
    pub async fn analyze(
        &self,
        pipeline: &AnalysisPipeline,
        channel: &str,
        keyword: &str,
        limit: usize,
    ) -> Result<CachedAnalysis, AnalysisError> {
        self.get_or_try_insert_with(CacheKey::new(channel, keyword, limit), move || {
            pipeline.analyze(channel, keyword, limit)
        })
        .await
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}
