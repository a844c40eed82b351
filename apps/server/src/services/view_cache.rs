//! Per-session cache of composed views with path-prefix revalidation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

/// Path prefix of every composed view.
pub const VIEW_ROOT: &str = "/api/v1";

/// Cache path of a view, e.g. `view_path("/scanreports")`.
pub fn view_path(page: &str) -> String {
    format!("{VIEW_ROOT}{page}")
}

/// Whether `path` is `prefix` itself or lies below it.
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => {
            prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: String,
    path: String,
}

#[derive(Debug, Clone)]
struct CachedView {
    body: serde_json::Value,
    stored_at: Instant,
}

/// Composed GET views keyed by credential fingerprint and path plus query.
///
/// Mutations call [`ViewCache::revalidate_path`] so the next render of any
/// affected page goes back to the backend. Every revalidation bumps a
/// generation counter; a view built before the bump is never stored.
#[derive(Debug, Clone)]
pub struct ViewCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<CacheKey, CachedView>>>,
    generation: Arc<AtomicU64>,
}

impl ViewCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current revalidation generation. Capture it before building a view.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// A fresh cached view, if any.
    pub async fn get(&self, fingerprint: &str, path: &str) -> Option<serde_json::Value> {
        if !self.is_enabled() {
            return None;
        }

        let key = CacheKey {
            fingerprint: fingerprint.to_string(),
            path: path.to_string(),
        };
        let entries = self.entries.read().await;
        entries
            .get(&key)
            .filter(|view| view.stored_at.elapsed() < self.ttl)
            .map(|view| view.body.clone())
    }

    /// Store a view built from data read at `built_at` (see [`generation`]).
    /// Returns `false` when a revalidation happened since, leaving the cache
    /// untouched.
    ///
    /// [`generation`]: ViewCache::generation
    pub async fn insert(
        &self,
        fingerprint: &str,
        path: &str,
        body: serde_json::Value,
        built_at: u64,
    ) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let mut entries = self.entries.write().await;
        if self.generation() != built_at {
            debug!(path = %path, "View built before a revalidation, not cached");
            return false;
        }
        entries.retain(|_, view| view.stored_at.elapsed() < self.ttl);
        entries.insert(
            CacheKey {
                fingerprint: fingerprint.to_string(),
                path: path.to_string(),
            },
            CachedView {
                body,
                stored_at: Instant::now(),
            },
        );
        true
    }

    /// Drop every cached view under `prefix`, for all sessions.
    /// Returns the number of entries removed.
    pub async fn revalidate_path(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        let before = entries.len();
        entries.retain(|key, _| !is_under(&key.path, prefix));
        let removed = before - entries.len();
        debug!(prefix = %prefix, removed, "Revalidated cached views");
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
