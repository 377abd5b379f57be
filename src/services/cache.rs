//! Directory Cache
//!
//! Holds the most recently fetched author directory with an optional TTL.
//! Refreshes are single-flight: concurrent misses wait on one loader instead
//! of each calling the upstream.

use parking_lot::RwLock;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::directory::AuthorDirectory;

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Arc<AuthorDirectory>,
    created_at: Instant,
}

impl CacheEntry {
    fn new(value: Arc<AuthorDirectory>) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.created_at.elapsed() > ttl)
    }
}

/// Outcome of [`DirectoryCache::get_or_refresh`]
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Served from a fresh entry
    Hit(Arc<AuthorDirectory>),
    /// Loaded by this call and stored
    Loaded(Arc<AuthorDirectory>),
    /// The loader failed; nothing was stored
    Failed,
}

impl Lookup {
    pub fn into_value(self) -> Option<Arc<AuthorDirectory>> {
        match self {
            Lookup::Hit(value) | Lookup::Loaded(value) => Some(value),
            Lookup::Failed => None,
        }
    }
}

/// Cache counters
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub invalidations: u64,
    pub populated: bool,
    pub age_seconds: Option<u64>,
}

#[derive(Debug)]
pub struct DirectoryCache {
    ttl: Option<Duration>,
    entry: RwLock<Option<CacheEntry>>,
    refresh_guard: Mutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    invalidations: AtomicU64,
}

impl DirectoryCache {
    /// `ttl` of `None` keeps an entry until it is invalidated.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
            refresh_guard: Mutex::new(()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    fn peek(&self) -> Option<Arc<AuthorDirectory>> {
        let guard = self.entry.read();
        guard
            .as_ref()
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Returns the cached directory if present and fresh.
    pub fn get(&self) -> Option<Arc<AuthorDirectory>> {
        match self.peek() {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, value: Arc<AuthorDirectory>) {
        *self.entry.write() = Some(CacheEntry::new(value));
    }

    /// Returns the cached directory, or runs `loader` once to populate it.
    ///
    /// Callers that miss while another caller is loading wait for that load
    /// and reuse its result. A loader returning `None` leaves the cache empty.
    pub async fn get_or_refresh<F, Fut>(&self, loader: F) -> Lookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<AuthorDirectory>>,
    {
        if let Some(value) = self.get() {
            return Lookup::Hit(value);
        }

        let _guard = self.refresh_guard.lock().await;

        // another caller may have finished loading while we waited
        if let Some(value) = self.peek() {
            debug!("Directory cache populated by concurrent refresh");
            self.misses.fetch_sub(1, Ordering::Relaxed);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Lookup::Hit(value);
        }

        self.refreshes.fetch_add(1, Ordering::Relaxed);
        match loader().await {
            Some(directory) => {
                let value = Arc::new(directory);
                self.insert(value.clone());
                Lookup::Loaded(value)
            }
            None => Lookup::Failed,
        }
    }

    pub fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        *self.entry.write() = None;
    }

    pub fn stats(&self) -> CacheStats {
        let entry = self.entry.read();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            populated: entry.is_some(),
            age_seconds: entry.as_ref().map(|e| e.created_at.elapsed().as_secs()),
        }
    }
}
