//! Shared key/value cache for POI query results.
//!
//! The cache is only an optimisation: read failures behave like misses and
//! write failures are logged and dropped.

use crate::models::{Coordinate, Place};
use dashmap::DashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Backend(String),
}

/// Byte-oriented store with per-entry expiry.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, CacheError>> + Send;

    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}

struct MemoryEntry {
    expires_at: Instant,
    value: Vec<u8>,
}

// how often a write also evicts every expired entry
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Process-local store, shared across requests behind an `Arc`.
///
/// Expired entries are dropped on read and, at most once per sweep
/// interval, in bulk on write.
pub struct MemoryCacheStore {
    entries: DashMap<String, MemoryEntry>,
    sweep_interval: Duration,
    next_sweep: Mutex<Instant>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            sweep_interval,
            next_sweep: Mutex::new(Instant::now() + sweep_interval),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep_expired(&self, now: Instant) {
        let due = match self.next_sweep.try_lock() {
            Ok(mut next_sweep) if *next_sweep <= now => {
                *next_sweep = now + self.sweep_interval;
                true
            }
            _ => false,
        };

        if !due {
            return;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);

        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!("evicted {} expired cache entries", evicted);
        }
    }
}

impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        self.sweep_expired(now);

        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                expires_at: now + ttl,
                value,
            },
        );
        Ok(())
    }
}

/// Serialises place lists into a [`CacheStore`] under interest + anchor keys.
pub struct PoiCache<S> {
    store: Arc<S>,
    ttl: Duration,
    key_precision: usize,
}

impl<S> Clone for PoiCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
            key_precision: self.key_precision,
        }
    }
}

impl<S: CacheStore> PoiCache<S> {
    pub fn new(store: Arc<S>, ttl: Duration, key_precision: usize) -> Self {
        Self {
            store,
            ttl,
            key_precision,
        }
    }

    pub fn key_for(&self, interest: &str, anchor: Coordinate) -> String {
        format!(
            "overpass:poi:{}:{:.*},{:.*}",
            interest,
            self.key_precision,
            anchor.lat,
            self.key_precision,
            anchor.lon
        )
    }

    pub async fn get(&self, key: &str) -> Option<Vec<Place>> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("cache read failed for {}: {}", key, err);
                return None;
            }
        };

        match serde_json::from_slice::<Vec<Place>>(&bytes) {
            Ok(places) => Some(places),
            Err(err) => {
                tracing::debug!("ignoring undecodable cache entry {}: {}", key, err);
                None
            }
        }
    }

    pub async fn set(&self, key: &str, places: &[Place]) {
        let bytes = match serde_json::to_vec(places) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("could not serialise places for cache key {}: {}", key, err);
                return;
            }
        };

        if let Err(err) = self.store.set(key, bytes, self.ttl).await {
            tracing::warn!("cache write failed for {}: {}", key, err);
        }
    }
}
