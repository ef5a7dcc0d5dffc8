// ABOUTME: Persistent cache storing timestamped JSON envelopes in the local key-value store
// ABOUTME: Lazy TTL eviction on read; corrupt entries and read failures degrade to misses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{key_matches, CacheKey};
use crate::storage::KeyValueStore;
use repsync_core::clock::{elapsed_since, Clock};
use repsync_core::errors::AppResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Stored cache envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Rendered cache key
    pub key: String,
    /// Cached value
    pub payload: T,
    /// Write time, epoch milliseconds
    pub stored_at_epoch_ms: i64,
}

/// Envelope read without decoding the payload, for maintenance scans
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryHeader {
    stored_at_epoch_ms: i64,
}

/// TTL cache over a [`KeyValueStore`]
///
/// Reads never fail: expired and undecodable entries are evicted and
/// reported as misses, and storage errors are logged and reported as misses.
#[derive(Clone)]
pub struct PersistentCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl PersistentCache {
    /// Create a cache writing into `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Read a value no older than `max_age`
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey, max_age: Duration) -> Option<T> {
        self.get_with_age(key, max_age).await.map(|(value, _)| value)
    }

    /// Read a value no older than `max_age`, together with its age
    pub async fn get_with_age<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        max_age: Duration,
    ) -> Option<(T, Duration)> {
        let raw_key = key.to_string();
        let text = match self.store.get(&raw_key).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %raw_key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&text) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %raw_key, error = %e, "Corrupt cache entry, evicting");
                self.evict(&raw_key).await;
                return None;
            }
        };

        let age = elapsed_since(self.clock.as_ref(), entry.stored_at_epoch_ms);
        if age > max_age {
            debug!(key = %raw_key, age_secs = age.as_secs(), "Cache entry expired, evicting");
            self.evict(&raw_key).await;
            return None;
        }

        Some((entry.payload, age))
    }

    /// Store a value stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns a serialization or storage error.
    pub async fn set<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        let raw_key = key.to_string();
        let entry = CacheEntry {
            key: raw_key.clone(),
            payload: value,
            stored_at_epoch_ms: self.clock.now_millis(),
        };
        let text = serde_json::to_string(&entry)?;
        self.store.set(&raw_key, text).await?;
        debug!(key = %raw_key, "Cache entry stored");
        Ok(())
    }

    /// Remove one entry
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.store.remove(&key.to_string()).await
    }

    /// Remove cache entries, optionally only those whose key contains `matching`
    ///
    /// `matching` may also be a parameter as typed (`"Push Up"`); it is
    /// normalized like key parameters before comparing.
    ///
    /// Keys outside the cache prefix are never touched.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn clear(&self, matching: Option<&str>) -> AppResult<usize> {
        let keys: Vec<String> = self
            .store
            .all_keys()
            .await?
            .into_iter()
            .filter(|key| CacheKey::is_cache_key(key))
            .filter(|key| matching.is_none_or(|needle| key_matches(key, needle)))
            .collect();

        if !keys.is_empty() {
            self.store.multi_remove(&keys).await?;
        }
        info!(removed = keys.len(), matching = ?matching, "Cache cleared");
        Ok(keys.len())
    }

    /// Remove entries older than `max_age` and entries that cannot be decoded
    ///
    /// Maintenance only: failures are logged and the count of removed entries
    /// so far is returned.
    pub async fn purge_older_than(&self, max_age: Duration) -> usize {
        let keys = match self.store.all_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Cache purge skipped: cannot list keys");
                return 0;
            }
        };

        let mut stale = Vec::new();
        for key in keys.into_iter().filter(|key| CacheKey::is_cache_key(key)) {
            let Ok(Some(text)) = self.store.get(&key).await else {
                continue;
            };
            let expired = serde_json::from_str::<EntryHeader>(&text).map_or(true, |header| {
                elapsed_since(self.clock.as_ref(), header.stored_at_epoch_ms) > max_age
            });
            if expired {
                stale.push(key);
            }
        }

        if stale.is_empty() {
            return 0;
        }
        match self.store.multi_remove(&stale).await {
            Ok(()) => {
                info!(removed = stale.len(), "Purged stale cache entries");
                stale.len()
            }
            Err(e) => {
                warn!(error = %e, "Cache purge failed");
                0
            }
        }
    }

    async fn evict(&self, raw_key: &str) {
        if let Err(e) = self.store.remove(raw_key).await {
            warn!(key = %raw_key, error = %e, "Failed to evict cache entry");
        }
    }
}
