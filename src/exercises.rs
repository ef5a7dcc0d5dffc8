// ABOUTME: Exercise data access with stale-while-revalidate caching and offline fallbacks
// ABOUTME: Orchestrates cache, connectivity, and adaptive retry for catalog queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Exercise Data Access
//!
//! Every query follows the same order:
//!
//! 1. a fresh cache entry is returned at once; when online a background
//!    refresh is spawned and its failure ignored;
//! 2. offline, a copy derived from the cached full catalog is returned, or
//!    the call fails with `OfflineNoCache`;
//! 3. online, the remote catalog is fetched under the retry policy; if that
//!    fails a copy derived from the cached catalog still wins over an error.
//!
//! Each cache key carries a generation counter. A fetch records the
//! generation current when it was issued and only commits to the cache if no
//! newer fetch for the same key has been issued since.

use crate::cache::{CacheKey, CacheTtlConfig, PersistentCache};
use crate::connectivity::ConnectivityMonitor;
use dashmap::DashMap;
use repsync_core::constants::messages;
use repsync_core::errors::provider::ProviderError;
use repsync_core::errors::{AppError, AppResult};
use repsync_core::models::{normalize_term, Exercise, ExerciseFilter};
use repsync_providers::{list_all, ExerciseSource, RetryExecutor, ServiceStatus};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

struct RepositoryInner {
    source: Arc<dyn ExerciseSource>,
    cache: PersistentCache,
    ttl: CacheTtlConfig,
    retry: RetryExecutor,
    connectivity: Arc<ConnectivityMonitor>,
    page_size: u32,
    generations: DashMap<String, u64>,
    commit_lock: Mutex<()>,
}

/// Exercise queries over the remote catalog
#[derive(Clone)]
pub struct ExerciseRepository {
    inner: Arc<RepositoryInner>,
}

impl ExerciseRepository {
    /// Create a repository
    #[must_use]
    pub fn new(
        source: Arc<dyn ExerciseSource>,
        cache: PersistentCache,
        ttl: CacheTtlConfig,
        retry: RetryExecutor,
        connectivity: Arc<ConnectivityMonitor>,
        page_size: u32,
    ) -> Self {
        Self {
            inner: Arc::new(RepositoryInner {
                source,
                cache,
                ttl,
                retry,
                connectivity,
                page_size,
                generations: DashMap::new(),
                commit_lock: Mutex::new(()),
            }),
        }
    }

    /// The full catalog
    ///
    /// # Errors
    ///
    /// Returns `OfflineNoCache` when offline without a cached catalog, or the
    /// classified remote failure when online and nothing is cached.
    pub async fn all_exercises(&self) -> AppResult<Vec<Exercise>> {
        self.serve_list(CacheKey::catalog(), ExerciseFilter::default())
            .await
    }

    /// Exercises targeting one muscle
    ///
    /// # Errors
    ///
    /// As [`ExerciseRepository::all_exercises`].
    pub async fn by_muscle(&self, muscle: &str) -> AppResult<Vec<Exercise>> {
        self.serve_list(CacheKey::by_muscle(muscle), ExerciseFilter::muscle(muscle))
            .await
    }

    /// Exercises using one equipment type
    ///
    /// # Errors
    ///
    /// As [`ExerciseRepository::all_exercises`].
    pub async fn by_equipment(&self, equipment: &str) -> AppResult<Vec<Exercise>> {
        self.serve_list(
            CacheKey::by_equipment(equipment),
            ExerciseFilter::equipment(equipment),
        )
        .await
    }

    /// Case-insensitive search over name, muscle, and equipment
    ///
    /// The catalog has no search endpoint; results are filtered from the full
    /// catalog and cached under their own key.
    ///
    /// # Errors
    ///
    /// As [`ExerciseRepository::all_exercises`].
    pub async fn search(&self, query: &str) -> AppResult<Vec<Exercise>> {
        let needle = normalize_term(query);
        if needle.is_empty() {
            return self.all_exercises().await;
        }

        let key = CacheKey::search(&needle);
        let ttl = self.inner.ttl.ttl_for_resource(&key.resource);
        if let Some(cached) = self.inner.cache.get::<Vec<Exercise>>(&key, ttl).await {
            debug!(key = %key, "Search served from cache");
            if self.is_online() {
                self.spawn_search_refresh(key, needle);
            }
            return Ok(cached);
        }

        let generation = self.inner.begin(&key);
        if let Some(catalog) = self.cached_catalog().await {
            let results = filter_by_query(catalog, &needle);
            self.inner.commit(&key, generation, &results).await;
            return Ok(results);
        }

        if !self.is_online() {
            return Err(AppError::offline_no_cache(messages::OFFLINE_NO_EXERCISES));
        }

        let catalog = self.fetch_catalog().await?;
        let results = filter_by_query(catalog, &needle);
        self.inner.commit(&key, generation, &results).await;
        Ok(results)
    }

    /// One exercise by id
    ///
    /// The exercise's own cache entry and the cached catalog are consulted
    /// before any network call.
    ///
    /// # Errors
    ///
    /// Returns `OfflineNoCache` when offline and the exercise is not stored
    /// locally, `ResourceNotFound` when the catalog does not know the id, or
    /// the classified remote failure.
    pub async fn by_id(&self, id: &str) -> AppResult<Exercise> {
        let key = CacheKey::exercise(id);
        let ttl = self.inner.ttl.ttl_for_resource(&key.resource);
        if let Some(cached) = self.inner.cache.get::<Exercise>(&key, ttl).await {
            if self.is_online() {
                self.spawn_exercise_refresh(key, id.to_owned());
            }
            return Ok(cached);
        }

        if let Some(found) = self
            .cached_catalog()
            .await
            .and_then(|catalog| catalog.into_iter().find(|exercise| exercise.id == id))
        {
            debug!(id, "Exercise served from cached catalog");
            return Ok(found);
        }

        if !self.is_online() {
            return Err(AppError::offline_no_cache(messages::OFFLINE_NO_EXERCISE));
        }

        self.fetch_exercise(&key, id).await.map_err(|e| match e.root() {
            ProviderError::NotFound { .. } => {
                AppError::not_found(messages::EXERCISE_NOT_FOUND).with_source(e)
            }
            _ => AppError::from(e),
        })
    }

    /// Remove cached exercise data, optionally only keys containing `matching`
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn clear_cache(&self, matching: Option<&str>) -> AppResult<usize> {
        self.inner.cache.clear(matching).await
    }

    /// Current wake detector state
    #[must_use]
    pub fn service_status(&self) -> ServiceStatus {
        self.inner.retry.detector().status()
    }

    /// The cached full catalog, if fresh
    pub async fn cached_catalog(&self) -> Option<Vec<Exercise>> {
        let key = CacheKey::catalog();
        let ttl = self.inner.ttl.ttl_for_resource(&key.resource);
        self.inner.cache.get(&key, ttl).await
    }

    fn is_online(&self) -> bool {
        self.inner.connectivity.is_online()
    }

    async fn serve_list(&self, key: CacheKey, filter: ExerciseFilter) -> AppResult<Vec<Exercise>> {
        let ttl = self.inner.ttl.ttl_for_resource(&key.resource);
        if let Some(cached) = self.inner.cache.get::<Vec<Exercise>>(&key, ttl).await {
            debug!(key = %key, count = cached.len(), "Exercises served from cache");
            if self.is_online() {
                self.spawn_list_refresh(key, filter);
            }
            return Ok(cached);
        }

        if !self.is_online() {
            if let Some(derived) = self.derive_from_catalog(&filter).await {
                info!(key = %key, count = derived.len(), "Offline, serving exercises derived from cached catalog");
                return Ok(derived);
            }
            return Err(AppError::offline_no_cache(messages::OFFLINE_NO_EXERCISES));
        }

        match self.fetch_list(&key, &filter).await {
            Ok(exercises) => Ok(exercises),
            Err(e) => {
                if let Some(derived) = self.derive_from_catalog(&filter).await {
                    warn!(key = %key, error = %e, "Remote fetch failed, serving cached catalog copy");
                    return Ok(derived);
                }
                Err(e.into())
            }
        }
    }

    async fn derive_from_catalog(&self, filter: &ExerciseFilter) -> Option<Vec<Exercise>> {
        if filter == &ExerciseFilter::default() {
            return None;
        }
        self.cached_catalog().await.map(|catalog| {
            catalog
                .into_iter()
                .filter(|exercise| exercise.matches_filter(filter))
                .collect()
        })
    }

    async fn fetch_list(
        &self,
        key: &CacheKey,
        filter: &ExerciseFilter,
    ) -> Result<Vec<Exercise>, ProviderError> {
        let source = self.inner.source.as_ref();
        let page_size = self.inner.page_size;
        self.fetch_and_commit(key, &key.to_string(), move || async move {
            let records = list_all(source, filter, page_size).await?;
            Ok(records.into_iter().map(Exercise::from).collect())
        })
        .await
    }

    async fn fetch_catalog(&self) -> Result<Vec<Exercise>, ProviderError> {
        let filter = ExerciseFilter::default();
        self.fetch_list(&CacheKey::catalog(), &filter).await
    }

    async fn fetch_exercise(&self, key: &CacheKey, id: &str) -> Result<Exercise, ProviderError> {
        let source = self.inner.source.as_ref();
        self.fetch_and_commit(key, &key.to_string(), move || async move {
            source.get(id).await.map(Exercise::from)
        })
        .await
    }

    async fn fetch_and_commit<T, F, Fut>(
        &self,
        key: &CacheKey,
        context: &str,
        fetch: F,
    ) -> Result<T, ProviderError>
    where
        T: Serialize + Sync,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let generation = self.inner.begin(key);
        let value = self.inner.retry.run(context, fetch).await?;
        self.inner.commit(key, generation, &value).await;
        Ok(value)
    }

    fn spawn_list_refresh(&self, key: CacheKey, filter: ExerciseFilter) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.fetch_list(&key, &filter).await {
                debug!(key = %key, error = %e, "Background refresh failed");
            }
        });
    }

    fn spawn_search_refresh(&self, key: CacheKey, needle: String) {
        let this = self.clone();
        tokio::spawn(async move {
            let generation = this.inner.begin(&key);
            match this.fetch_catalog().await {
                Ok(catalog) => {
                    let results = filter_by_query(catalog, &needle);
                    this.inner.commit(&key, generation, &results).await;
                }
                Err(e) => debug!(key = %key, error = %e, "Background search refresh failed"),
            }
        });
    }

    fn spawn_exercise_refresh(&self, key: CacheKey, id: String) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.fetch_exercise(&key, &id).await {
                debug!(key = %key, error = %e, "Background refresh failed");
            }
        });
    }
}

impl RepositoryInner {
    /// Issue a new generation for `key`
    fn begin(&self, key: &CacheKey) -> u64 {
        let mut generation = self.generations.entry(key.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Store `value` if `generation` is still the latest issued for `key`
    async fn commit<T: Serialize + Sync>(&self, key: &CacheKey, generation: u64, value: &T) {
        let _commit = self.commit_lock.lock().await;
        let latest = self
            .generations
            .get(&key.to_string())
            .map_or(0, |current| *current);
        if latest != generation {
            debug!(key = %key, generation, latest, "Superseded response not committed");
            return;
        }
        if let Err(e) = self.cache.set(key, value).await {
            warn!(key = %key, error = %e, "Failed to store exercises in cache");
        }
    }
}

fn filter_by_query(catalog: Vec<Exercise>, needle: &str) -> Vec<Exercise> {
    catalog
        .into_iter()
        .filter(|exercise| exercise.matches_query(needle))
        .collect()
}
