// ABOUTME: Dependency-injection root wiring every RepSync component from configuration
// ABOUTME: Owns startup purge, connectivity lifecycle, and the signed-in user's resync hook
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sync Context
//!
//! Components are built once and shared through `Arc`. One
//! [`ServiceWakeDetector`] is shared by every retry executor so all remote
//! outcomes feed the same service status.

use crate::auth::AuthService;
use crate::cache::PersistentCache;
use crate::config::{ExerciseApiConfig, StorageBackend, StorageConfig, SyncConfig};
use crate::connectivity::{ConnectivityMonitor, NetworkState};
use crate::exercises::ExerciseRepository;
use crate::preferences::{PreferenceResyncHook, PreferenceSync};
use crate::rate_limiting::RateLimiter;
use crate::routines::RoutineStore;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use repsync_core::clock::{Clock, SystemClock};
use repsync_core::errors::AppResult;
use repsync_providers::{
    initialize_shared_client, AuthProvider, DocumentStore, ExerciseSource, HttpExerciseApi,
    RetryExecutor, ServiceWakeDetector,
};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{info, warn};

/// External collaborators the layer runs against
pub struct Collaborators {
    /// Exercise catalog
    pub exercise_source: Arc<dyn ExerciseSource>,
    /// Remote document store for preferences
    pub document_store: Arc<dyn DocumentStore>,
    /// Authentication backend
    pub auth_provider: Arc<dyn AuthProvider>,
    /// Local persisted key-value store
    pub store: Arc<dyn KeyValueStore>,
    /// Wall clock
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Collaborators with the system clock
    #[must_use]
    pub fn new(
        exercise_source: Arc<dyn ExerciseSource>,
        document_store: Arc<dyn DocumentStore>,
        auth_provider: Arc<dyn AuthProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            exercise_source,
            document_store,
            auth_provider,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Open the local store selected by configuration
///
/// # Errors
///
/// Returns a storage error if the file backend cannot be opened.
pub async fn open_store(config: &StorageConfig) -> AppResult<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::File => {
            let store = FileStore::open(config.store_path()).await?;
            Ok(Arc::new(store))
        }
    }
}

/// HTTP exercise catalog client on the shared connection pool
#[must_use]
pub fn http_exercise_source(config: &ExerciseApiConfig) -> Arc<dyn ExerciseSource> {
    initialize_shared_client(config.connect_timeout_secs);
    Arc::new(HttpExerciseApi::new(config.base_url.clone()))
}

/// Every component of the data layer, wired together
pub struct SyncContext {
    config: SyncConfig,
    cache: PersistentCache,
    connectivity: Arc<ConnectivityMonitor>,
    detector: Arc<ServiceWakeDetector>,
    exercises: ExerciseRepository,
    preferences: Arc<PreferenceSync>,
    routines: RoutineStore,
    auth: AuthService,
    rate_limiter: Arc<RateLimiter>,
    active_user: RwLock<Option<String>>,
}

impl SyncContext {
    /// Build every component
    #[must_use]
    pub fn new(config: SyncConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            exercise_source,
            document_store,
            auth_provider,
            store,
            clock,
        } = collaborators;

        let detector = Arc::new(ServiceWakeDetector::new(
            config.retry.detector(),
            Arc::clone(&clock),
        ));
        let retry = RetryExecutor::new(config.retry.policy(), Arc::clone(&detector));
        let connectivity = Arc::new(ConnectivityMonitor::new(
            config.connectivity.clone(),
            Some(Arc::clone(&document_store)),
        ));
        let cache = PersistentCache::new(Arc::clone(&store), Arc::clone(&clock));

        let exercises = ExerciseRepository::new(
            exercise_source,
            cache.clone(),
            config.cache.clone(),
            retry.clone(),
            Arc::clone(&connectivity),
            config.exercise_api.page_size,
        );
        let preferences = Arc::new(PreferenceSync::new(
            Arc::clone(&store),
            document_store,
            retry,
            Arc::clone(&connectivity),
            Arc::clone(&clock),
        ));
        let routines = RoutineStore::new(store, Arc::clone(&clock));
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limits, clock));
        let auth = AuthService::new(auth_provider, Arc::clone(&rate_limiter), &config.rate_limits);

        Self {
            config,
            cache,
            connectivity,
            detector,
            exercises,
            preferences,
            routines,
            auth,
            rate_limiter,
            active_user: RwLock::new(None),
        }
    }

    /// Purge stale cache entries and start following the network signal
    ///
    /// The purge is best effort and never fails startup.
    pub async fn start(&self, signal: watch::Receiver<NetworkState>) {
        let purged = self
            .cache
            .purge_older_than(self.config.cache.purge_max_age())
            .await;
        info!(purged, "Startup cache purge finished");
        self.connectivity.start(signal);
    }

    /// Stop following the network signal and drop the resync hook
    pub fn shutdown(&self) {
        self.clear_active_user();
        self.connectivity.stop();
        info!("Sync context shut down");
    }

    /// Route reconnect resyncs to `user_id`'s preferences
    pub fn set_active_user(&self, user_id: &str) {
        if user_id.trim().is_empty() {
            warn!("Ignoring empty active user");
            return;
        }
        let hook = PreferenceResyncHook::new(Arc::clone(&self.preferences), user_id);
        self.connectivity.attach_resync_hook(Arc::new(hook));
        *self
            .active_user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(user_id.to_owned());
        info!(user_id, "Active user set");
    }

    /// Stop reconnect resyncs (sign-out)
    pub fn clear_active_user(&self) {
        self.connectivity.detach_resync_hook();
        self.active_user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// User whose preferences resync on reconnect
    #[must_use]
    pub fn active_user(&self) -> Option<String> {
        self.active_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Exercise queries
    #[must_use]
    pub const fn exercises(&self) -> &ExerciseRepository {
        &self.exercises
    }

    /// Preference sync
    #[must_use]
    pub fn preferences(&self) -> &PreferenceSync {
        &self.preferences
    }

    /// Routine store
    #[must_use]
    pub const fn routines(&self) -> &RoutineStore {
        &self.routines
    }

    /// Auth gateway
    #[must_use]
    pub const fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Connectivity monitor
    #[must_use]
    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.connectivity
    }

    /// Shared wake detector
    #[must_use]
    pub fn detector(&self) -> &Arc<ServiceWakeDetector> {
        &self.detector
    }

    /// Auth rate limiter
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Persistent cache
    #[must_use]
    pub const fn cache(&self) -> &PersistentCache {
        &self.cache
    }
}
