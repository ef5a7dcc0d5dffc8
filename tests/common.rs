// ABOUTME: Shared test utilities and fakes for RepSync integration tests
// ABOUTME: Scripted exercise source, failing store, and repository wiring helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `repsync`
//!
//! Fakes stand in for the remote exercise catalog and the local store so the
//! data layer can be driven deterministically.

use async_trait::async_trait;
use repsync::cache::{CacheTtlConfig, PersistentCache};
use repsync::config::{ConnectivityConfig, RetryConfig};
use repsync::connectivity::ConnectivityMonitor;
use repsync::exercises::ExerciseRepository;
use repsync::storage::{KeyValueStore, MemoryStore};
use repsync_core::clock::{Clock, ManualClock};
use repsync_core::errors::provider::ProviderError;
use repsync_core::errors::{AppError, AppResult};
use repsync_core::models::{normalize_term, ExerciseFilter, ExerciseRecord};
use repsync_providers::{ExerciseSource, PageRequest, RetryExecutor, ServiceWakeDetector};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Epoch millis used as "now" by manual clocks in tests
pub const TEST_EPOCH_MS: i64 = 1_750_000_000_000;

/// How the fake source fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Every call times out at the transport
    Timeout,
    /// Every call returns this HTTP status
    Status(u16),
}

impl Failure {
    fn to_error(self) -> ProviderError {
        match self {
            Self::Timeout => ProviderError::Timeout {
                provider: "fake".to_owned(),
                timeout_ms: 1,
            },
            Self::Status(code) => ProviderError::api("fake", code, "scripted failure"),
        }
    }
}

/// Scripted exercise catalog
#[derive(Default)]
pub struct FakeExerciseSource {
    catalog: Mutex<Vec<ExerciseRecord>>,
    failure: Mutex<Option<Failure>>,
    list_delays: Mutex<VecDeque<Duration>>,
    list_calls: AtomicU32,
    get_calls: AtomicU32,
}

impl FakeExerciseSource {
    pub fn with_catalog(catalog: Vec<ExerciseRecord>) -> Arc<Self> {
        Arc::new(Self {
            catalog: Mutex::new(catalog),
            ..Self::default()
        })
    }

    pub fn set_catalog(&self, catalog: Vec<ExerciseRecord>) {
        *self.catalog.lock().unwrap() = catalog;
    }

    pub fn fail_with(&self, failure: Option<Failure>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// Delay applied to the next list calls, one entry per call
    pub fn push_list_delay(&self, delay: Duration) {
        self.list_delays.lock().unwrap().push_back(delay);
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u32 {
        self.list_calls() + self.get_calls()
    }

    fn scripted_failure(&self) -> Option<ProviderError> {
        self.failure.lock().unwrap().map(Failure::to_error)
    }
}

#[async_trait]
impl ExerciseSource for FakeExerciseSource {
    async fn list(
        &self,
        filter: &ExerciseFilter,
        page: PageRequest,
    ) -> Result<Vec<ExerciseRecord>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        // Respond with the catalog as it was when the request arrived
        let catalog = self.catalog.lock().unwrap().clone();
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.scripted_failure() {
            return Err(error);
        }

        Ok(catalog
            .into_iter()
            .filter(|record| {
                filter
                    .muscle
                    .as_ref()
                    .is_none_or(|m| normalize_term(&record.muscle) == normalize_term(m))
                    && filter
                        .equipment
                        .as_ref()
                        .is_none_or(|e| normalize_term(&record.equipment) == normalize_term(e))
            })
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn get(&self, id: &str) -> Result<ExerciseRecord, ProviderError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.scripted_failure() {
            return Err(error);
        }
        self.catalog
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                provider: "fake".to_owned(),
                resource_type: "exercise".to_owned(),
                resource_id: id.to_owned(),
            })
    }
}

/// Key-value store whose every operation fails
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::storage("disk unavailable"))
    }

    async fn set(&self, _key: &str, _value: String) -> AppResult<()> {
        Err(AppError::storage("disk unavailable"))
    }

    async fn remove(&self, _key: &str) -> AppResult<()> {
        Err(AppError::storage("disk unavailable"))
    }

    async fn all_keys(&self) -> AppResult<Vec<String>> {
        Err(AppError::storage("disk unavailable"))
    }

    async fn multi_remove(&self, _keys: &[String]) -> AppResult<()> {
        Err(AppError::storage("disk unavailable"))
    }
}

/// Memory store whose reads of one key fail a set number of times
pub struct FlakyReadStore {
    pub inner: MemoryStore,
    key: String,
    failures_left: AtomicU32,
}

impl FlakyReadStore {
    pub fn new(key: &str, failures: u32) -> Self {
        Self {
            inner: MemoryStore::new(),
            key: key.to_owned(),
            failures_left: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyReadStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if key == self.key
            && self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(AppError::storage("transient read failure"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key).await
    }

    async fn all_keys(&self) -> AppResult<Vec<String>> {
        self.inner.all_keys().await
    }

    async fn multi_remove(&self, keys: &[String]) -> AppResult<()> {
        self.inner.multi_remove(keys).await
    }
}

/// Small catalog covering two muscles and two equipment types
pub fn sample_catalog() -> Vec<ExerciseRecord> {
    vec![
        ExerciseRecord::new("0001", "Bench Press", "Chest", "Barbell"),
        ExerciseRecord::new("0002", "Push Up", "chest", "body weight"),
        ExerciseRecord::new("0003", "Dumbbell Row", "back", "Dumbbell"),
        ExerciseRecord::new("0004", "Pull Up", "Back", "body weight"),
        ExerciseRecord::new("0005", "Incline Dumbbell Press", "chest", "dumbbell"),
    ]
}

/// Everything an exercise repository test needs to poke at
pub struct RepositoryHarness {
    pub repository: ExerciseRepository,
    pub source: Arc<FakeExerciseSource>,
    pub store: Arc<MemoryStore>,
    pub cache: PersistentCache,
    pub clock: Arc<ManualClock>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub detector: Arc<ServiceWakeDetector>,
}

impl RepositoryHarness {
    pub fn new(source: Arc<FakeExerciseSource>) -> Self {
        init_test_logging();
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(TEST_EPOCH_MS));
        let clock_dyn: Arc<dyn Clock> = clock.clone();
        let cache = PersistentCache::new(store.clone(), clock_dyn.clone());
        let retry_config = RetryConfig::default();
        let detector = Arc::new(ServiceWakeDetector::new(retry_config.detector(), clock_dyn));
        let retry = RetryExecutor::new(retry_config.policy(), detector.clone());
        let connectivity = Arc::new(ConnectivityMonitor::new(ConnectivityConfig::default(), None));
        let repository = ExerciseRepository::new(
            source.clone(),
            cache.clone(),
            CacheTtlConfig::default(),
            retry,
            connectivity.clone(),
            100,
        );
        Self {
            repository,
            source,
            store,
            cache,
            clock,
            connectivity,
            detector,
        }
    }

    pub fn go_offline(&self) {
        self.connectivity
            .set_network_state(repsync::connectivity::NetworkState::offline());
    }

    pub fn go_online(&self) {
        self.connectivity
            .set_network_state(repsync::connectivity::NetworkState::online());
    }
}

/// Let spawned background tasks run to completion
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(1)).await;
}
