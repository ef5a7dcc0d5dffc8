// ABOUTME: Remote document store interface (get/set documents, toggle network)
// ABOUTME: In-memory implementation with simulated outages for local runs and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use dashmap::DashMap;
use repsync_core::errors::provider::ProviderError;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Provider name used in errors raised by the in-memory store
const PROVIDER_NAME: &str = "document-store";

/// Remote document database
///
/// Errors carry the backend's classification code (`unavailable`,
/// `deadline-exceeded`, `permission-denied`, ...) via
/// [`ProviderError::from_provider_code`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document; `Ok(None)` when it does not exist
    async fn get_document(&self, collection: &str, id: &str)
        -> Result<Option<Value>, ProviderError>;

    /// Create or replace a document
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        payload: Value,
    ) -> Result<(), ProviderError>;

    /// Re-enable the store's network connection
    async fn enable_network(&self) -> Result<(), ProviderError>;

    /// Disable the store's network connection
    async fn disable_network(&self) -> Result<(), ProviderError>;
}

/// In-process document store
///
/// Reads and writes fail with `unavailable` while the network is disabled
/// or while an outage is simulated with [`InMemoryDocumentStore::set_reachable`].
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    documents: DashMap<(String, String), Value>,
    network_enabled: AtomicBool,
    reachable: AtomicBool,
    network_cycles: AtomicU32,
    writes: AtomicU32,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Empty, reachable store
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            network_enabled: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
            network_cycles: AtomicU32::new(0),
            writes: AtomicU32::new(0),
        }
    }

    /// Simulate the backend going away or coming back
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Times `disable_network` has been called
    #[must_use]
    pub fn network_cycles(&self) -> u32 {
        self.network_cycles.load(Ordering::SeqCst)
    }

    /// Successful `set_document` calls
    #[must_use]
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Read a document bypassing availability checks
    #[must_use]
    pub fn peek(&self, collection: &str, id: &str) -> Option<Value> {
        self.documents
            .get(&(collection.to_owned(), id.to_owned()))
            .map(|entry| entry.value().clone())
    }

    /// Write a document bypassing availability checks and counters
    pub fn seed(&self, collection: &str, id: &str, payload: Value) {
        self.documents
            .insert((collection.to_owned(), id.to_owned()), payload);
    }

    fn ensure_available(&self) -> Result<(), ProviderError> {
        if !self.network_enabled.load(Ordering::SeqCst) {
            return Err(ProviderError::from_provider_code(
                PROVIDER_NAME,
                "unavailable",
                "network disabled",
            ));
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(ProviderError::from_provider_code(
                PROVIDER_NAME,
                "unavailable",
                "backend unreachable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, ProviderError> {
        self.ensure_available()?;
        Ok(self.peek(collection, id))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        payload: Value,
    ) -> Result<(), ProviderError> {
        self.ensure_available()?;
        self.seed(collection, id, payload);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn enable_network(&self) -> Result<(), ProviderError> {
        self.network_enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disable_network(&self) -> Result<(), ProviderError> {
        self.network_cycles.fetch_add(1, Ordering::SeqCst);
        self.network_enabled.store(false, Ordering::SeqCst);
        Ok(())
    }
}
