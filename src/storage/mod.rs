// ABOUTME: Local persisted key-value store interface with memory and JSON-file backends
// ABOUTME: String keys and JSON text values, mirroring on-device async storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Local persisted key-value storage
//!
//! Cache entries, preference documents, and routine lists are all stored as
//! JSON text under string keys. Callers own their key namespaces; the cache
//! only ever touches keys carrying its own prefix.

/// JSON file backend
pub mod file;
/// In-memory backend
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use repsync_core::errors::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// String-keyed persisted storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: String) -> AppResult<()>;

    /// Delete a value; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Every stored key
    async fn all_keys(&self) -> AppResult<Vec<String>>;

    /// Delete several values at once
    async fn multi_remove(&self, keys: &[String]) -> AppResult<()>;
}

/// Read and decode a JSON value
///
/// # Errors
///
/// Returns a storage error if the read fails, or a serialization error if the
/// stored text is not valid JSON for `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> AppResult<Option<T>> {
    match store.get(key).await? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
///
/// # Errors
///
/// Returns a serialization or storage error.
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> AppResult<()> {
    let text = serde_json::to_string(value)?;
    store.set(key, text).await
}
