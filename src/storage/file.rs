// ABOUTME: Key-value store persisted as a single JSON object on disk
// ABOUTME: Every mutation rewrites the file through a temp file and an atomic rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::KeyValueStore;
use async_trait::async_trait;
use repsync_core::errors::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File-backed store
///
/// The whole map is loaded on open and kept in memory; writers hold the
/// mutex across the disk write and only commit the in-memory change once the
/// file has been replaced.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store at `path`
    ///
    /// A corrupt file is logged and replaced by an empty store on the next
    /// write. A file that exists but cannot be read is an error, so it is
    /// never overwritten.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the parent directory cannot be created or
    /// the store file cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!("Cannot create {}", parent.display())).with_source(e)
            })?;
        }

        let entries = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Store file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(
                    AppError::storage(format!("Cannot read {}", path.display())).with_source(e)
                );
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the store file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        let bytes = serde_json::to_vec(entries)?;
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, bytes).await.map_err(|e| {
            AppError::storage(format!("Cannot write {}", temp.display())).with_source(e)
        })?;
        fs::rename(&temp, &self.path).await.map_err(|e| {
            AppError::storage(format!("Cannot replace {}", self.path.display())).with_source(e)
        })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_owned(), value);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn all_keys(&self) -> AppResult<Vec<String>> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        if !keys.iter().any(|key| entries.contains_key(key)) {
            return Ok(());
        }
        let mut next = entries.clone();
        for key in keys {
            next.remove(key);
        }
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }
}
