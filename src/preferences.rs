// ABOUTME: Local-first preference persistence with last-write-wins sync to the document store
// ABOUTME: Local writes are the durability floor; remote writes are best effort and reconciled later
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Preference Sync
//!
//! Reconciliation compares `lastUpdated` and copies the whole document from
//! the strictly newer side to the other. Equal timestamps write nothing.
//! Concurrent offline edits to different fields on two devices are not
//! merged; the later document wins in full.

use crate::connectivity::{ConnectivityMonitor, ResyncHook};
use crate::storage::{self, KeyValueStore};
use async_trait::async_trait;
use repsync_core::clock::Clock;
use repsync_core::constants::messages;
use repsync_core::constants::storage::{PREFERENCES_COLLECTION, PREFERENCES_KEY_PREFIX};
use repsync_core::errors::provider::ProviderError;
use repsync_core::errors::{AppError, AppResult};
use repsync_core::models::{PreferenceDocument, PreferenceUpdate};
use repsync_providers::{DocumentStore, RetryExecutor};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Local copy was newer and was written to the remote store
    PushedLocal,
    /// Remote copy was newer (or the only one) and was written locally
    PulledRemote,
    /// Both sides carry the same timestamp
    InSync,
    /// No remote copy; nothing written
    RemoteMissing,
    /// Device offline; nothing attempted
    Offline,
    /// Remote read or write failed
    Failed,
}

impl SyncOutcome {
    /// Whether either side was written
    #[must_use]
    pub const fn wrote(self) -> bool {
        matches!(self, Self::PushedLocal | Self::PulledRemote)
    }
}

/// Preference reads, writes, and reconciliation for any user
pub struct PreferenceSync {
    local: Arc<dyn KeyValueStore>,
    remote: Arc<dyn DocumentStore>,
    retry: RetryExecutor,
    connectivity: Arc<ConnectivityMonitor>,
    clock: Arc<dyn Clock>,
}

impl PreferenceSync {
    /// Create a sync engine
    #[must_use]
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        remote: Arc<dyn DocumentStore>,
        retry: RetryExecutor,
        connectivity: Arc<ConnectivityMonitor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            local,
            remote,
            retry,
            connectivity,
            clock,
        }
    }

    /// Store preferences locally, then remotely when online
    ///
    /// `lastUpdated` is stamped with the current time. A failed remote write
    /// is logged and left for [`PreferenceSync::resync`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty user id, or `StorageError` when the
    /// local write fails.
    pub async fn save(
        &self,
        user_id: &str,
        mut preferences: PreferenceDocument,
    ) -> AppResult<PreferenceDocument> {
        validate_user(user_id)?;
        user_id.clone_into(&mut preferences.user_id);
        preferences.last_updated = self.clock.now();

        self.write_local(user_id, &preferences).await?;
        debug!(user_id, "Preferences saved locally");

        if self.connectivity.is_online() {
            if let Err(e) = self.write_remote(user_id, &preferences).await {
                warn!(user_id, error = %e, "Remote preference write failed, will resync later");
            }
        } else {
            debug!(user_id, "Offline, remote preference write deferred");
        }
        Ok(preferences)
    }

    /// Read preferences, preferring the remote copy when reachable
    ///
    /// A remote copy that is found replaces the local one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty user id.
    pub async fn load(&self, user_id: &str) -> AppResult<Option<PreferenceDocument>> {
        validate_user(user_id)?;
        let local = self.read_local(user_id).await;

        if !self.connectivity.is_online() {
            return Ok(local);
        }

        match self.read_remote(user_id).await {
            Ok(Some(remote)) => {
                if let Err(e) = self.write_local(user_id, &remote).await {
                    warn!(user_id, error = %e, "Failed to refresh local preferences");
                }
                Ok(Some(remote))
            }
            Ok(None) => Ok(local),
            Err(e) => {
                warn!(user_id, error = %e, "Remote preference read failed, using local copy");
                Ok(local)
            }
        }
    }

    /// Apply a partial update on top of the local copy and save it
    ///
    /// # Errors
    ///
    /// As [`PreferenceSync::save`].
    pub async fn update(
        &self,
        user_id: &str,
        update: PreferenceUpdate,
    ) -> AppResult<PreferenceDocument> {
        validate_user(user_id)?;
        let now = self.clock.now();
        let mut preferences = self
            .read_local(user_id)
            .await
            .unwrap_or_else(|| PreferenceDocument::new(user_id, now));
        update.apply(&mut preferences, now);
        self.save(user_id, preferences).await
    }

    /// Reconcile and report whether anything was written
    pub async fn resync(&self, user_id: &str) -> bool {
        self.reconcile(user_id).await.wrote()
    }

    /// Reconcile local and remote copies, last write wins
    pub async fn reconcile(&self, user_id: &str) -> SyncOutcome {
        if !self.connectivity.is_online() {
            return SyncOutcome::Offline;
        }

        let local = self.read_local(user_id).await;
        let remote = match self.read_remote(user_id).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(user_id, error = %e, "Resync failed reading remote preferences");
                return SyncOutcome::Failed;
            }
        };

        let outcome = match (local, remote) {
            (_, None) => SyncOutcome::RemoteMissing,
            (None, Some(remote)) => self.pull(user_id, &remote).await,
            (Some(local), Some(remote)) => {
                if local.is_newer_than(&remote) {
                    match self.write_remote(user_id, &local).await {
                        Ok(()) => SyncOutcome::PushedLocal,
                        Err(e) => {
                            warn!(user_id, error = %e, "Resync failed writing remote preferences");
                            SyncOutcome::Failed
                        }
                    }
                } else if remote.is_newer_than(&local) {
                    self.pull(user_id, &remote).await
                } else {
                    SyncOutcome::InSync
                }
            }
        };

        info!(user_id, ?outcome, "Preference resync finished");
        outcome
    }

    async fn pull(&self, user_id: &str, remote: &PreferenceDocument) -> SyncOutcome {
        match self.write_local(user_id, remote).await {
            Ok(()) => SyncOutcome::PulledRemote,
            Err(e) => {
                warn!(user_id, error = %e, "Resync failed writing local preferences");
                SyncOutcome::Failed
            }
        }
    }

    async fn read_local(&self, user_id: &str) -> Option<PreferenceDocument> {
        storage::get_json(self.local.as_ref(), &local_key(user_id))
            .await
            .unwrap_or_else(|e| {
                warn!(user_id, error = %e, "Unreadable local preferences ignored");
                None
            })
    }

    async fn write_local(&self, user_id: &str, preferences: &PreferenceDocument) -> AppResult<()> {
        storage::set_json(self.local.as_ref(), &local_key(user_id), preferences)
            .await
            .map_err(|e| AppError::storage(messages::STORAGE_FAILED).with_source(e))
    }

    async fn read_remote(&self, user_id: &str) -> Result<Option<PreferenceDocument>, ProviderError> {
        let remote = self.remote.as_ref();
        let document = self
            .retry
            .run("preferences:get", || {
                remote.get_document(PREFERENCES_COLLECTION, user_id)
            })
            .await?;

        document
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ProviderError::ParseError {
                provider: PREFERENCES_COLLECTION.to_owned(),
                message: e.to_string(),
            })
    }

    async fn write_remote(
        &self,
        user_id: &str,
        preferences: &PreferenceDocument,
    ) -> Result<(), ProviderError> {
        let payload = serde_json::to_value(preferences).map_err(|e| ProviderError::ParseError {
            provider: PREFERENCES_COLLECTION.to_owned(),
            message: e.to_string(),
        })?;
        let remote = self.remote.as_ref();
        self.retry
            .run("preferences:set", || {
                remote.set_document(PREFERENCES_COLLECTION, user_id, payload.clone())
            })
            .await
    }
}

/// Resync hook bound to the signed-in user
pub struct PreferenceResyncHook {
    sync: Arc<PreferenceSync>,
    user_id: String,
}

impl PreferenceResyncHook {
    /// Hook that reconciles `user_id`'s preferences
    #[must_use]
    pub fn new(sync: Arc<PreferenceSync>, user_id: impl Into<String>) -> Self {
        Self {
            sync,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl ResyncHook for PreferenceResyncHook {
    async fn resync(&self) {
        let outcome = self.sync.reconcile(&self.user_id).await;
        debug!(user_id = %self.user_id, ?outcome, "Reconnect resync ran");
    }
}

fn local_key(user_id: &str) -> String {
    format!("{PREFERENCES_KEY_PREFIX}{user_id}")
}

fn validate_user(user_id: &str) -> AppResult<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::invalid_input(
            "userId",
            messages::VALIDATION_USER_REQUIRED,
        ));
    }
    Ok(())
}
