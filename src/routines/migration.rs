// ABOUTME: One-time migration of the legacy shared routine list into per-user namespaces
// ABOUTME: Persisted per-user flag plus an in-process guard make the migration idempotent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Legacy routine migration
//!
//! Older app versions kept every routine under one shared key. The first load
//! for a user copies that user's legacy records into `routines:<userId>`,
//! skipping names the user already has, then persists
//! `routines_migrated:<userId>` so the copy never runs again.

use super::{read_routines, write_routines};
use crate::storage::KeyValueStore;
use repsync_core::clock::Clock;
use repsync_core::constants::storage::{LEGACY_ROUTINES_KEY, ROUTINES_MIGRATED_KEY_PREFIX};
use repsync_core::errors::AppResult;
use repsync_core::models::RoutineRecord;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-user migration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    /// Flag not set and no migration running
    NotMigrated,
    /// A migration for this user is running in this process
    Migrating,
    /// Flag persisted; the migration will never run again
    Migrated,
}

/// Result of a migration call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum MigrationOutcome {
    /// Flag already set, nothing done
    AlreadyMigrated,
    /// Another call for the same user is running
    InProgress,
    /// Migration ran and the flag was persisted
    Completed {
        /// Legacy records copied into the user's namespace
        copied: usize,
        /// Legacy records skipped because the name already existed
        skipped: usize,
    },
    /// Migration failed; the flag stays unset so the next load retries
    Failed,
}

/// Removes the user from the in-flight set on every exit path
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    user_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

/// Runs the legacy routine migration
pub struct RoutineMigrator {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<HashSet<String>>,
}

impl RoutineMigrator {
    /// Create a migrator over the local store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Current state for `user_id`
    pub async fn state(&self, user_id: &str) -> MigrationState {
        if self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(user_id)
        {
            return MigrationState::Migrating;
        }
        if self.is_flagged(user_id).await {
            MigrationState::Migrated
        } else {
            MigrationState::NotMigrated
        }
    }

    /// Copy the user's legacy routines into their namespace, once
    ///
    /// Never fails; errors are logged and reported as [`MigrationOutcome::Failed`].
    pub async fn migrate_user_routines(&self, user_id: &str) -> MigrationOutcome {
        if self.is_flagged(user_id).await {
            return MigrationOutcome::AlreadyMigrated;
        }

        let Some(_guard) = self.enter(user_id) else {
            debug!(user_id, "Routine migration already running");
            return MigrationOutcome::InProgress;
        };

        // Another call may have finished between the first check and the guard
        if self.is_flagged(user_id).await {
            return MigrationOutcome::AlreadyMigrated;
        }

        match self.copy_legacy(user_id).await {
            Ok((copied, skipped)) => {
                info!(user_id, copied, skipped, "Legacy routines migrated");
                MigrationOutcome::Completed { copied, skipped }
            }
            Err(e) => {
                warn!(user_id, error = %e, "Routine migration failed, will retry on next load");
                MigrationOutcome::Failed
            }
        }
    }

    fn enter(&self, user_id: &str) -> Option<InFlightGuard<'_>> {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_owned());
        inserted.then(|| InFlightGuard {
            in_flight: &self.in_flight,
            user_id: user_id.to_owned(),
        })
    }

    async fn is_flagged(&self, user_id: &str) -> bool {
        match self.store.get(&flag_key(user_id)).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(user_id, error = %e, "Could not read routine migration flag");
                false
            }
        }
    }

    async fn copy_legacy(&self, user_id: &str) -> AppResult<(usize, usize)> {
        let legacy = self.read_legacy().await?;
        let mut routines = read_routines(self.store.as_ref(), user_id).await?;
        let mut names: HashSet<String> = routines.iter().map(|r| r.name.trim().to_owned()).collect();

        let now = self.clock.now();
        let mut copied = 0;
        let mut skipped = 0;
        for record in legacy {
            if record.user_id.as_deref().is_some_and(|owner| owner != user_id) {
                continue;
            }
            if !names.insert(record.name.trim().to_owned()) {
                skipped += 1;
                continue;
            }
            routines.push(RoutineRecord {
                id: Uuid::new_v4().to_string(),
                user_id: Some(user_id.to_owned()),
                original_id: Some(record.id.clone()),
                migrated_at: Some(now),
                created_at: record.created_at.or(Some(now)),
                ..record
            });
            copied += 1;
        }

        if copied > 0 {
            write_routines(self.store.as_ref(), user_id, &routines).await?;
        }
        self.store.set(&flag_key(user_id), "true".to_owned()).await?;
        Ok((copied, skipped))
    }

    /// A failed read propagates so the flag stays unset; undecodable text is skipped
    async fn read_legacy(&self) -> AppResult<Vec<RoutineRecord>> {
        let Some(text) = self.store.get(LEGACY_ROUTINES_KEY).await? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(error = %e, "Unreadable legacy routine list ignored");
            Vec::new()
        }))
    }
}

fn flag_key(user_id: &str) -> String {
    format!("{ROUTINES_MIGRATED_KEY_PREFIX}{user_id}")
}
