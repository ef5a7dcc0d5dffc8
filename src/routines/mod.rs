// ABOUTME: Per-user routine storage with legacy migration and duplicate cleanup on load
// ABOUTME: Upserts, deletions, completion tracking, and preference-driven routine generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Routine Store
//!
//! Routines live under `routines:<userId>` as one JSON list. Every load first
//! runs the legacy migration and then collapses duplicates sharing
//! `(name, isGenerated)`; neither step can fail the load.

/// Routine generation from preferences
pub mod generator;
/// Legacy shared-list migration
pub mod migration;

pub use generator::generate_routine;
pub use migration::{MigrationOutcome, MigrationState, RoutineMigrator};

use crate::storage::{self, KeyValueStore};
use repsync_core::clock::Clock;
use repsync_core::constants::messages;
use repsync_core::constants::storage::ROUTINES_KEY_PREFIX;
use repsync_core::errors::{AppError, AppResult};
use repsync_core::models::{Exercise, PreferenceDocument, RoutineRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keep the first routine per `(name, isGenerated)`, preserving order
///
/// Discarded records are logged.
#[must_use]
pub fn clean_duplicate_routines(records: Vec<RoutineRecord>) -> Vec<RoutineRecord> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        let (name, generated) = record.dedup_key();
        if seen.insert((name.to_owned(), generated)) {
            kept.push(record);
        } else {
            debug!(id = %record.id, name = %record.name, "Duplicate routine discarded");
        }
    }
    kept
}

/// Routine persistence for any user
pub struct RoutineStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    migrator: RoutineMigrator,
}

impl RoutineStore {
    /// Create a routine store over the local store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let migrator = RoutineMigrator::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            clock,
            migrator,
        }
    }

    /// Migration runner, for inspecting state
    #[must_use]
    pub const fn migrator(&self) -> &RoutineMigrator {
        &self.migrator
    }

    /// Run the legacy migration for `user_id` if it has not run yet
    pub async fn migrate_user_routines(&self, user_id: &str) -> MigrationOutcome {
        self.migrator.migrate_user_routines(user_id).await
    }

    /// Load a user's routines after migration and duplicate cleanup
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty user id, or a storage error if the
    /// routine list cannot be read.
    pub async fn load_routines(&self, user_id: &str) -> AppResult<Vec<RoutineRecord>> {
        validate_user(user_id)?;

        let outcome = self.migrator.migrate_user_routines(user_id).await;
        debug!(user_id, ?outcome, "Routine migration checked");

        let routines = read_routines(self.store.as_ref(), user_id).await?;
        let before = routines.len();
        let routines = clean_duplicate_routines(routines);

        if routines.len() < before {
            info!(user_id, removed = before - routines.len(), "Duplicate routines removed");
            if let Err(e) = write_routines(self.store.as_ref(), user_id, &routines).await {
                warn!(user_id, error = %e, "Failed to persist deduplicated routines");
            }
        }
        Ok(routines)
    }

    /// Insert or replace a routine by id
    ///
    /// `updatedAt` is stamped; `createdAt` is filled when missing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty user id or name, or when a new
    /// routine would duplicate another's `(name, isGenerated)`.
    pub async fn save_routine(
        &self,
        user_id: &str,
        mut routine: RoutineRecord,
    ) -> AppResult<RoutineRecord> {
        validate_user(user_id)?;
        if routine.name.trim().is_empty() {
            return Err(AppError::invalid_input(
                "name",
                messages::VALIDATION_ROUTINE_NAME_REQUIRED,
            ));
        }

        let mut routines = self.load_routines(user_id).await?;
        let now = self.clock.now();
        routine.user_id = Some(user_id.to_owned());
        routine.updated_at = Some(now);
        routine.created_at.get_or_insert(now);

        let clashes = routines
            .iter()
            .any(|r| r.id != routine.id && r.dedup_key() == routine.dedup_key());
        if clashes {
            return Err(AppError::invalid_input("name", messages::ROUTINE_DUPLICATE));
        }

        match routines.iter_mut().find(|r| r.id == routine.id) {
            Some(existing) => existing.clone_from(&routine),
            None => routines.push(routine.clone()),
        }
        write_routines(self.store.as_ref(), user_id, &routines).await?;
        debug!(user_id, id = %routine.id, "Routine saved");
        Ok(routine)
    }

    /// Delete a routine; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty user id, or a storage error.
    pub async fn delete_routine(&self, user_id: &str, routine_id: &str) -> AppResult<bool> {
        let mut routines = self.load_routines(user_id).await?;
        let before = routines.len();
        routines.retain(|r| r.id != routine_id);
        if routines.len() == before {
            return Ok(false);
        }
        write_routines(self.store.as_ref(), user_id, &routines).await?;
        Ok(true)
    }

    /// Count a completed session of a routine
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a storage error.
    pub async fn record_completion(
        &self,
        user_id: &str,
        routine_id: &str,
    ) -> AppResult<RoutineRecord> {
        let mut routines = self.load_routines(user_id).await?;
        let now = self.clock.now();
        let routine = routines
            .iter_mut()
            .find(|r| r.id == routine_id)
            .ok_or_else(|| AppError::not_found(messages::ROUTINE_NOT_FOUND))?;
        routine.times_completed = routine.times_completed.saturating_add(1);
        routine.last_completed = Some(now);
        routine.updated_at = Some(now);
        let completed = routine.clone();
        write_routines(self.store.as_ref(), user_id, &routines).await?;
        Ok(completed)
    }

    /// Generate a routine from preferences and save it
    ///
    /// A previously generated routine with the same name is replaced.
    ///
    /// # Errors
    ///
    /// As [`RoutineStore::save_routine`].
    pub async fn generate_routine(
        &self,
        preferences: &PreferenceDocument,
        catalog: &[Exercise],
    ) -> AppResult<RoutineRecord> {
        let user_id = preferences.user_id.as_str();
        let mut routine = generate_routine(preferences, catalog, self.clock.now());

        let existing = self.load_routines(user_id).await?;
        if let Some(previous) = existing
            .iter()
            .find(|r| r.dedup_key() == routine.dedup_key())
        {
            routine.id.clone_from(&previous.id);
            routine.created_at = previous.created_at;
            routine.times_completed = previous.times_completed;
            routine.last_completed = previous.last_completed;
        }
        self.save_routine(user_id, routine).await
    }
}

/// Read the routine list stored for `user_id`
pub(crate) async fn read_routines(
    store: &dyn KeyValueStore,
    user_id: &str,
) -> AppResult<Vec<RoutineRecord>> {
    Ok(storage::get_json(store, &routines_key(user_id))
        .await?
        .unwrap_or_default())
}

/// Replace the routine list stored for `user_id`
pub(crate) async fn write_routines(
    store: &dyn KeyValueStore,
    user_id: &str,
    routines: &[RoutineRecord],
) -> AppResult<()> {
    storage::set_json(store, &routines_key(user_id), &routines).await
}

fn routines_key(user_id: &str) -> String {
    format!("{ROUTINES_KEY_PREFIX}{user_id}")
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
