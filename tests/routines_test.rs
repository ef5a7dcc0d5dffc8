// ABOUTME: Integration tests for per-user routine storage and the legacy routine migration
// ABOUTME: Covers migration idempotency, duplicate cleanup, upserts, completion tracking, and generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::{FailingStore, FlakyReadStore, TEST_EPOCH_MS};
use repsync::routines::{MigrationOutcome, MigrationState, RoutineStore};
use repsync::storage::{self, KeyValueStore, MemoryStore};
use repsync_core::clock::{Clock, ManualClock};
use repsync_core::constants::storage::LEGACY_ROUTINES_KEY;
use repsync_core::errors::ErrorCode;
use repsync_core::models::{Exercise, PreferenceDocument, RoutineRecord};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const USER: &str = "user-1";

struct Harness {
    routines: RoutineStore,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        common::init_test_logging();
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(TEST_EPOCH_MS));
        Self {
            routines: RoutineStore::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    fn routine(&self, id: &str, owner: Option<&str>, name: &str) -> RoutineRecord {
        RoutineRecord {
            user_id: owner.map(str::to_owned),
            ..RoutineRecord::new(id, "", name, Vec::new(), self.clock.now())
        }
    }

    async fn seed_legacy(&self, records: &[RoutineRecord]) {
        storage::set_json(self.store.as_ref(), LEGACY_ROUTINES_KEY, &records)
            .await
            .unwrap();
    }

    async fn seed_user(&self, records: &[RoutineRecord]) {
        storage::set_json(self.store.as_ref(), &format!("routines:{USER}"), &records)
            .await
            .unwrap();
    }

    async fn stored(&self) -> Vec<RoutineRecord> {
        storage::get_json(self.store.as_ref(), &format!("routines:{USER}"))
            .await
            .unwrap()
            .unwrap_or_default()
    }
}

fn names(routines: &[RoutineRecord]) -> BTreeSet<String> {
    routines.iter().map(|r| r.name.clone()).collect()
}

#[tokio::test]
async fn test_migration_copies_owned_and_unowned_legacy_records() -> Result<()> {
    let h = Harness::new();
    h.seed_legacy(&[
        h.routine("legacy-1", Some(USER), "Push Day"),
        h.routine("legacy-2", None, "Leg Day"),
        h.routine("legacy-3", Some("someone-else"), "Their Day"),
    ])
    .await;

    let outcome = h.routines.migrate_user_routines(USER).await;
    assert_eq!(
        outcome,
        MigrationOutcome::Completed {
            copied: 2,
            skipped: 0
        }
    );

    let stored = h.stored().await;
    assert_eq!(names(&stored), BTreeSet::from(["Leg Day".to_owned(), "Push Day".to_owned()]));
    for record in &stored {
        assert!(record.is_owned_by(USER));
        assert_eq!(record.migrated_at, Some(h.clock.now()));
        assert!(record.original_id.as_deref().unwrap().starts_with("legacy-"));
        assert_ne!(record.original_id.as_deref(), Some(record.id.as_str()));
    }

    // Legacy list is left in place for other users
    assert!(h.store.get(LEGACY_ROUTINES_KEY).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_migration_runs_once() -> Result<()> {
    let h = Harness::new();
    h.seed_legacy(&[h.routine("legacy-1", None, "Push Day")]).await;

    assert_eq!(h.routines.migrator().state(USER).await, MigrationState::NotMigrated);
    let first = h.routines.load_routines(USER).await?;
    assert_eq!(h.routines.migrator().state(USER).await, MigrationState::Migrated);

    // New legacy content after the flag is set is never copied
    h.seed_legacy(&[
        h.routine("legacy-1", None, "Push Day"),
        h.routine("legacy-9", None, "Late Day"),
    ])
    .await;
    let second = h.routines.load_routines(USER).await?;

    assert_eq!(first, second);
    assert_eq!(
        h.routines.migrate_user_routines(USER).await,
        MigrationOutcome::AlreadyMigrated
    );
    assert_eq!(h.stored().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_migration_skips_names_already_present() -> Result<()> {
    let h = Harness::new();
    h.seed_user(&[h.routine("mine", Some(USER), "Push Day")]).await;
    h.seed_legacy(&[
        h.routine("legacy-1", None, " Push Day "),
        h.routine("legacy-2", None, "Pull Day"),
    ])
    .await;

    let outcome = h.routines.migrate_user_routines(USER).await;
    assert_eq!(
        outcome,
        MigrationOutcome::Completed {
            copied: 1,
            skipped: 1
        }
    );
    let stored = h.stored().await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].id, "mine");
    Ok(())
}

#[tokio::test]
async fn test_migration_without_legacy_data_sets_flag() -> Result<()> {
    let h = Harness::new();
    assert_eq!(
        h.routines.migrate_user_routines(USER).await,
        MigrationOutcome::Completed {
            copied: 0,
            skipped: 0
        }
    );
    assert_eq!(
        h.store.get(&format!("routines_migrated:{USER}")).await?,
        Some("true".to_owned())
    );
    assert!(h.store.get(&format!("routines:{USER}")).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_legacy_list_is_ignored() -> Result<()> {
    let h = Harness::new();
    h.store
        .set(LEGACY_ROUTINES_KEY, "{not json".to_owned())
        .await?;

    assert_eq!(
        h.routines.migrate_user_routines(USER).await,
        MigrationOutcome::Completed {
            copied: 0,
            skipped: 0
        }
    );
    assert!(h.routines.load_routines(USER).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_migration_leaves_flag_unset() {
    common::init_test_logging();
    let routines = RoutineStore::new(
        Arc::new(FailingStore),
        Arc::new(ManualClock::new(TEST_EPOCH_MS)),
    );

    assert_eq!(
        routines.migrate_user_routines(USER).await,
        MigrationOutcome::Failed
    );
    assert_eq!(
        routines.migrator().state(USER).await,
        MigrationState::NotMigrated
    );
    let error = routines.load_routines(USER).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::StorageError);
}

#[tokio::test]
async fn test_legacy_read_failure_retries_on_next_load() -> Result<()> {
    common::init_test_logging();
    let clock = Arc::new(ManualClock::new(TEST_EPOCH_MS));
    let store = Arc::new(FlakyReadStore::new(LEGACY_ROUTINES_KEY, 1));
    let legacy = vec![RoutineRecord {
        user_id: None,
        ..RoutineRecord::new("legacy-1", "", "Push Day", Vec::new(), clock.now())
    }];
    storage::set_json(&store.inner, LEGACY_ROUTINES_KEY, &legacy).await?;
    let routines = RoutineStore::new(store.clone(), clock);

    assert_eq!(
        routines.migrate_user_routines(USER).await,
        MigrationOutcome::Failed
    );
    assert_eq!(
        routines.migrator().state(USER).await,
        MigrationState::NotMigrated
    );

    let loaded = routines.load_routines(USER).await?;
    assert_eq!(names(&loaded), BTreeSet::from(["Push Day".to_owned()]));
    assert_eq!(
        routines.migrator().state(USER).await,
        MigrationState::Migrated
    );
    Ok(())
}

#[tokio::test]
async fn test_load_removes_and_persists_duplicates() -> Result<()> {
    let h = Harness::new();
    let mut generated = h.routine("c", Some(USER), "Push Day");
    generated.is_generated = true;
    h.seed_user(&[
        h.routine("a", Some(USER), "Push Day"),
        h.routine("b", Some(USER), "Push Day"),
        generated,
    ])
    .await;

    let loaded = h.routines.load_routines(USER).await?;
    let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(h.stored().await, loaded);
    Ok(())
}

#[tokio::test]
async fn test_save_inserts_then_updates_by_id() -> Result<()> {
    let h = Harness::new();
    let created = h
        .routines
        .save_routine(USER, h.routine("r1", None, "Push Day"))
        .await?;
    assert!(created.is_owned_by(USER));
    assert_eq!(created.created_at, Some(h.clock.now()));

    h.clock.advance(Duration::from_secs(120));
    let mut renamed = created.clone();
    "Upper Body".clone_into(&mut renamed.name);
    let updated = h.routines.save_routine(USER, renamed).await?;

    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, Some(h.clock.now()));
    let stored = h.routines.load_routines(USER).await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Upper Body");
    Ok(())
}

#[tokio::test]
async fn test_save_rejects_duplicate_and_blank_names() -> Result<()> {
    let h = Harness::new();
    h.routines
        .save_routine(USER, h.routine("r1", None, "Push Day"))
        .await?;

    let duplicate = h
        .routines
        .save_routine(USER, h.routine("r2", None, "Push Day "))
        .await
        .unwrap_err();
    assert_eq!(duplicate.code, ErrorCode::InvalidInput);

    let blank = h
        .routines
        .save_routine(USER, h.routine("r3", None, "   "))
        .await
        .unwrap_err();
    assert_eq!(blank.code, ErrorCode::InvalidInput);
    assert_eq!(blank.details["field"], "name");

    assert_eq!(h.routines.load_routines(USER).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_delete_routine() -> Result<()> {
    let h = Harness::new();
    h.routines
        .save_routine(USER, h.routine("r1", None, "Push Day"))
        .await?;

    assert!(h.routines.delete_routine(USER, "r1").await?);
    assert!(!h.routines.delete_routine(USER, "r1").await?);
    assert!(h.routines.load_routines(USER).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_record_completion() -> Result<()> {
    let h = Harness::new();
    h.routines
        .save_routine(USER, h.routine("r1", None, "Push Day"))
        .await?;

    h.clock.advance(Duration::from_secs(3_600));
    h.routines.record_completion(USER, "r1").await?;
    let completed = h.routines.record_completion(USER, "r1").await?;

    assert_eq!(completed.times_completed, 2);
    assert_eq!(completed.last_completed, Some(h.clock.now()));

    let missing = h
        .routines
        .record_completion(USER, "nope")
        .await
        .unwrap_err();
    assert_eq!(missing.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_generate_replaces_previous_generated_routine() -> Result<()> {
    let h = Harness::new();
    let catalog: Vec<Exercise> = common::sample_catalog()
        .into_iter()
        .map(Exercise::from)
        .collect();
    let mut preferences = PreferenceDocument::new(USER, h.clock.now());
    preferences.body_focus = vec!["Chest".to_owned()];
    "beginner".clone_into(&mut preferences.experience);

    let first = h.routines.generate_routine(&preferences, &catalog).await?;
    assert!(first.is_generated);
    assert_eq!(first.name, "Rutina de chest");
    assert!(first.exercises.iter().all(|e| e.sets == 3 && e.rest_seconds == 60));
    assert_eq!(first.exercises.len(), 3);

    h.routines.record_completion(USER, &first.id).await?;
    let second = h.routines.generate_routine(&preferences, &catalog).await?;

    assert_eq!(second.id, first.id);
    assert_eq!(second.times_completed, 1);
    assert_eq!(h.routines.load_routines(USER).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_user_is_rejected() {
    let h = Harness::new();
    let error = h.routines.load_routines(" ").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
}
