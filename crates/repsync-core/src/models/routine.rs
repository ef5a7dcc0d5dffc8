// ABOUTME: Workout routine records, user-created or generated from preferences
// ABOUTME: Tolerates legacy records that lack owner, timestamps, or migration markers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exercise slot within a routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineExercise {
    /// Catalog identifier
    pub exercise_id: String,
    /// Display name at the time the routine was built
    #[serde(default)]
    pub name: String,
    /// Number of sets
    #[serde(default)]
    pub sets: u32,
    /// Rep target, e.g. "8-12"
    #[serde(default)]
    pub reps: String,
    /// Rest between sets
    #[serde(default)]
    pub rest_seconds: u32,
}

/// A workout routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineRecord {
    /// Unique identifier
    pub id: String,
    /// Owner; legacy shared-key records may not carry one
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name
    pub name: String,
    /// Exercises in order
    #[serde(default)]
    pub exercises: Vec<RoutineExercise>,
    /// Whether the user built this routine by hand
    #[serde(default)]
    pub is_custom: bool,
    /// Whether this routine was generated from preferences
    #[serde(default)]
    pub is_generated: bool,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Last time the routine was completed
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    /// Times the routine was completed
    #[serde(default)]
    pub times_completed: u32,
    /// Identifier of the legacy record this copy was migrated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    /// When the migration copied this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<DateTime<Utc>>,
}

impl RoutineRecord {
    /// New custom routine owned by `user_id`, stamped at `now`
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        exercises: Vec<RoutineExercise>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: Some(user_id.into()),
            name: name.into(),
            exercises,
            is_custom: true,
            is_generated: false,
            created_at: Some(now),
            updated_at: Some(now),
            last_completed: None,
            times_completed: 0,
            original_id: None,
            migrated_at: None,
        }
    }

    /// Identity used to detect duplicates: same name, same generated flag
    #[must_use]
    pub fn dedup_key(&self) -> (&str, bool) {
        (self.name.trim(), self.is_generated)
    }

    /// Whether `user_id` owns this record
    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}
