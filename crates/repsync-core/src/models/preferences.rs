// ABOUTME: Onboarding preference document stored locally and in the remote document store
// ABOUTME: Carries a lastUpdated timestamp used for last-write-wins reconciliation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's onboarding quiz answers
///
/// The same JSON shape is used in the local store and in the remote
/// `userPreferences` collection, so a document read from one side can be
/// written to the other unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceDocument {
    /// Owner
    pub user_id: String,
    /// Muscle groups the user wants to focus on
    #[serde(default)]
    pub body_focus: Vec<String>,
    /// Equipment the user has access to
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Self-reported experience level
    #[serde(default)]
    pub experience: String,
    /// Training goals
    #[serde(default)]
    pub goals: Vec<String>,
    /// Sessions per week
    #[serde(default)]
    pub workout_frequency: String,
    /// Minutes per session
    #[serde(default)]
    pub time_per_workout: String,
    /// Home, commercial gym, ...
    #[serde(default)]
    pub gym_type: String,
    /// When the quiz was completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Last modification, the reconciliation key
    pub last_updated: DateTime<Utc>,
}

impl PreferenceDocument {
    /// Empty document for a user, stamped at `now`
    #[must_use]
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            body_focus: Vec::new(),
            equipment: Vec::new(),
            experience: String::new(),
            goals: Vec::new(),
            workout_frequency: String::new(),
            time_per_workout: String::new(),
            gym_type: String::new(),
            completed_at: None,
            last_updated: now,
        }
    }

    /// Whether this document is strictly newer than `other`
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.last_updated > other.last_updated
    }
}

/// Partial update applied on top of an existing document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdate {
    /// New body focus
    pub body_focus: Option<Vec<String>>,
    /// New equipment list
    pub equipment: Option<Vec<String>>,
    /// New experience level
    pub experience: Option<String>,
    /// New goals
    pub goals: Option<Vec<String>>,
    /// New frequency
    pub workout_frequency: Option<String>,
    /// New session length
    pub time_per_workout: Option<String>,
    /// New gym type
    pub gym_type: Option<String>,
    /// Quiz completion time
    pub completed_at: Option<DateTime<Utc>>,
}

impl PreferenceUpdate {
    /// Merge into `document` and stamp `lastUpdated` with `now`
    pub fn apply(self, document: &mut PreferenceDocument, now: DateTime<Utc>) {
        if let Some(body_focus) = self.body_focus {
            document.body_focus = body_focus;
        }
        if let Some(equipment) = self.equipment {
            document.equipment = equipment;
        }
        if let Some(experience) = self.experience {
            document.experience = experience;
        }
        if let Some(goals) = self.goals {
            document.goals = goals;
        }
        if let Some(frequency) = self.workout_frequency {
            document.workout_frequency = frequency;
        }
        if let Some(time) = self.time_per_workout {
            document.time_per_workout = time;
        }
        if let Some(gym_type) = self.gym_type {
            document.gym_type = gym_type;
        }
        if self.completed_at.is_some() {
            document.completed_at = self.completed_at;
        }
        document.last_updated = now;
    }
}
