// ABOUTME: Core data models for exercises, preference documents, and workout routines
// ABOUTME: Serialized as camelCase JSON in both the local store and the remote document store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Exercise`: normalized catalog record, built from the remote flat `ExerciseRecord`
//! - `PreferenceDocument`: onboarding quiz answers, reconciled last-write-wins
//! - `RoutineRecord`: user-owned or generated workout routine

mod exercise;
mod preferences;
mod routine;

pub use exercise::{normalize_term, Exercise, ExerciseFilter, ExerciseRecord, Instructions};
pub use preferences::{PreferenceDocument, PreferenceUpdate};
pub use routine::{RoutineExercise, RoutineRecord};
