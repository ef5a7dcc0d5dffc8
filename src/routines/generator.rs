// ABOUTME: Builds a generated routine from onboarding preferences and the exercise catalog
// ABOUTME: Picks exercises round-robin across focus muscles, filtered by available equipment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use repsync_core::models::{normalize_term, Exercise, PreferenceDocument, RoutineExercise, RoutineRecord};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Equipment every user is assumed to have
const BODYWEIGHT: &str = "body weight";

/// Exercises per session when the preferred duration is unknown
const DEFAULT_EXERCISE_COUNT: usize = 5;

/// Set, rep, and rest prescription for an experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Prescription {
    sets: u32,
    reps: &'static str,
    rest_seconds: u32,
}

impl Prescription {
    fn for_experience(experience: &str) -> Self {
        match normalize_term(experience).as_str() {
            "beginner" | "principiante" => Self {
                sets: 3,
                reps: "10-12",
                rest_seconds: 60,
            },
            "advanced" | "avanzado" => Self {
                sets: 4,
                reps: "6-8",
                rest_seconds: 120,
            },
            _ => Self {
                sets: 3,
                reps: "8-12",
                rest_seconds: 90,
            },
        }
    }
}

/// Number of exercises that fit the preferred session length
fn exercise_count(time_per_workout: &str) -> usize {
    let minutes: String = time_per_workout
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    match minutes.parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_EXERCISE_COUNT,
        Ok(m) if m <= 30 => 4,
        Ok(m) if m <= 45 => 5,
        Ok(_) => 6,
    }
}

/// Generate a routine from preferences
///
/// Exercises are chosen from `catalog` whose muscle is in the body focus (any
/// muscle when the focus is empty) and whose equipment the user has
/// (bodyweight always qualifies; any equipment when none is listed). Muscles
/// are visited round-robin so each focus area is represented.
#[must_use]
pub fn generate_routine(
    preferences: &PreferenceDocument,
    catalog: &[Exercise],
    now: DateTime<Utc>,
) -> RoutineRecord {
    let focus: Vec<String> = preferences.body_focus.iter().map(|m| normalize_term(m)).collect();
    let equipment: HashSet<String> = preferences.equipment.iter().map(|e| normalize_term(e)).collect();

    let mut by_muscle: BTreeMap<&str, Vec<&Exercise>> = BTreeMap::new();
    for exercise in catalog {
        let muscle_ok = focus.is_empty() || focus.contains(&exercise.muscle);
        let equipment_ok = equipment.is_empty()
            || exercise.equipment == BODYWEIGHT
            || equipment.contains(&exercise.equipment);
        if muscle_ok && equipment_ok {
            by_muscle.entry(exercise.muscle.as_str()).or_default().push(exercise);
        }
    }

    let wanted = exercise_count(&preferences.time_per_workout);
    let prescription = Prescription::for_experience(&preferences.experience);
    let mut queues: Vec<_> = by_muscle.into_values().map(Vec::into_iter).collect();
    let mut exercises = Vec::with_capacity(wanted);

    'fill: while exercises.len() < wanted {
        let mut progressed = false;
        for queue in &mut queues {
            if let Some(exercise) = queue.next() {
                progressed = true;
                exercises.push(RoutineExercise {
                    exercise_id: exercise.id.clone(),
                    name: exercise.name.clone(),
                    sets: prescription.sets,
                    reps: prescription.reps.to_owned(),
                    rest_seconds: prescription.rest_seconds,
                });
                if exercises.len() == wanted {
                    break 'fill;
                }
            }
        }
        if !progressed {
            break;
        }
    }

    let name = if focus.is_empty() {
        "Rutina de cuerpo completo".to_owned()
    } else {
        format!("Rutina de {}", focus.join(" y "))
    };

    RoutineRecord {
        is_custom: false,
        is_generated: true,
        ..RoutineRecord::new(
            Uuid::new_v4().to_string(),
            preferences.user_id.clone(),
            name,
            exercises,
            now,
        )
    }
}
