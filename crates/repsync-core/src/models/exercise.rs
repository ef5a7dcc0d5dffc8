// ABOUTME: Exercise catalog models - raw remote record and its normalized form
// ABOUTME: Normalization lower-cases muscle/equipment and accepts string or list instructions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Instructions as delivered by the catalog: one block of text or a list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instructions {
    /// Ordered steps
    Steps(Vec<String>),
    /// Single text block, steps separated by newlines
    Text(String),
}

impl Default for Instructions {
    fn default() -> Self {
        Self::Steps(Vec::new())
    }
}

/// Identifier that may arrive as a JSON string or number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Flat exercise record as returned by the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    #[serde(alias = "exerciseId")]
    id: RawId,
    /// Display name
    pub name: String,
    /// Primary muscle
    #[serde(default, alias = "target")]
    pub muscle: String,
    /// Broader body region, used when no primary muscle is given
    #[serde(default, rename = "bodyPart", skip_serializing_if = "Option::is_none")]
    body_part: Option<String>,
    /// Required equipment
    #[serde(default)]
    pub equipment: String,
    /// Difficulty level, if the catalog provides one
    #[serde(default)]
    pub difficulty: Option<String>,
    /// How to perform the exercise
    #[serde(default)]
    pub instructions: Instructions,
}

impl ExerciseRecord {
    /// Build a record (used by in-memory sources and tests)
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        muscle: impl Into<String>,
        equipment: impl Into<String>,
    ) -> Self {
        Self {
            id: RawId::Text(id.into()),
            name: name.into(),
            muscle: muscle.into(),
            body_part: None,
            equipment: equipment.into(),
            difficulty: None,
            instructions: Instructions::default(),
        }
    }

    /// Identifier as text
    #[must_use]
    pub fn id(&self) -> String {
        self.id.clone().into_string()
    }
}

/// Normalized exercise as served to callers and stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Catalog identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Primary muscle, lower-case
    pub muscle: String,
    /// Required equipment, lower-case
    pub equipment: String,
    /// Difficulty, lower-case, if known
    pub difficulty: Option<String>,
    /// Ordered, non-empty steps
    pub instructions: Vec<String>,
}

impl From<ExerciseRecord> for Exercise {
    fn from(record: ExerciseRecord) -> Self {
        let instructions = match record.instructions {
            Instructions::Steps(steps) => steps,
            Instructions::Text(text) => text.lines().map(str::to_owned).collect(),
        }
        .into_iter()
        .map(|step| step.trim().to_owned())
        .filter(|step| !step.is_empty())
        .collect();

        let muscle = match normalize_term(&record.muscle) {
            muscle if muscle.is_empty() => record
                .body_part
                .as_deref()
                .map(normalize_term)
                .unwrap_or_default(),
            muscle => muscle,
        };

        Self {
            id: record.id.into_string(),
            name: record.name.trim().to_owned(),
            muscle,
            equipment: normalize_term(&record.equipment),
            difficulty: record
                .difficulty
                .map(|d| normalize_term(&d))
                .filter(|d| !d.is_empty()),
            instructions,
        }
    }
}

impl Exercise {
    /// Case-insensitive match against name, muscle, or equipment
    ///
    /// `query` must already be normalized with [`normalize_term`].
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        query.is_empty()
            || self.name.to_lowercase().contains(query)
            || self.muscle.contains(query)
            || self.equipment.contains(query)
    }

    /// Whether this exercise satisfies a muscle / equipment filter
    #[must_use]
    pub fn matches_filter(&self, filter: &ExerciseFilter) -> bool {
        filter
            .muscle
            .as_deref()
            .is_none_or(|muscle| self.muscle == normalize_term(muscle))
            && filter
                .equipment
                .as_deref()
                .is_none_or(|equipment| self.equipment == normalize_term(equipment))
    }
}

/// Server-side filter supported by the catalog list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExerciseFilter {
    /// Restrict to one muscle
    pub muscle: Option<String>,
    /// Restrict to one equipment type
    pub equipment: Option<String>,
}

impl ExerciseFilter {
    /// Filter on muscle only
    #[must_use]
    pub fn muscle(muscle: impl Into<String>) -> Self {
        Self {
            muscle: Some(muscle.into()),
            equipment: None,
        }
    }

    /// Filter on equipment only
    #[must_use]
    pub fn equipment(equipment: impl Into<String>) -> Self {
        Self {
            muscle: None,
            equipment: Some(equipment.into()),
        }
    }
}

/// Lower-case and trim a free-text term
#[must_use]
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_text_instructions_and_terms() -> Result<(), serde_json::Error> {
        let json = r#"{"id": 42, "name": " Push Up ", "target": "Chest",
            "equipment": "Body Weight ", "instructions": "Get down\n\n Push up \n"}"#;
        let record: ExerciseRecord = serde_json::from_str(json)?;
        let exercise = Exercise::from(record);

        assert_eq!(exercise.id, "42");
        assert_eq!(exercise.name, "Push Up");
        assert_eq!(exercise.muscle, "chest");
        assert_eq!(exercise.equipment, "body weight");
        assert_eq!(exercise.instructions, vec!["Get down", "Push up"]);
        Ok(())
    }

    #[test]
    fn test_target_and_body_part_together() -> Result<(), serde_json::Error> {
        let both = r#"{"id": "7", "name": "Curl", "target": "Biceps", "bodyPart": "upper arms"}"#;
        let exercise = Exercise::from(serde_json::from_str::<ExerciseRecord>(both)?);
        assert_eq!(exercise.muscle, "biceps");

        let body_part_only = r#"{"id": "8", "name": "Plank", "bodyPart": "Waist"}"#;
        let exercise = Exercise::from(serde_json::from_str::<ExerciseRecord>(body_part_only)?);
        assert_eq!(exercise.muscle, "waist");
        Ok(())
    }

    #[test]
    fn test_matches_filter_is_case_insensitive() {
        let exercise = Exercise::from(ExerciseRecord::new("1", "Squat", "Quads", "Barbell"));
        assert!(exercise.matches_filter(&ExerciseFilter::muscle("QUADS")));
        assert!(!exercise.matches_filter(&ExerciseFilter::equipment("dumbbell")));
        assert!(exercise.matches_query("squ"));
        assert!(exercise.matches_query("barbell"));
    }
}
