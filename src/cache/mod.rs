// ABOUTME: TTL-bounded cache over the local key-value store with typed, collision-free keys
// ABOUTME: Resource kinds map to TTL classes; all keys share one prefix for safe bulk clearing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Persistent cache implementation
pub mod persistent;

pub use crate::config::CacheTtlConfig;
pub use persistent::{CacheEntry, PersistentCache};

use repsync_core::constants::cache::CACHE_KEY_PREFIX;
use std::fmt;
use std::time::Duration;

impl CacheTtlConfig {
    /// Get TTL duration for a specific cache resource type
    #[must_use]
    pub const fn ttl_for_resource(&self, resource: &CacheResource) -> Duration {
        match resource {
            CacheResource::ExerciseCatalog => Duration::from_secs(self.catalog_secs),
            CacheResource::ExercisesByMuscle { .. } | CacheResource::ExercisesByEquipment { .. } => {
                Duration::from_secs(self.filtered_secs)
            }
            CacheResource::ExerciseSearch { .. } => Duration::from_secs(self.search_secs),
            CacheResource::Exercise { .. } => Duration::from_secs(self.exercise_secs),
        }
    }
}

/// Structured cache key
///
/// Rendered as `repsync:cache:<resource>`; parameters are lower-cased,
/// trimmed, and percent-encoded so no two logical keys share a string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Specific resource being cached
    pub resource: CacheResource,
}

impl CacheKey {
    /// Create new cache key
    #[must_use]
    pub const fn new(resource: CacheResource) -> Self {
        Self { resource }
    }

    /// Key of the full exercise catalog
    #[must_use]
    pub const fn catalog() -> Self {
        Self::new(CacheResource::ExerciseCatalog)
    }

    /// Key of the list filtered by muscle
    #[must_use]
    pub fn by_muscle(muscle: &str) -> Self {
        Self::new(CacheResource::ExercisesByMuscle {
            muscle: normalize_param(muscle),
        })
    }

    /// Key of the list filtered by equipment
    #[must_use]
    pub fn by_equipment(equipment: &str) -> Self {
        Self::new(CacheResource::ExercisesByEquipment {
            equipment: normalize_param(equipment),
        })
    }

    /// Key of a search result
    #[must_use]
    pub fn search(query: &str) -> Self {
        Self::new(CacheResource::ExerciseSearch {
            query: normalize_param(query),
        })
    }

    /// Key of a single exercise
    #[must_use]
    pub fn exercise(id: &str) -> Self {
        Self::new(CacheResource::Exercise {
            id: normalize_param(id),
        })
    }

    /// Prefix shared by every cache key
    #[must_use]
    pub const fn prefix() -> &'static str {
        CACHE_KEY_PREFIX
    }

    /// Whether a raw store key belongs to the cache
    #[must_use]
    pub fn is_cache_key(raw: &str) -> bool {
        raw.starts_with(CACHE_KEY_PREFIX)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CACHE_KEY_PREFIX}{}", self.resource)
    }
}

/// Cache resource types with their (already normalized) parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheResource {
    /// Full catalog
    ExerciseCatalog,
    /// Catalog filtered by muscle
    ExercisesByMuscle {
        /// Muscle name
        muscle: String,
    },
    /// Catalog filtered by equipment
    ExercisesByEquipment {
        /// Equipment name
        equipment: String,
    },
    /// Client-side search result
    ExerciseSearch {
        /// Search text
        query: String,
    },
    /// Single exercise
    Exercise {
        /// Exercise id
        id: String,
    },
}

impl fmt::Display for CacheResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExerciseCatalog => write!(f, "exercises:all"),
            Self::ExercisesByMuscle { muscle } => write!(f, "exercises:muscle:{muscle}"),
            Self::ExercisesByEquipment { equipment } => {
                write!(f, "exercises:equipment:{equipment}")
            }
            Self::ExerciseSearch { query } => write!(f, "exercises:search:{query}"),
            Self::Exercise { id } => write!(f, "exercise:{id}"),
        }
    }
}

fn normalize_param(value: &str) -> String {
    urlencoding::encode(&value.trim().to_lowercase()).into_owned()
}

/// Whether a rendered cache key matches a clear filter
///
/// The filter matches either the raw key text (`search:press`) or a parameter
/// value as the user typed it (`Push Up`), normalized the way keys are built.
pub(crate) fn key_matches(key: &str, needle: &str) -> bool {
    key.contains(needle) || key.contains(&normalize_param(needle))
}
