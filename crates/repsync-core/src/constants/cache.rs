// ABOUTME: Cache-related constants for TTL classes and key namespacing
// ABOUTME: TTLs are per resource kind; every cache key carries the common prefix
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Full exercise catalog TTL (1 hour)
pub const TTL_CATALOG_SECS: u64 = 3_600;

/// Muscle / equipment filtered list TTL (1 hour)
pub const TTL_FILTERED_SECS: u64 = 3_600;

/// Client-side search result TTL (30 minutes) - queries are cheap to rebuild
pub const TTL_SEARCH_SECS: u64 = 1_800;

/// Single exercise lookup TTL (1 hour)
pub const TTL_EXERCISE_SECS: u64 = 3_600;

/// Cache key prefix for namespacing; `clear()` never touches keys without it
pub const CACHE_KEY_PREFIX: &str = "repsync:cache:";

/// Entries older than this are purged at startup regardless of resource kind (7 days)
pub const STARTUP_PURGE_MAX_AGE_SECS: u64 = 604_800;
