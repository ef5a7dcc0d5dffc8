// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for cache TTLs, retry timings, rate limits, storage keys, and messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Cache-related constants (TTL classes, key prefixes)
pub mod cache;
/// User-facing messages (Spanish, shown verbatim by the app)
pub mod messages;
/// Authentication rate limit defaults
pub mod rate_limits;
/// Adaptive retry and service-wake timings
pub mod retry;
/// Keys and collections used in local and remote storage
pub mod storage;

/// Connectivity monitor timings
pub mod connectivity {
    /// Debounce before the reconnect-triggered preference resync runs
    pub const RESYNC_DEBOUNCE_MS: u64 = 2_000;

    /// Pause between disabling and re-enabling the document store network
    pub const RECONNECT_PAUSE_MS: u64 = 1_000;
}

/// Exercise catalog API defaults
pub mod exercise_api {
    /// Default base URL of the exercise catalog service
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

    /// Records requested per page when listing the catalog
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Upper bound on pages fetched for a single listing
    pub const MAX_PAGES: u32 = 50;

    /// Provider name used in errors and logs
    pub const PROVIDER_NAME: &str = "exercise-api";

    /// Connect timeout for the shared HTTP client
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Service names for structured logging
pub mod service_names {
    /// Name reported by the library's log output
    pub const REPSYNC: &str = "repsync";
}
