// ABOUTME: Configuration management for the RepSync data layer
// ABOUTME: Environment-driven settings for cache TTLs, rate limits, retry, connectivity, API, storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for `RepSync`
//!
//! Every setting has a default taken from `repsync_core::constants` and can
//! be overridden with a `REPSYNC_*` environment variable. Unparseable values
//! fall back to the default.
//!
//! - **cache**: TTL classes and rate limiter thresholds
//! - **network**: retry policy, connectivity timings, exercise API endpoint
//! - **environment**: storage backend and the aggregate [`SyncConfig`]

use std::env;
use std::str::FromStr;

/// Cache TTL and rate limiting configuration
pub mod cache;
/// Aggregate configuration and storage settings
pub mod environment;
/// Retry, connectivity, and exercise API configuration
pub mod network;

pub use cache::{CacheTtlConfig, RateLimitConfig};
pub use environment::{StorageBackend, StorageConfig, SyncConfig};
pub use network::{ConnectivityConfig, ExerciseApiConfig, RetryConfig};

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
