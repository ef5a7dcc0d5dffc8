// ABOUTME: Cache TTL classes and auth rate limiting thresholds
// ABOUTME: Loaded from REPSYNC_CACHE_* and REPSYNC_*_MAX_ATTEMPTS / *_WINDOW_SECS variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::env_or;
use crate::rate_limiting::AttemptLimit;
use repsync_core::constants::{cache, rate_limits};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL per cached resource class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTtlConfig {
    /// Full exercise catalog (default: 1 hour)
    pub catalog_secs: u64,
    /// Lists filtered by muscle or equipment (default: 1 hour)
    pub filtered_secs: u64,
    /// Search results (default: 30 minutes)
    pub search_secs: u64,
    /// Single exercise (default: 1 hour)
    pub exercise_secs: u64,
    /// Entries older than this are purged at startup (default: 7 days)
    pub purge_max_age_secs: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            catalog_secs: cache::TTL_CATALOG_SECS,
            filtered_secs: cache::TTL_FILTERED_SECS,
            search_secs: cache::TTL_SEARCH_SECS,
            exercise_secs: cache::TTL_EXERCISE_SECS,
            purge_max_age_secs: cache::STARTUP_PURGE_MAX_AGE_SECS,
        }
    }
}

impl CacheTtlConfig {
    /// Load cache TTL configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            catalog_secs: env_or("REPSYNC_CACHE_TTL_CATALOG_SECS", cache::TTL_CATALOG_SECS),
            filtered_secs: env_or("REPSYNC_CACHE_TTL_FILTERED_SECS", cache::TTL_FILTERED_SECS),
            search_secs: env_or("REPSYNC_CACHE_TTL_SEARCH_SECS", cache::TTL_SEARCH_SECS),
            exercise_secs: env_or("REPSYNC_CACHE_TTL_EXERCISE_SECS", cache::TTL_EXERCISE_SECS),
            purge_max_age_secs: env_or(
                "REPSYNC_CACHE_PURGE_MAX_AGE_SECS",
                cache::STARTUP_PURGE_MAX_AGE_SECS,
            ),
        }
    }

    /// Maximum age for the startup purge
    #[must_use]
    pub const fn purge_max_age(&self) -> Duration {
        Duration::from_secs(self.purge_max_age_secs)
    }
}

/// Attempt limits for the auth entry points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sign-in attempts per window
    pub login_max_attempts: u32,
    /// Sign-in window in seconds
    pub login_window_secs: u64,
    /// Sign-up attempts per window
    pub register_max_attempts: u32,
    /// Sign-up window in seconds
    pub register_window_secs: u64,
    /// Password reset attempts per window
    pub reset_max_attempts: u32,
    /// Password reset window in seconds
    pub reset_window_secs: u64,
    /// Attempt count from which the short cooldown applies
    pub soft_threshold: u32,
    /// Short cooldown, measured from the first attempt in the window
    pub soft_cooldown_secs: u64,
    /// Table size that triggers pruning of expired records
    pub cleanup_threshold: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_max_attempts: rate_limits::LOGIN_MAX_ATTEMPTS,
            login_window_secs: rate_limits::LOGIN_WINDOW_SECS,
            register_max_attempts: rate_limits::REGISTER_MAX_ATTEMPTS,
            register_window_secs: rate_limits::REGISTER_WINDOW_SECS,
            reset_max_attempts: rate_limits::PASSWORD_RESET_MAX_ATTEMPTS,
            reset_window_secs: rate_limits::PASSWORD_RESET_WINDOW_SECS,
            soft_threshold: rate_limits::SOFT_THRESHOLD,
            soft_cooldown_secs: rate_limits::SOFT_COOLDOWN_SECS,
            cleanup_threshold: rate_limits::CLEANUP_THRESHOLD,
        }
    }
}

impl RateLimitConfig {
    /// Load rate limiting configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            login_max_attempts: env_or("REPSYNC_LOGIN_MAX_ATTEMPTS", defaults.login_max_attempts),
            login_window_secs: env_or("REPSYNC_LOGIN_WINDOW_SECS", defaults.login_window_secs),
            register_max_attempts: env_or(
                "REPSYNC_REGISTER_MAX_ATTEMPTS",
                defaults.register_max_attempts,
            ),
            register_window_secs: env_or(
                "REPSYNC_REGISTER_WINDOW_SECS",
                defaults.register_window_secs,
            ),
            reset_max_attempts: env_or("REPSYNC_RESET_MAX_ATTEMPTS", defaults.reset_max_attempts),
            reset_window_secs: env_or("REPSYNC_RESET_WINDOW_SECS", defaults.reset_window_secs),
            soft_threshold: env_or("REPSYNC_RATE_LIMIT_SOFT_THRESHOLD", defaults.soft_threshold),
            soft_cooldown_secs: env_or(
                "REPSYNC_RATE_LIMIT_SOFT_COOLDOWN_SECS",
                defaults.soft_cooldown_secs,
            ),
            cleanup_threshold: defaults.cleanup_threshold,
        }
    }

    /// Sign-in limit
    #[must_use]
    pub const fn login(&self) -> AttemptLimit {
        AttemptLimit::new(self.login_max_attempts, Duration::from_secs(self.login_window_secs))
    }

    /// Sign-up limit
    #[must_use]
    pub const fn register(&self) -> AttemptLimit {
        AttemptLimit::new(
            self.register_max_attempts,
            Duration::from_secs(self.register_window_secs),
        )
    }

    /// Password reset limit
    #[must_use]
    pub const fn password_reset(&self) -> AttemptLimit {
        AttemptLimit::new(self.reset_max_attempts, Duration::from_secs(self.reset_window_secs))
    }

    /// Short cooldown duration
    #[must_use]
    pub const fn soft_cooldown(&self) -> Duration {
        Duration::from_secs(self.soft_cooldown_secs)
    }
}
