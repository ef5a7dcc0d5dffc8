// ABOUTME: In-memory attempt limiter for authentication entry points
// ABOUTME: Soft cooldown after a few attempts, hard block at the maximum until the window elapses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Auth Rate Limiting
//!
//! Every `is_allowed` call counts as an attempt against its key:
//!
//! - the first attempt of a fresh or expired window is always allowed;
//! - from `soft_threshold` attempts on, calls are rejected until the soft
//!   cooldown (measured from the window's first attempt) has passed;
//! - at `max_attempts`, calls are rejected until the whole window elapses.
//!
//! State is process memory only. This is a UX guard against hammering the
//! auth backend, not a security boundary.

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use repsync_core::clock::Clock;
use repsync_core::constants::rate_limits::{
    LOGIN_KEY_PREFIX, PASSWORD_RESET_KEY_PREFIX, REGISTER_KEY_PREFIX,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Attempts allowed per window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptLimit {
    /// Hard limit
    pub max_attempts: u32,
    /// Window length, measured from the first attempt
    pub window: Duration,
}

impl AttemptLimit {
    /// Create a limit
    #[must_use]
    pub const fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
        }
    }
}

/// Per-key attempt record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    /// Limiter key
    pub key: String,
    /// Attempts in the current window
    pub attempt_count: u32,
    /// First attempt of the current window, epoch milliseconds
    pub window_start_epoch_ms: i64,
    /// Window length the record was created with
    pub window_ms: i64,
    /// Hard limit the record was created with
    pub max_attempts: u32,
}

impl RateLimitRecord {
    fn fresh(key: &str, limit: AttemptLimit, now_ms: i64) -> Self {
        Self {
            key: key.to_owned(),
            attempt_count: 0,
            window_start_epoch_ms: now_ms,
            window_ms: duration_ms(limit.window),
            max_attempts: limit.max_attempts,
        }
    }

    fn window_elapsed(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.window_start_epoch_ms) >= self.window_ms
    }
}

/// Current limiter state for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Attempts in the current window
    pub attempts: u32,
    /// Whether the next attempt would be rejected
    pub is_blocked: bool,
    /// Time until the next attempt can be allowed
    pub remaining_time: Duration,
}

/// Attempt limiter keyed by action and identity
#[derive(Debug)]
pub struct RateLimiter {
    records: DashMap<String, RateLimitRecord>,
    clock: Arc<dyn Clock>,
    soft_threshold: u32,
    soft_cooldown: Duration,
    cleanup_threshold: usize,
}

impl RateLimiter {
    /// Create a limiter with the configured soft threshold and cooldown
    #[must_use]
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
            soft_threshold: config.soft_threshold,
            soft_cooldown: config.soft_cooldown(),
            cleanup_threshold: config.cleanup_threshold,
        }
    }

    /// Count an attempt for `key` and report whether it may proceed
    pub fn is_allowed(&self, key: &str, limit: AttemptLimit) -> bool {
        let now = self.clock.now_millis();

        let mut entry = self
            .records
            .entry(key.to_owned())
            .or_insert_with(|| RateLimitRecord::fresh(key, limit, now));
        let record = entry.value_mut();

        if record.window_elapsed(now) {
            *record = RateLimitRecord::fresh(key, limit, now);
        }
        record.attempt_count = record.attempt_count.saturating_add(1);

        let attempts = record.attempt_count;
        let allowed = attempts == 1 || self.block_remaining(record, now).is_zero();
        drop(entry);

        if self.records.len() > self.cleanup_threshold {
            self.cleanup_expired(now);
        }

        if !allowed {
            debug!(key, attempts, "Rate limit rejected attempt");
        }
        allowed
    }

    /// Time until `key` may attempt again; zero when not blocked
    #[must_use]
    pub fn remaining_time(&self, key: &str) -> Duration {
        let now = self.clock.now_millis();
        self.records
            .get(key)
            .map_or(Duration::ZERO, |record| self.block_remaining(&record, now))
    }

    /// Forget all attempts for `key`
    pub fn clear_attempts(&self, key: &str) {
        self.records.remove(key);
    }

    /// Attempts and block state for `key`
    #[must_use]
    pub fn status(&self, key: &str) -> RateLimitStatus {
        let now = self.clock.now_millis();
        let Some(record) = self.records.get(key) else {
            return RateLimitStatus {
                attempts: 0,
                is_blocked: false,
                remaining_time: Duration::ZERO,
            };
        };

        let attempts = if record.window_elapsed(now) {
            0
        } else {
            record.attempt_count
        };
        let remaining_time = self.block_remaining(&record, now);
        RateLimitStatus {
            attempts,
            is_blocked: !remaining_time.is_zero(),
            remaining_time,
        }
    }

    /// Number of tracked keys
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.records.len()
    }

    fn block_remaining(&self, record: &RateLimitRecord, now_ms: i64) -> Duration {
        if record.window_elapsed(now_ms) {
            return Duration::ZERO;
        }
        let elapsed = now_ms.saturating_sub(record.window_start_epoch_ms);

        if record.attempt_count >= record.max_attempts {
            return millis(record.window_ms.saturating_sub(elapsed));
        }

        let cooldown_ms = duration_ms(self.soft_cooldown);
        if record.attempt_count >= self.soft_threshold && elapsed < cooldown_ms {
            return millis(cooldown_ms - elapsed);
        }

        Duration::ZERO
    }

    fn cleanup_expired(&self, now_ms: i64) {
        self.records.retain(|_key, record| !record.window_elapsed(now_ms));
    }
}

/// Limiter key for sign-in attempts
#[must_use]
pub fn login_key(email: &str) -> String {
    format!("{LOGIN_KEY_PREFIX}{}", normalize_email(email))
}

/// Limiter key for sign-up attempts
#[must_use]
pub fn register_key(email: &str) -> String {
    format!("{REGISTER_KEY_PREFIX}{}", normalize_email(email))
}

/// Limiter key for password reset requests
#[must_use]
pub fn password_reset_key(email: &str) -> String {
    format!("{PASSWORD_RESET_KEY_PREFIX}{}", normalize_email(email))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0).unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_normalize_email() {
        assert_eq!(login_key(" A@B.com "), "login_a@b.com");
        assert_eq!(register_key("x@y.z"), "register_x@y.z");
        assert_eq!(password_reset_key("x@y.z"), "reset_x@y.z");
    }
}
