// ABOUTME: Integration tests for the auth attempt rate limiter
// ABOUTME: Soft cooldown, hard window, reset after clearing, and stale record pruning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::TEST_EPOCH_MS;
use repsync::config::RateLimitConfig;
use repsync::rate_limiting::{login_key, AttemptLimit, RateLimiter};
use repsync_core::clock::ManualClock;
use std::sync::Arc;
use std::time::Duration;

const LOGIN: AttemptLimit = AttemptLimit::new(8, Duration::from_secs(180));

fn limiter() -> (RateLimiter, Arc<ManualClock>) {
    common::init_test_logging();
    let clock = Arc::new(ManualClock::new(TEST_EPOCH_MS));
    let limiter = RateLimiter::new(&RateLimitConfig::default(), clock.clone());
    (limiter, clock)
}

#[test]
fn test_rapid_login_attempts_soft_then_hard_block() {
    let (limiter, clock) = limiter();
    let key = login_key("a@b.com");
    assert_eq!(key, "login_a@b.com");

    let results: Vec<bool> = (0..8)
        .map(|_| {
            clock.advance(Duration::from_millis(100));
            limiter.is_allowed(&key, LOGIN)
        })
        .collect();
    assert_eq!(
        results,
        vec![true, true, false, false, false, false, false, false]
    );

    // Past the soft cooldown the hard block still holds
    clock.advance(Duration::from_secs(60));
    assert!(!limiter.is_allowed(&key, LOGIN));
    let status = limiter.status(&key);
    assert!(status.is_blocked);
    assert!(status.attempts >= 8);

    // Window is measured from the first attempt
    clock.set_millis(TEST_EPOCH_MS + 100 + 180_000);
    assert!(limiter.is_allowed(&key, LOGIN));
    assert_eq!(limiter.status(&key).attempts, 1);
}

#[test]
fn test_soft_cooldown_expires_before_hard_limit() {
    let (limiter, clock) = limiter();
    let key = login_key("slow@example.com");

    assert!(limiter.is_allowed(&key, LOGIN));
    assert!(limiter.is_allowed(&key, LOGIN));
    assert!(!limiter.is_allowed(&key, LOGIN));
    assert_eq!(limiter.remaining_time(&key), Duration::from_secs(30));

    clock.advance(Duration::from_secs(30));
    assert!(limiter.is_allowed(&key, LOGIN));
    assert!(limiter.is_allowed(&key, LOGIN));
}

#[test]
fn test_call_past_max_is_always_blocked() {
    let (limiter, clock) = limiter();
    let key = login_key("max@example.com");

    assert!(limiter.is_allowed(&key, LOGIN));
    assert!(limiter.is_allowed(&key, LOGIN));
    clock.advance(Duration::from_secs(31));
    for _ in 0..5 {
        assert!(limiter.is_allowed(&key, LOGIN));
    }

    assert!(!limiter.is_allowed(&key, LOGIN));
    assert!(!limiter.is_allowed(&key, LOGIN));
    assert_eq!(limiter.remaining_time(&key), Duration::from_secs(149));
}

#[test]
fn test_clear_attempts_allows_next_call() {
    let (limiter, _clock) = limiter();
    let key = login_key("late@example.com");

    for _ in 0..8 {
        limiter.is_allowed(&key, LOGIN);
    }
    assert!(limiter.status(&key).is_blocked);

    limiter.clear_attempts(&key);

    assert!(limiter.is_allowed(&key, LOGIN));
    assert_eq!(limiter.remaining_time(&key), Duration::ZERO);
}

#[test]
fn test_keys_are_independent() {
    let (limiter, _clock) = limiter();
    for _ in 0..8 {
        limiter.is_allowed(&login_key("one@example.com"), LOGIN);
    }
    assert!(limiter.is_allowed(&login_key("two@example.com"), LOGIN));
}

#[test]
fn test_unknown_key_status_is_clear() {
    let (limiter, _clock) = limiter();
    let status = limiter.status("login_nobody@example.com");
    assert_eq!(status.attempts, 0);
    assert!(!status.is_blocked);
    assert_eq!(status.remaining_time, Duration::ZERO);
}

#[test]
fn test_expired_records_pruned_past_threshold() {
    common::init_test_logging();
    let clock = Arc::new(ManualClock::new(TEST_EPOCH_MS));
    let config = RateLimitConfig {
        cleanup_threshold: 3,
        ..RateLimitConfig::default()
    };
    let limiter = RateLimiter::new(&config, clock.clone());
    let short = AttemptLimit::new(8, Duration::from_secs(10));

    for user in ["a", "b", "c"] {
        limiter.is_allowed(&login_key(&format!("{user}@example.com")), short);
    }
    assert_eq!(limiter.tracked_keys(), 3);

    clock.advance(Duration::from_secs(11));
    limiter.is_allowed(&login_key("d@example.com"), short);

    assert_eq!(limiter.tracked_keys(), 1);
}
