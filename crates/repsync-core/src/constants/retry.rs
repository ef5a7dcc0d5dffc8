// ABOUTME: Adaptive retry constants for the sleeping free-tier exercise API
// ABOUTME: Cold-start timeout, normal and retry timeouts, backoff base and multiplier
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Total attempts per remote call (first try included)
pub const MAX_ATTEMPTS: u32 = 3;

/// First-attempt timeout while the service is believed to be asleep
pub const WAKE_UP_TIMEOUT_SECS: u64 = 90;

/// First-attempt timeout while the service is awake
pub const NORMAL_TIMEOUT_SECS: u64 = 15;

/// Timeout for attempts 2..N
pub const RETRY_TIMEOUT_SECS: u64 = 8;

/// Delay before the first retry
pub const BASE_DELAY_MS: u64 = 2_000;

/// Geometric growth factor between consecutive retry delays
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Consecutive failures after which the service is considered asleep
pub const SLEEP_FAILURE_THRESHOLD: u32 = 2;

/// Idle time since the last success after which a cold start is assumed (15 minutes)
pub const IDLE_SLEEP_AFTER_SECS: u64 = 900;
