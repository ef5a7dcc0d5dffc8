// ABOUTME: Retry policy, connectivity timings, and exercise API endpoint configuration
// ABOUTME: Converts into the provider crate's RetryPolicy and WakeDetectorConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::env_or;
use repsync_core::constants::{connectivity, exercise_api, retry};
use repsync_providers::{RetryPolicy, WakeDetectorConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Adaptive retry and wake detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call
    pub max_attempts: u32,
    /// First-attempt timeout while the service is asleep
    pub wake_timeout_secs: u64,
    /// First-attempt timeout while the service is awake
    pub normal_timeout_secs: u64,
    /// Timeout for attempts 2..N
    pub retry_timeout_secs: u64,
    /// Delay before the second attempt
    pub base_delay_ms: u64,
    /// Delay growth factor
    pub backoff_multiplier: u32,
    /// Consecutive failures that mark the service asleep
    pub sleep_failure_threshold: u32,
    /// Idle time after which the service is assumed asleep
    pub idle_sleep_after_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            wake_timeout_secs: retry::WAKE_UP_TIMEOUT_SECS,
            normal_timeout_secs: retry::NORMAL_TIMEOUT_SECS,
            retry_timeout_secs: retry::RETRY_TIMEOUT_SECS,
            base_delay_ms: retry::BASE_DELAY_MS,
            backoff_multiplier: retry::BACKOFF_MULTIPLIER,
            sleep_failure_threshold: retry::SLEEP_FAILURE_THRESHOLD,
            idle_sleep_after_secs: retry::IDLE_SLEEP_AFTER_SECS,
        }
    }
}

impl RetryConfig {
    /// Load retry configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_attempts: env_or("REPSYNC_RETRY_MAX_ATTEMPTS", retry::MAX_ATTEMPTS),
            wake_timeout_secs: env_or("REPSYNC_RETRY_WAKE_TIMEOUT_SECS", retry::WAKE_UP_TIMEOUT_SECS),
            normal_timeout_secs: env_or(
                "REPSYNC_RETRY_NORMAL_TIMEOUT_SECS",
                retry::NORMAL_TIMEOUT_SECS,
            ),
            retry_timeout_secs: env_or("REPSYNC_RETRY_TIMEOUT_SECS", retry::RETRY_TIMEOUT_SECS),
            base_delay_ms: env_or("REPSYNC_RETRY_BASE_DELAY_MS", retry::BASE_DELAY_MS),
            backoff_multiplier: env_or(
                "REPSYNC_RETRY_BACKOFF_MULTIPLIER",
                retry::BACKOFF_MULTIPLIER,
            ),
            sleep_failure_threshold: env_or(
                "REPSYNC_SLEEP_FAILURE_THRESHOLD",
                retry::SLEEP_FAILURE_THRESHOLD,
            ),
            idle_sleep_after_secs: env_or(
                "REPSYNC_IDLE_SLEEP_AFTER_SECS",
                retry::IDLE_SLEEP_AFTER_SECS,
            ),
        }
    }

    /// Retry policy for the executor
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            wake_timeout: Duration::from_secs(self.wake_timeout_secs),
            normal_timeout: Duration::from_secs(self.normal_timeout_secs),
            retry_timeout: Duration::from_secs(self.retry_timeout_secs),
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.backoff_multiplier,
        }
    }

    /// Thresholds for the wake detector
    #[must_use]
    pub const fn detector(&self) -> WakeDetectorConfig {
        WakeDetectorConfig {
            failure_threshold: self.sleep_failure_threshold,
            idle_sleep_after: Duration::from_secs(self.idle_sleep_after_secs),
        }
    }
}

/// Connectivity monitor timings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Debounce before the reconnect-triggered resync
    pub resync_debounce_ms: u64,
    /// Pause between disabling and re-enabling the document store network
    pub reconnect_pause_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            resync_debounce_ms: connectivity::RESYNC_DEBOUNCE_MS,
            reconnect_pause_ms: connectivity::RECONNECT_PAUSE_MS,
        }
    }
}

impl ConnectivityConfig {
    /// Load connectivity configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            resync_debounce_ms: env_or(
                "REPSYNC_RESYNC_DEBOUNCE_MS",
                connectivity::RESYNC_DEBOUNCE_MS,
            ),
            reconnect_pause_ms: env_or(
                "REPSYNC_RECONNECT_PAUSE_MS",
                connectivity::RECONNECT_PAUSE_MS,
            ),
        }
    }

    /// Debounce as a duration
    #[must_use]
    pub const fn resync_debounce(&self) -> Duration {
        Duration::from_millis(self.resync_debounce_ms)
    }

    /// Reconnect pause as a duration
    #[must_use]
    pub const fn reconnect_pause(&self) -> Duration {
        Duration::from_millis(self.reconnect_pause_ms)
    }
}

/// Exercise catalog endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseApiConfig {
    /// Base URL, e.g. `https://exercises.example.org/api/v1`
    pub base_url: String,
    /// Records per page when listing
    pub page_size: u32,
    /// Connect timeout for the shared HTTP client
    pub connect_timeout_secs: u64,
}

impl Default for ExerciseApiConfig {
    fn default() -> Self {
        Self {
            base_url: exercise_api::DEFAULT_BASE_URL.to_owned(),
            page_size: exercise_api::DEFAULT_PAGE_SIZE,
            connect_timeout_secs: exercise_api::CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ExerciseApiConfig {
    /// Load exercise API configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("REPSYNC_EXERCISE_API_URL")
                .unwrap_or_else(|_| exercise_api::DEFAULT_BASE_URL.to_owned()),
            page_size: env_or(
                "REPSYNC_EXERCISE_API_PAGE_SIZE",
                exercise_api::DEFAULT_PAGE_SIZE,
            ),
            connect_timeout_secs: env_or(
                "REPSYNC_HTTP_CONNECT_TIMEOUT_SECS",
                exercise_api::CONNECT_TIMEOUT_SECS,
            ),
        }
    }
}
