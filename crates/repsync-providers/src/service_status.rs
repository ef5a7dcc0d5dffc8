// ABOUTME: Service wake detector tracking whether the free-tier exercise backend is asleep
// ABOUTME: Lock-free shared state fed by every remote call outcome, read to pick timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use repsync_core::clock::{elapsed_since, Clock};
use repsync_core::constants::retry::{IDLE_SLEEP_AFTER_SECS, SLEEP_FAILURE_THRESHOLD};
use repsync_core::errors::provider::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Snapshot of the detector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// Backend is believed to be cold
    pub asleep: bool,
    /// Last successful call, epoch milliseconds
    pub last_success_epoch_ms: i64,
    /// Failures since the last success
    pub consecutive_failures: u32,
}

/// Thresholds for the wake detector
#[derive(Debug, Clone, Copy)]
pub struct WakeDetectorConfig {
    /// Consecutive failures after which the backend is considered asleep
    pub failure_threshold: u32,
    /// Idle time after which the backend is assumed asleep again
    pub idle_sleep_after: Duration,
}

impl Default for WakeDetectorConfig {
    fn default() -> Self {
        Self {
            failure_threshold: SLEEP_FAILURE_THRESHOLD,
            idle_sleep_after: Duration::from_secs(IDLE_SLEEP_AFTER_SECS),
        }
    }
}

/// Tracks whether the remote exercise service appears asleep
///
/// One instance is shared by every remote call so that a failure observed
/// by one request lengthens the first-attempt timeout of the next. The
/// detector never blocks a call; it only selects timing parameters.
#[derive(Debug)]
pub struct ServiceWakeDetector {
    config: WakeDetectorConfig,
    clock: Arc<dyn Clock>,
    asleep: AtomicBool,
    consecutive_failures: AtomicU32,
    last_success_ms: AtomicI64,
}

impl ServiceWakeDetector {
    /// Create a detector; the service counts as freshly seen at construction
    #[must_use]
    pub fn new(config: WakeDetectorConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_millis();
        Self {
            config,
            clock,
            asleep: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
            last_success_ms: AtomicI64::new(now),
        }
    }

    /// Record a successful call
    pub fn mark_success(&self) {
        self.last_success_ms
            .store(self.clock.now_millis(), Ordering::Release);
        self.consecutive_failures.store(0, Ordering::Release);
        if self.asleep.swap(false, Ordering::AcqRel) {
            info!("Exercise service is awake again");
        }
    }

    /// Record a failed call
    ///
    /// A definite non-retryable answer (404, 4xx, parse, auth) proves the
    /// service is up, so it counts as contact rather than a failure.
    pub fn mark_failure(&self, error: &ProviderError) {
        if !error.is_retryable() && !error.is_sleep_signature() {
            debug!(error = %error, "Service answered with a definite failure");
            self.mark_success();
            return;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        let signature = error.is_sleep_signature();

        if (signature || failures >= self.config.failure_threshold)
            && !self.asleep.swap(true, Ordering::AcqRel)
        {
            warn!(
                consecutive_failures = failures,
                sleep_signature = signature,
                "Exercise service appears to be asleep"
            );
        }
    }

    /// Whether the next call's first attempt should use the long wake-up timeout
    #[must_use]
    pub fn should_use_wake_up_timeout(&self) -> bool {
        self.asleep.load(Ordering::Acquire)
            || elapsed_since(
                self.clock.as_ref(),
                self.last_success_ms.load(Ordering::Acquire),
            ) > self.config.idle_sleep_after
    }

    /// Current state snapshot
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            asleep: self.asleep.load(Ordering::Acquire),
            last_success_epoch_ms: self.last_success_ms.load(Ordering::Acquire),
            consecutive_failures: self.consecutive_failures.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repsync_core::clock::ManualClock;

    fn detector() -> (ServiceWakeDetector, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        (
            ServiceWakeDetector::new(WakeDetectorConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_two_plain_failures_mark_asleep() {
        let (detector, _) = detector();
        let rejected = ProviderError::api("exercise-api", 500, "boom");

        detector.mark_failure(&rejected);
        assert!(!detector.should_use_wake_up_timeout());

        detector.mark_failure(&rejected);
        assert!(detector.should_use_wake_up_timeout());

        detector.mark_success();
        assert!(!detector.should_use_wake_up_timeout());
        assert_eq!(detector.status().consecutive_failures, 0);
    }

    #[test]
    fn test_definite_answers_do_not_count_toward_sleep() {
        let (detector, _) = detector();
        let missing = ProviderError::NotFound {
            provider: "exercise-api".to_owned(),
            resource_type: "exercise".to_owned(),
            resource_id: "9999".to_owned(),
        };

        detector.mark_failure(&ProviderError::api("exercise-api", 500, "boom"));
        detector.mark_failure(&missing);
        detector.mark_failure(&missing);
        detector.mark_failure(&ProviderError::api("exercise-api", 400, "bad request"));

        assert!(!detector.should_use_wake_up_timeout());
        assert_eq!(detector.status().consecutive_failures, 0);
    }

    #[test]
    fn test_sleep_signature_marks_asleep_immediately() {
        let (detector, _) = detector();
        detector.mark_failure(&ProviderError::api("exercise-api", 503, "cold"));
        assert!(detector.status().asleep);
    }

    #[test]
    fn test_idle_service_is_treated_as_asleep() {
        let (detector, clock) = detector();
        clock.advance(Duration::from_secs(15 * 60));
        assert!(!detector.should_use_wake_up_timeout());
        clock.advance(Duration::from_secs(1));
        assert!(detector.should_use_wake_up_timeout());
        assert!(!detector.status().asleep);
    }
}
