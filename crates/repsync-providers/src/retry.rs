// ABOUTME: Adaptive retry with exponential backoff for calls to a cold-starting backend
// ABOUTME: Pure attempt planner plus an executor that feeds every outcome to the wake detector
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::service_status::ServiceWakeDetector;
use repsync_core::constants::retry::{
    BACKOFF_MULTIPLIER, BASE_DELAY_MS, MAX_ATTEMPTS, NORMAL_TIMEOUT_SECS, RETRY_TIMEOUT_SECS,
    WAKE_UP_TIMEOUT_SECS,
};
use repsync_core::errors::provider::ProviderError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing parameters for the adaptive retry wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// First-attempt timeout when the service is believed asleep
    pub wake_timeout: Duration,
    /// First-attempt timeout when the service is awake
    pub normal_timeout: Duration,
    /// Timeout for attempts 2..N
    pub retry_timeout: Duration,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Growth factor applied to the delay for each later attempt
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            wake_timeout: Duration::from_secs(WAKE_UP_TIMEOUT_SECS),
            normal_timeout: Duration::from_secs(NORMAL_TIMEOUT_SECS),
            retry_timeout: Duration::from_secs(RETRY_TIMEOUT_SECS),
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            multiplier: BACKOFF_MULTIPLIER,
        }
    }
}

/// Input to the attempt planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    /// 1-based number of the attempt about to be made
    pub attempt: u32,
    /// Wake detector verdict sampled when the call started
    pub service_asleep: bool,
}

/// What to do for the next attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPlan {
    /// Bound on the attempt
    pub timeout: Duration,
    /// Pause before the attempt
    pub delay: Duration,
    /// No attempt should be made
    pub should_stop: bool,
}

/// Plan the given attempt
///
/// Attempt 1 runs immediately with the wake-up timeout if the service is
/// asleep and the normal timeout otherwise. Attempt `n >= 2` waits
/// `base_delay * multiplier^(n-2)` and runs with the short retry timeout.
/// Any attempt beyond `max_attempts` is a stop.
#[must_use]
pub fn next_attempt(policy: &RetryPolicy, state: &AttemptState) -> AttemptPlan {
    if state.attempt > policy.max_attempts {
        return AttemptPlan {
            timeout: Duration::ZERO,
            delay: Duration::ZERO,
            should_stop: true,
        };
    }

    if state.attempt <= 1 {
        let timeout = if state.service_asleep {
            policy.wake_timeout
        } else {
            policy.normal_timeout
        };
        return AttemptPlan {
            timeout,
            delay: Duration::ZERO,
            should_stop: false,
        };
    }

    let factor = policy.multiplier.saturating_pow(state.attempt - 2);
    AttemptPlan {
        timeout: policy.retry_timeout,
        delay: policy.base_delay.saturating_mul(factor),
        should_stop: false,
    }
}

/// Runs remote operations under the adaptive retry policy
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    detector: Arc<ServiceWakeDetector>,
}

impl RetryExecutor {
    /// Create an executor sharing the given detector
    ///
    /// At least one attempt is always made.
    #[must_use]
    pub fn new(mut policy: RetryPolicy, detector: Arc<ServiceWakeDetector>) -> Self {
        policy.max_attempts = policy.max_attempts.max(1);
        Self { policy, detector }
    }

    /// The shared wake detector
    #[must_use]
    pub fn detector(&self) -> &Arc<ServiceWakeDetector> {
        &self.detector
    }

    /// The configured policy
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails non-retryably, or attempts run out
    ///
    /// Each attempt is bounded by the planned timeout; an elapsed timeout is a
    /// `ProviderError::Timeout`. Every outcome is reported to the detector.
    ///
    /// # Errors
    ///
    /// Returns the operation's error unchanged when it is not retryable, or
    /// `ProviderError::RetriesExhausted` wrapping the last error once
    /// `max_attempts` invocations have failed.
    pub async fn run<T, F, Fut>(&self, context: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let service_asleep = self.detector.should_use_wake_up_timeout();
        let mut state = AttemptState {
            attempt: 1,
            service_asleep,
        };

        loop {
            let plan = next_attempt(&self.policy, &state);
            if !plan.delay.is_zero() {
                debug!(
                    context,
                    attempt = state.attempt,
                    delay_ms = plan.delay.as_millis(),
                    "Backing off before retry"
                );
                tokio::time::sleep(plan.delay).await;
            }

            let outcome = tokio::time::timeout(plan.timeout, operation())
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::Timeout {
                        provider: context.to_owned(),
                        timeout_ms: u64::try_from(plan.timeout.as_millis()).unwrap_or(u64::MAX),
                    })
                });

            let error = match outcome {
                Ok(value) => {
                    self.detector.mark_success();
                    if state.attempt > 1 {
                        info!(context, attempt = state.attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            self.detector.mark_failure(&error);

            if !error.is_retryable() {
                debug!(context, error = %error, "Non-retryable failure");
                return Err(error);
            }

            let attempts = state.attempt;
            state.attempt += 1;
            if next_attempt(&self.policy, &state).should_stop {
                warn!(context, attempts, error = %error, "Retries exhausted");
                return Err(ProviderError::RetriesExhausted {
                    context: context.to_owned(),
                    attempts,
                    last_error: Box::new(error),
                });
            }

            warn!(
                context,
                attempt = attempts,
                max_attempts = self.policy.max_attempts,
                error = %error,
                "Attempt failed, retrying"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_timeout_depends_on_wake_state() {
        let policy = RetryPolicy::default();
        let awake = next_attempt(
            &policy,
            &AttemptState {
                attempt: 1,
                service_asleep: false,
            },
        );
        let asleep = next_attempt(
            &policy,
            &AttemptState {
                attempt: 1,
                service_asleep: true,
            },
        );

        assert_eq!(awake.timeout, Duration::from_secs(15));
        assert_eq!(asleep.timeout, Duration::from_secs(90));
        assert_eq!(awake.delay, Duration::ZERO);
        assert!(!awake.should_stop);
    }

    #[test]
    fn test_retries_use_short_timeout_and_geometric_delay() {
        let policy = RetryPolicy::default();
        let plan = |attempt| {
            next_attempt(
                &policy,
                &AttemptState {
                    attempt,
                    service_asleep: true,
                },
            )
        };

        assert_eq!(plan(2).timeout, Duration::from_secs(8));
        assert_eq!(plan(2).delay, Duration::from_secs(2));
        assert_eq!(plan(3).delay, Duration::from_secs(4));
        assert!(plan(4).should_stop);
    }

    #[test]
    fn test_zero_attempts_stops_immediately() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        let plan = next_attempt(
            &policy,
            &AttemptState {
                attempt: 1,
                service_asleep: false,
            },
        );
        assert!(plan.should_stop);
    }
}
