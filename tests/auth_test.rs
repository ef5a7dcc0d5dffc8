// ABOUTME: Integration tests for the auth gateway over the in-memory auth provider
// ABOUTME: Covers validation ordering, local rate limiting, limiter clearing, and localized provider errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::TEST_EPOCH_MS;
use repsync::auth::AuthService;
use repsync::config::RateLimitConfig;
use repsync::rate_limiting::{login_key, RateLimiter};
use repsync_core::clock::ManualClock;
use repsync_core::constants::messages;
use repsync_core::errors::ErrorCode;
use repsync_providers::InMemoryAuthProvider;
use std::sync::Arc;
use std::time::Duration;

const EMAIL: &str = "runner@example.com";
const PASSWORD: &str = "correct-horse";

struct Harness {
    auth: AuthService,
    provider: Arc<InMemoryAuthProvider>,
    limiter: Arc<RateLimiter>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        common::init_test_logging();
        let config = RateLimitConfig::default();
        let clock = Arc::new(ManualClock::new(TEST_EPOCH_MS));
        let limiter = Arc::new(RateLimiter::new(&config, clock.clone()));
        let provider = Arc::new(InMemoryAuthProvider::new());
        Self {
            auth: AuthService::new(provider.clone(), limiter.clone(), &config),
            provider,
            limiter,
            clock,
        }
    }

    async fn with_account() -> Result<Self> {
        let h = Self::new();
        h.auth.sign_up(EMAIL, PASSWORD, "Runner").await?;
        h.auth.sign_out().await?;
        Ok(h)
    }
}

#[tokio::test]
async fn test_sign_up_then_sign_in() -> Result<()> {
    let h = Harness::new();
    let created = h.auth.sign_up(EMAIL, PASSWORD, "  Runner ").await?;
    assert_eq!(created.display_name.as_deref(), Some("Runner"));

    h.auth.sign_out().await?;
    assert!(h.provider.current_user().is_none());

    let signed_in = h.auth.sign_in(" Runner@Example.com ", PASSWORD).await?;
    assert_eq!(signed_in.uid, created.uid);
    assert_eq!(h.provider.current_user(), Some(signed_in));
    Ok(())
}

#[tokio::test]
async fn test_wrong_password_is_localized() -> Result<()> {
    let h = Harness::with_account().await?;

    let error = h.auth.sign_in(EMAIL, "nope").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthFailed);
    assert_eq!(error.message, messages::AUTH_WRONG_PASSWORD);

    let error = h.auth.sign_in("ghost@example.com", "nope").await.unwrap_err();
    assert_eq!(error.message, messages::AUTH_USER_NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_third_quick_attempt_is_blocked_before_provider() -> Result<()> {
    let h = Harness::with_account().await?;

    assert!(h.auth.sign_in(EMAIL, "nope").await.is_err());
    h.clock.advance(Duration::from_secs(5));
    assert!(h.auth.sign_in(EMAIL, "nope").await.is_err());

    // Correct password, but the limiter rejects without asking the provider
    let error = h.auth.sign_in(EMAIL, PASSWORD).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::RateLimitExceeded);
    assert_eq!(error.details["remaining_secs"], 25);
    assert!(h.provider.current_user().is_none());
    Ok(())
}

#[tokio::test]
async fn test_success_clears_limiter() -> Result<()> {
    let h = Harness::with_account().await?;

    assert!(h.auth.sign_in(EMAIL, "nope").await.is_err());
    assert!(h.auth.sign_in(EMAIL, "nope").await.is_err());
    h.clock.advance(Duration::from_secs(31));
    h.auth.sign_in(EMAIL, PASSWORD).await?;

    let status = h.limiter.status(&login_key(EMAIL));
    assert_eq!(status.attempts, 0);
    assert!(!status.is_blocked);
    Ok(())
}

#[tokio::test]
async fn test_limiter_key_ignores_email_case() -> Result<()> {
    let h = Harness::with_account().await?;

    assert!(h.auth.sign_in("RUNNER@example.com", "nope").await.is_err());
    assert!(h.auth.sign_in("runner@EXAMPLE.com", "nope").await.is_err());
    let error = h.auth.sign_in(EMAIL, "nope").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::RateLimitExceeded);
    Ok(())
}

#[tokio::test]
async fn test_validation_runs_before_limiter() {
    let h = Harness::new();

    for _ in 0..10 {
        let error = h.auth.sign_in("not-an-email", PASSWORD).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(error.message, messages::AUTH_INVALID_EMAIL);
    }
    let error = h.auth.sign_in(EMAIL, " ").await.unwrap_err();
    assert_eq!(error.details["field"], "password");
    let error = h.auth.sign_in("", PASSWORD).await.unwrap_err();
    assert_eq!(error.message, messages::VALIDATION_EMAIL_REQUIRED);

    assert_eq!(h.limiter.tracked_keys(), 0);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let h = Harness::new();

    let weak = h.auth.sign_up(EMAIL, "12345", "Runner").await.unwrap_err();
    assert_eq!(weak.code, ErrorCode::InvalidInput);
    assert_eq!(weak.message, messages::AUTH_WEAK_PASSWORD);

    let nameless = h.auth.sign_up(EMAIL, PASSWORD, "  ").await.unwrap_err();
    assert_eq!(nameless.details["field"], "displayName");

    assert_eq!(h.limiter.tracked_keys(), 0);
    assert!(h.provider.current_user().is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_is_localized() -> Result<()> {
    let h = Harness::with_account().await?;

    let error = h.auth.sign_up(EMAIL, PASSWORD, "Again").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthFailed);
    assert_eq!(error.message, messages::AUTH_EMAIL_IN_USE);
    Ok(())
}

#[tokio::test]
async fn test_disabled_account() -> Result<()> {
    let h = Harness::with_account().await?;
    h.provider.disable_account(EMAIL);

    let error = h.auth.sign_in(EMAIL, PASSWORD).await.unwrap_err();
    assert_eq!(error.message, messages::AUTH_USER_DISABLED);
    Ok(())
}

#[tokio::test]
async fn test_password_reset_stays_throttled_after_success() -> Result<()> {
    let h = Harness::with_account().await?;

    h.auth.request_password_reset(EMAIL).await?;
    h.auth.request_password_reset(EMAIL).await?;
    let error = h.auth.request_password_reset(EMAIL).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::RateLimitExceeded);
    assert_eq!(error.details["remaining_secs"], 300);

    h.clock.advance(Duration::from_secs(301));
    h.auth.request_password_reset(EMAIL).await?;

    let unknown = h
        .auth
        .request_password_reset("ghost@example.com")
        .await
        .unwrap_err();
    assert_eq!(unknown.message, messages::AUTH_USER_NOT_FOUND);
    Ok(())
}
