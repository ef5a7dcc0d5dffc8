// ABOUTME: Authentication gateway: field validation, local rate limiting, then the auth provider
// ABOUTME: Provider error codes surface as localized user-facing messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Auth Gateway
//!
//! Every entry point checks its inputs, then asks the [`RateLimiter`] before
//! any network call. A successful sign-in or sign-up clears the limiter key so
//! a user who got their password right late is not penalized afterwards.

use crate::config::RateLimitConfig;
use crate::rate_limiting::{login_key, password_reset_key, register_key, AttemptLimit, RateLimiter};
use regex::Regex;
use repsync_core::constants::messages;
use repsync_core::errors::{AppError, AppResult};
use repsync_providers::{AuthProvider, AuthUser};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Validated, rate-limited access to the auth provider
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    limiter: Arc<RateLimiter>,
    login: AttemptLimit,
    register: AttemptLimit,
    password_reset: AttemptLimit,
}

impl AuthService {
    /// Create a gateway using the configured attempt limits
    #[must_use]
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        limiter: Arc<RateLimiter>,
        limits: &RateLimitConfig,
    ) -> Self {
        Self {
            provider,
            limiter,
            login: limits.login(),
            register: limits.register(),
            password_reset: limits.password_reset(),
        }
    }

    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// `InvalidInput` for missing or malformed fields, `RateLimitExceeded` when
    /// the limiter blocks the attempt, or `AuthFailed` / `ServiceWakingUp`
    /// from the provider.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let email = validate_email(email)?;
        require(password, "password", messages::VALIDATION_PASSWORD_REQUIRED)?;

        let key = login_key(email);
        self.check_limit(&key, self.login)?;

        let user = self.provider.sign_in(email, password).await.map_err(|e| {
            warn!(error = %e, "Sign-in rejected");
            AppError::from(e)
        })?;
        self.limiter.clear_attempts(&key);
        info!(uid = %user.uid, "User signed in");
        Ok(user)
    }

    /// Create an account and sign it in
    ///
    /// # Errors
    ///
    /// As [`AuthService::sign_in`]; also `InvalidInput` for a short password
    /// or missing display name.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<AuthUser> {
        let email = validate_email(email)?;
        require(password, "password", messages::VALIDATION_PASSWORD_REQUIRED)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input("password", messages::AUTH_WEAK_PASSWORD));
        }
        require(display_name, "displayName", messages::VALIDATION_NAME_REQUIRED)?;

        let key = register_key(email);
        self.check_limit(&key, self.register)?;

        let user = self
            .provider
            .create_account(email, password, display_name.trim())
            .await
            .map_err(|e| {
                warn!(error = %e, "Sign-up rejected");
                AppError::from(e)
            })?;
        self.limiter.clear_attempts(&key);
        info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    /// Sign out the current user
    ///
    /// # Errors
    ///
    /// Provider failures mapped through [`AppError::from`].
    pub async fn sign_out(&self) -> AppResult<()> {
        self.provider.sign_out().await?;
        debug!("User signed out");
        Ok(())
    }

    /// Send a password reset email
    ///
    /// The limiter key is not cleared on success, so repeated requests stay
    /// throttled.
    ///
    /// # Errors
    ///
    /// As [`AuthService::sign_in`].
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let email = validate_email(email)?;
        let key = password_reset_key(email);
        self.check_limit(&key, self.password_reset)?;

        self.provider.send_password_reset(email).await?;
        info!("Password reset requested");
        Ok(())
    }

    fn check_limit(&self, key: &str, limit: AttemptLimit) -> AppResult<()> {
        if self.limiter.is_allowed(key, limit) {
            return Ok(());
        }
        let remaining = self.limiter.remaining_time(key);
        warn!(key, remaining_ms = remaining.as_millis(), "Auth attempt rate limited");
        Err(AppError::rate_limited(remaining))
    }
}

fn require(value: &str, field: &str, message: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input(field, message));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<&str> {
    let email = email.trim();
    require(email, "email", messages::VALIDATION_EMAIL_REQUIRED)?;
    let valid = EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email));
    if !valid {
        return Err(AppError::invalid_input("email", messages::AUTH_INVALID_EMAIL));
    }
    Ok(email)
}
