// ABOUTME: Authentication backend interface (create account, sign in, sign out, reset)
// ABOUTME: In-memory implementation reporting the same auth/* codes as the hosted backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use dashmap::DashMap;
use repsync_core::errors::provider::ProviderError;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

/// Provider name used in errors raised by the in-memory backend
const PROVIDER_NAME: &str = "auth";

/// Minimum password length accepted by the in-memory backend
const MIN_PASSWORD_LEN: usize = 6;

/// Signed-in user as reported by the auth backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// Stable user identifier
    pub uid: String,
    /// Account email
    pub email: String,
    /// Display name, if set
    pub display_name: Option<String>,
}

/// Hosted authentication backend
///
/// Failures carry `auth/*` codes (`auth/wrong-password`,
/// `auth/email-already-in-use`, ...) classified through
/// [`ProviderError::from_provider_code`].
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account and sign it in
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, ProviderError>;

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError>;

    /// Sign out the current user
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Send a password reset email
    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
    disabled: bool,
}

/// In-process auth backend
#[derive(Debug, Default)]
pub struct InMemoryAuthProvider {
    accounts: DashMap<String, Account>,
    current: RwLock<Option<AuthUser>>,
}

impl InMemoryAuthProvider {
    /// Backend with no accounts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block further sign-ins for an account
    pub fn disable_account(&self, email: &str) {
        if let Some(mut account) = self.accounts.get_mut(&email.to_lowercase()) {
            account.disabled = true;
        }
    }

    /// Currently signed-in user
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.read().ok().and_then(|current| current.clone())
    }

    fn set_current(&self, user: Option<AuthUser>) {
        if let Ok(mut current) = self.current.write() {
            *current = user;
        }
    }
}

fn auth_error(code: &str, message: &str) -> ProviderError {
    ProviderError::from_provider_code(PROVIDER_NAME, code, message)
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, ProviderError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(auth_error("auth/weak-password", "password too short"));
        }
        let key = email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(auth_error("auth/email-already-in-use", "email taken"));
        }

        let user = AuthUser {
            uid: Uuid::new_v4().to_string(),
            email: key.clone(),
            display_name: Some(display_name.to_owned()),
        };
        self.accounts.insert(
            key,
            Account {
                password: password.to_owned(),
                user: user.clone(),
                disabled: false,
            },
        );
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        let account = self
            .accounts
            .get(&email.to_lowercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| auth_error("auth/user-not-found", "no such user"))?;

        if account.disabled {
            return Err(auth_error("auth/user-disabled", "account disabled"));
        }
        if account.password != password {
            return Err(auth_error("auth/wrong-password", "password mismatch"));
        }

        self.set_current(Some(account.user.clone()));
        Ok(account.user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.set_current(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        if self.accounts.contains_key(&email.to_lowercase()) {
            Ok(())
        } else {
            Err(auth_error("auth/user-not-found", "no such user"))
        }
    }
}
