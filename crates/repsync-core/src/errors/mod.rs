// ABOUTME: Unified error handling with error codes, user-facing messages, and source chaining
// ABOUTME: Maps provider failures onto the offline/remote/auth/validation taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every failure that reaches a caller is an [`AppError`]: a stable
//! [`ErrorCode`], a human-readable message that is safe to show in the app,
//! optional structured details, and the underlying cause as `source`.
//!
//! Remote failures start life as [`provider::ProviderError`], which carries
//! the retry classification used by the adaptive retry wrapper. Conversion to
//! `AppError` happens at the data-access boundary, after fallbacks have been
//! tried.

/// Errors raised by external collaborators (exercise API, document store, auth)
pub mod provider;

use crate::constants::messages;
use provider::ProviderError;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Standard error codes used throughout the data layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Connectivity
    /// Device offline and nothing usable stored locally
    OfflineNoCache,

    // Remote service
    /// Retries exhausted on timeouts / network failures (cold start suspected)
    ServiceWakingUp,
    /// Remote returned 5xx or unparseable data
    ExternalServiceError,
    /// Remote rejected the request (4xx other than not-found)
    ExternalClientError,
    /// Requested record does not exist
    ResourceNotFound,

    // Authentication
    /// Auth provider rejected the operation
    AuthFailed,
    /// Local rate limiter rejected the attempt before any network call
    RateLimitExceeded,

    // Validation
    /// Field-level validation failed
    InvalidInput,

    // Local
    /// Local storage read/write failed
    StorageError,
    /// JSON encoding/decoding failed
    SerializationError,
    /// Configuration is missing or inconsistent
    ConfigInvalid,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Short developer-facing description of this error class
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::OfflineNoCache => "Device is offline and no local copy exists",
            Self::ServiceWakingUp => "Remote service did not respond in time",
            Self::ExternalServiceError => "Remote service returned an error",
            Self::ExternalClientError => "Remote service rejected the request",
            Self::ResourceNotFound => "Requested resource was not found",
            Self::AuthFailed => "Authentication failed",
            Self::RateLimitExceeded => "Too many attempts",
            Self::InvalidInput => "Input validation failed",
            Self::StorageError => "Local storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "Internal error",
        }
    }
}

/// Unified error type for the data layer
///
/// `Display` yields the user-facing message only; the error code and source
/// are available for logging.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable, user-facing message
    pub message: String,
    /// Structured details (remaining cooldown, offending field, ...)
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new error with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Offline with no local copy
    #[must_use]
    pub fn offline_no_cache(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::OfflineNoCache, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// Invalid input on a named field
    #[must_use]
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
            .with_details(serde_json::json!({ "field": field }))
    }

    /// Local rate limiter rejection
    #[must_use]
    pub fn rate_limited(remaining: Duration) -> Self {
        // Round up so "0 seconds" is never shown while still blocked
        let secs = remaining.as_millis().div_ceil(1_000);
        let secs = u64::try_from(secs).unwrap_or(u64::MAX);
        Self::new(ErrorCode::RateLimitExceeded, messages::rate_limited(secs))
            .with_details(serde_json::json!({ "remaining_secs": secs }))
    }

    /// Auth provider rejection with a localized message
    #[must_use]
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthFailed, message)
    }

    /// Local storage failure
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Serialization failure
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(messages::UNEXPECTED_ERROR).with_source(error)
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        let (code, message) = match error.root() {
            ProviderError::Timeout { .. }
            | ProviderError::NetworkError { .. }
            | ProviderError::Unavailable { .. } => {
                (ErrorCode::ServiceWakingUp, messages::SERVICE_WAKING_UP)
            }
            ProviderError::ApiError { status_code, .. } if *status_code >= 500 => {
                (ErrorCode::ExternalServiceError, messages::SERVER_ERROR)
            }
            ProviderError::ParseError { .. } => {
                (ErrorCode::ExternalServiceError, messages::SERVER_ERROR)
            }
            ProviderError::ApiError { .. } | ProviderError::Rejected { .. } => {
                (ErrorCode::ExternalClientError, messages::REQUEST_REJECTED)
            }
            ProviderError::NotFound { .. } => {
                (ErrorCode::ResourceNotFound, messages::RESOURCE_NOT_FOUND)
            }
            ProviderError::AuthenticationFailed { code, .. } => {
                (ErrorCode::AuthFailed, messages::auth_message(code))
            }
            ProviderError::RetriesExhausted { .. } => {
                (ErrorCode::InternalError, messages::UNEXPECTED_ERROR)
            }
        };
        Self::new(code, message).with_source(error)
    }
}
