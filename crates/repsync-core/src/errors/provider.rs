// ABOUTME: Structured error types for external collaborator calls (exercise API, document store, auth)
// ABOUTME: Carries retry classification and sleep-signature detection for the adaptive retry wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// Failure of a call to an external collaborator
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The call did not complete within its timeout
    #[error("{provider} request timed out after {timeout_ms}ms")]
    Timeout {
        /// Provider name
        provider: String,
        /// Timeout that elapsed, in milliseconds
        timeout_ms: u64,
    },

    /// Connection-level failure (DNS, refused, reset, ...)
    #[error("{provider} network error: {message}")]
    NetworkError {
        /// Provider name
        provider: String,
        /// Transport error description
        message: String,
    },

    /// Non-success HTTP status
    #[error("{provider} API error ({status_code}): {message}")]
    ApiError {
        /// Provider name
        provider: String,
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
        /// Whether the retry wrapper may try again
        retryable: bool,
    },

    /// The requested record does not exist
    #[error("{resource_type} '{resource_id}' not found at {provider}")]
    NotFound {
        /// Provider name
        provider: String,
        /// Kind of record requested
        resource_type: String,
        /// Identifier requested
        resource_id: String,
    },

    /// Response could not be decoded
    #[error("{provider} returned unparseable data: {message}")]
    ParseError {
        /// Provider name
        provider: String,
        /// Decoder error
        message: String,
    },

    /// Backend reported itself temporarily unavailable
    #[error("{provider} unavailable ({code}): {message}")]
    Unavailable {
        /// Provider name
        provider: String,
        /// Provider classification code
        code: String,
        /// Provider message
        message: String,
    },

    /// Auth backend rejected the operation
    #[error("{provider} authentication failed ({code}): {message}")]
    AuthenticationFailed {
        /// Provider name
        provider: String,
        /// Provider classification code, e.g. `auth/wrong-password`
        code: String,
        /// Provider message
        message: String,
    },

    /// Backend rejected the operation for a non-transient reason
    #[error("{provider} rejected the request ({code}): {message}")]
    Rejected {
        /// Provider name
        provider: String,
        /// Provider classification code
        code: String,
        /// Provider message
        message: String,
    },

    /// Adaptive retry gave up
    #[error("{context} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Caller-supplied description of the operation
        context: String,
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        #[source]
        last_error: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Build an `ApiError` from a status code; 5xx responses are retryable
    #[must_use]
    pub fn api(provider: &str, status_code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.to_owned(),
            status_code,
            message: message.into(),
            retryable: status_code >= 500,
        }
    }

    /// Classify an error code reported by the auth / document backend
    #[must_use]
    pub fn from_provider_code(provider: &str, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let bare = code.strip_prefix("auth/").unwrap_or(code);
        match bare {
            "unavailable" | "deadline-exceeded" => Self::Unavailable {
                provider: provider.to_owned(),
                code: code.to_owned(),
                message,
            },
            "network-request-failed" => Self::NetworkError {
                provider: provider.to_owned(),
                message,
            },
            "not-found" => Self::NotFound {
                provider: provider.to_owned(),
                resource_type: "document".to_owned(),
                resource_id: message,
            },
            _ if code.starts_with("auth/") => Self::AuthenticationFailed {
                provider: provider.to_owned(),
                code: code.to_owned(),
                message,
            },
            _ => Self::Rejected {
                provider: provider.to_owned(),
                code: code.to_owned(),
                message,
            },
        }
    }

    /// Whether the adaptive retry wrapper should try again
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkError { .. } | Self::Unavailable { .. } => true,
            Self::ApiError { retryable, .. } => *retryable,
            Self::NotFound { .. }
            | Self::ParseError { .. }
            | Self::AuthenticationFailed { .. }
            | Self::Rejected { .. }
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Whether this failure looks like a cold-starting free-tier backend
    ///
    /// Sleep signatures: timeouts, generic network errors, 503/504 and
    /// backend-reported unavailability.
    #[must_use]
    pub fn is_sleep_signature(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkError { .. } | Self::Unavailable { .. } => true,
            Self::ApiError { status_code, .. } => matches!(status_code, 503 | 504),
            Self::RetriesExhausted { last_error, .. } => last_error.is_sleep_signature(),
            _ => false,
        }
    }

    /// Provider classification code, if the backend supplied one
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Unavailable { code, .. }
            | Self::AuthenticationFailed { code, .. }
            | Self::Rejected { code, .. } => Some(code),
            Self::NetworkError { .. } => Some("network-request-failed"),
            Self::RetriesExhausted { last_error, .. } => last_error.code(),
            _ => None,
        }
    }

    /// Innermost error, unwrapping `RetriesExhausted`
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::RetriesExhausted { last_error, .. } => last_error.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_signatures() {
        assert!(ProviderError::api("api", 503, "").is_sleep_signature());
        assert!(ProviderError::api("api", 504, "").is_sleep_signature());
        assert!(!ProviderError::api("api", 500, "").is_sleep_signature());
        assert!(!ProviderError::api("api", 404, "").is_sleep_signature());
        assert!(ProviderError::Timeout {
            provider: "api".to_owned(),
            timeout_ms: 1
        }
        .is_sleep_signature());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!ProviderError::api("api", 400, "").is_retryable());
        assert!(ProviderError::api("api", 502, "").is_retryable());
    }

    #[test]
    fn test_provider_code_classification() {
        assert!(matches!(
            ProviderError::from_provider_code("store", "unavailable", "down"),
            ProviderError::Unavailable { .. }
        ));
        assert!(matches!(
            ProviderError::from_provider_code("auth", "auth/network-request-failed", "x"),
            ProviderError::NetworkError { .. }
        ));
        assert!(matches!(
            ProviderError::from_provider_code("auth", "auth/wrong-password", "x"),
            ProviderError::AuthenticationFailed { .. }
        ));
        assert!(matches!(
            ProviderError::from_provider_code("store", "permission-denied", "x"),
            ProviderError::Rejected { .. }
        ));
    }

    #[test]
    fn test_root_unwraps_exhausted() {
        let error = ProviderError::RetriesExhausted {
            context: "ctx".to_owned(),
            attempts: 3,
            last_error: Box::new(ProviderError::api("api", 503, "")),
        };
        assert!(matches!(
            error.root(),
            ProviderError::ApiError {
                status_code: 503,
                ..
            }
        ));
        assert!(error.is_sleep_signature());
        assert!(!error.is_retryable());
    }
}
