// ABOUTME: Aggregate RepSync configuration loaded from the environment, plus storage settings
// ABOUTME: Validates cross-field consistency before the SyncContext is built
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::cache::{CacheTtlConfig, RateLimitConfig};
use super::network::{ConnectivityConfig, ExerciseApiConfig, RetryConfig};
use repsync_core::constants::storage::{DATA_DIR_NAME, STORE_FILE_NAME};
use repsync_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Where persisted state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory only
    Memory,
    /// Single JSON file on disk
    File,
}

impl StorageBackend {
    /// Parse from a config string, defaulting to `File`
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "memory" | "mem" => Self::Memory,
            _ => Self::File,
        }
    }
}

/// Local persisted store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind
    pub backend: StorageBackend,
    /// Directory holding the store file
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Load storage configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            backend: env::var("REPSYNC_STORAGE")
                .map(|value| StorageBackend::from_str_or_default(&value))
                .unwrap_or(StorageBackend::File),
            data_dir: env::var("REPSYNC_DATA_DIR")
                .map_or_else(|_| default_data_dir(), PathBuf::from),
        }
    }

    /// Path of the JSON store file
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(format!(".{DATA_DIR_NAME}")),
        |dir| dir.join(DATA_DIR_NAME),
    )
}

/// Complete data layer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Cache TTL classes
    pub cache: CacheTtlConfig,
    /// Auth rate limits
    pub rate_limits: RateLimitConfig,
    /// Adaptive retry
    pub retry: RetryConfig,
    /// Connectivity monitor timings
    pub connectivity: ConnectivityConfig,
    /// Exercise catalog endpoint
    pub exercise_api: ExerciseApiConfig,
    /// Local store
    pub storage: StorageConfig,
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the loaded values fail [`SyncConfig::validate`]
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            cache: CacheTtlConfig::from_env(),
            rate_limits: RateLimitConfig::from_env(),
            retry: RetryConfig::from_env(),
            connectivity: ConnectivityConfig::from_env(),
            exercise_api: ExerciseApiConfig::from_env(),
            storage: StorageConfig::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` describing the first inconsistent value
    pub fn validate(&self) -> AppResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(AppError::config("REPSYNC_RETRY_MAX_ATTEMPTS must be at least 1"));
        }
        if self.retry.backoff_multiplier == 0 {
            return Err(AppError::config(
                "REPSYNC_RETRY_BACKOFF_MULTIPLIER must be at least 1",
            ));
        }
        if self.retry.normal_timeout_secs == 0 || self.retry.retry_timeout_secs == 0 {
            return Err(AppError::config("Retry timeouts must be non-zero"));
        }
        if self.retry.wake_timeout_secs < self.retry.normal_timeout_secs {
            return Err(AppError::config(
                "REPSYNC_RETRY_WAKE_TIMEOUT_SECS must not be shorter than the normal timeout",
            ));
        }

        let ttl = &self.cache;
        if [ttl.catalog_secs, ttl.filtered_secs, ttl.search_secs, ttl.exercise_secs].contains(&0) {
            return Err(AppError::config("Cache TTLs must be non-zero"));
        }

        let limits = &self.rate_limits;
        if [
            limits.login_max_attempts,
            limits.register_max_attempts,
            limits.reset_max_attempts,
            limits.soft_threshold,
        ]
        .contains(&0)
        {
            return Err(AppError::config("Rate limit attempt counts must be non-zero"));
        }
        if limits.soft_cooldown_secs > limits.login_window_secs {
            warn!(
                soft_cooldown_secs = limits.soft_cooldown_secs,
                login_window_secs = limits.login_window_secs,
                "Soft cooldown is longer than the login window"
            );
        }

        if self.exercise_api.page_size == 0 {
            return Err(AppError::config("REPSYNC_EXERCISE_API_PAGE_SIZE must be at least 1"));
        }
        let url = self.exercise_api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::config(format!(
                "REPSYNC_EXERCISE_API_URL must be an http(s) URL, got '{url}'"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SyncConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = SyncConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!(StorageBackend::from_str_or_default("Memory"), StorageBackend::Memory);
        assert_eq!(StorageBackend::from_str_or_default("file"), StorageBackend::File);
        assert_eq!(StorageBackend::from_str_or_default("bogus"), StorageBackend::File);
    }
}
