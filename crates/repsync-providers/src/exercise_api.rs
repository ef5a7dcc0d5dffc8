// ABOUTME: Remote exercise catalog interface and its reqwest-backed HTTP implementation
// ABOUTME: Single filterable list endpoint with limit/offset paging plus an id lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::http_client::shared_client;
use async_trait::async_trait;
use repsync_core::constants::exercise_api::{DEFAULT_PAGE_SIZE, MAX_PAGES, PROVIDER_NAME};
use repsync_core::errors::provider::ProviderError;
use repsync_core::models::{ExerciseFilter, ExerciseRecord};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// One page of the catalog list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum records to return
    pub limit: u32,
    /// Records to skip
    pub offset: u32,
}

impl PageRequest {
    /// First page with the given size
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }

    /// The page following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

/// Remote exercise catalog
///
/// The catalog has no free-text search; callers filter client-side.
#[async_trait]
pub trait ExerciseSource: Send + Sync {
    /// Fetch one page of exercises matching `filter`
    async fn list(
        &self,
        filter: &ExerciseFilter,
        page: PageRequest,
    ) -> Result<Vec<ExerciseRecord>, ProviderError>;

    /// Fetch a single exercise
    async fn get(&self, id: &str) -> Result<ExerciseRecord, ProviderError>;
}

/// Fetch every page of exercises matching `filter`
///
/// Stops at the first short page or after `MAX_PAGES` pages.
///
/// # Errors
///
/// Returns the first page error encountered.
pub async fn list_all(
    source: &dyn ExerciseSource,
    filter: &ExerciseFilter,
    page_size: u32,
) -> Result<Vec<ExerciseRecord>, ProviderError> {
    let page_size = page_size.max(1);
    let mut page = PageRequest::first(page_size);
    let mut records = Vec::new();

    for _ in 0..MAX_PAGES {
        let batch = source.list(filter, page).await?;
        let fetched = batch.len();
        records.extend(batch);
        if fetched < page_size as usize {
            break;
        }
        page = page.next();
    }

    debug!(count = records.len(), ?filter, "Fetched exercise catalog pages");
    Ok(records)
}

/// List responses are either a bare array or wrapped in an envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<ExerciseRecord>),
    Data { data: Vec<ExerciseRecord> },
    Exercises { exercises: Vec<ExerciseRecord> },
}

impl ListResponse {
    fn into_records(self) -> Vec<ExerciseRecord> {
        match self {
            Self::Bare(records)
            | Self::Data { data: records }
            | Self::Exercises { exercises: records } => records,
        }
    }
}

/// HTTP client for the exercise catalog REST API
#[derive(Debug, Clone)]
pub struct HttpExerciseApi {
    base_url: String,
    client: Client,
    default_page_size: u32,
}

impl HttpExerciseApi {
    /// Create a client for the API rooted at `base_url`, using the shared HTTP client
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, shared_client().clone())
    }

    /// Create a client with an explicit `reqwest::Client`
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            client,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page size used when the caller does not pick one
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    fn list_url(&self, filter: &ExerciseFilter, page: PageRequest) -> String {
        let mut url = format!(
            "{}/exercises?limit={}&offset={}",
            self.base_url, page.limit, page.offset
        );
        if let Some(muscle) = &filter.muscle {
            url.push_str("&muscle=");
            url.push_str(&urlencoding::encode(muscle));
        }
        if let Some(equipment) = &filter.equipment {
            url.push_str("&equipment=");
            url.push_str(&urlencoding::encode(equipment));
        }
        url
    }

    async fn send(&self, url: &str, resource_id: &str) -> Result<reqwest::Response, ProviderError> {
        debug!(url, "Exercise API request");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound {
                provider: PROVIDER_NAME.to_owned(),
                resource_type: "exercise".to_owned(),
                resource_id: resource_id.to_owned(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::api(PROVIDER_NAME, status.as_u16(), body))
    }
}

#[async_trait]
impl ExerciseSource for HttpExerciseApi {
    async fn list(
        &self,
        filter: &ExerciseFilter,
        page: PageRequest,
    ) -> Result<Vec<ExerciseRecord>, ProviderError> {
        let url = self.list_url(filter, page);
        let response = self.send(&url, "list").await?;
        let parsed: ListResponse = response.json().await.map_err(|e| parse_error(&e))?;
        Ok(parsed.into_records())
    }

    async fn get(&self, id: &str) -> Result<ExerciseRecord, ProviderError> {
        let url = format!("{}/exercises/{}", self.base_url, urlencoding::encode(id));
        let response = self.send(&url, id).await?;
        response.json().await.map_err(|e| parse_error(&e))
    }
}

fn classify_transport_error(error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout {
            provider: PROVIDER_NAME.to_owned(),
            timeout_ms: 0,
        }
    } else {
        ProviderError::NetworkError {
            provider: PROVIDER_NAME.to_owned(),
            message: error.to_string(),
        }
    }
}

fn parse_error(error: &reqwest::Error) -> ProviderError {
    ProviderError::ParseError {
        provider: PROVIDER_NAME.to_owned(),
        message: error.to_string(),
    }
}
