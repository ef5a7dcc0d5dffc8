// ABOUTME: External collaborator interfaces for the RepSync data layer plus adaptive retry
// ABOUTME: Exercise catalog API, document store, auth backend, wake detector, and retry executor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Remote collaborators and the resilience primitives wrapped around them.
//!
//! Each collaborator is consumed through a narrow `async_trait` interface so
//! the data layer can be exercised against in-memory stand-ins. Only the
//! exercise catalog ships with a real (HTTP) implementation.

/// Authentication backend interface
pub mod auth;
/// Remote document store interface
pub mod document_store;
/// Exercise catalog interface and HTTP client
pub mod exercise_api;
/// Shared HTTP client for catalog API calls
pub mod http_client;
/// Adaptive retry planner and executor
pub mod retry;
/// Service wake detector
pub mod service_status;

pub use auth::{AuthProvider, AuthUser, InMemoryAuthProvider};
pub use document_store::{DocumentStore, InMemoryDocumentStore};
pub use exercise_api::{list_all, ExerciseSource, HttpExerciseApi, PageRequest};
pub use http_client::{initialize_shared_client, shared_client};
pub use repsync_core::errors::provider::ProviderError;
pub use retry::{next_attempt, AttemptPlan, AttemptState, RetryExecutor, RetryPolicy};
pub use service_status::{ServiceStatus, ServiceWakeDetector, WakeDetectorConfig};
