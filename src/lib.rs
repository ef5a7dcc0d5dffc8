// ABOUTME: Main library entry point for the RepSync offline-resilient data layer
// ABOUTME: Wires caching, connectivity, adaptive retry, preference sync, routines, and auth gating
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `RepSync`
//!
//! Offline-resilient data access and sync layer for a mobile fitness app.
//! The app talks to this crate; the crate decides whether a request is served
//! from the local store, the remote exercise catalog, or the remote document
//! store, and keeps the local and remote preference copies reconciled.
//!
//! ## Architecture
//!
//! - **cache**: persistent key-value cache with per-resource TTL classes
//! - **connectivity**: online/offline state, reconnect cycling, debounced resync
//! - **exercises**: stale-while-revalidate catalog queries with offline fallbacks
//! - **preferences**: local-first preference writes with last-write-wins resync
//! - **routines**: per-user routine storage, legacy migration, duplicate cleanup
//! - **auth** / **`rate_limiting`**: validated, locally throttled sign-in flows
//! - **context**: wires everything from [`config::SyncConfig`]
//!
//! Remote calls go through [`repsync_providers::RetryExecutor`], which picks
//! timeouts from the shared [`repsync_providers::ServiceWakeDetector`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use repsync::config::SyncConfig;
//! use repsync::context::{open_store, http_exercise_source, Collaborators, SyncContext};
//! use repsync::connectivity::NetworkState;
//! use repsync_providers::{InMemoryAuthProvider, InMemoryDocumentStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> repsync::errors::AppResult<()> {
//!     let config = SyncConfig::from_env()?;
//!     let store = open_store(&config.storage).await?;
//!     let collaborators = Collaborators::new(
//!         http_exercise_source(&config.exercise_api),
//!         Arc::new(InMemoryDocumentStore::new()),
//!         Arc::new(InMemoryAuthProvider::new()),
//!         store,
//!     );
//!     let context = SyncContext::new(config, collaborators);
//!     let (_signal, receiver) = tokio::sync::watch::channel(NetworkState::online());
//!     context.start(receiver).await;
//!
//!     let chest = context.exercises().by_muscle("chest").await?;
//!     println!("{} chest exercises", chest.len());
//!     context.shutdown();
//!     Ok(())
//! }
//! ```

/// Authentication gateway with validation and rate limiting
pub mod auth;

/// Persistent cache with typed keys and TTL classes
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Online/offline tracking and reconnect handling
pub mod connectivity;

/// Dependency-injection root
pub mod context;

/// Exercise catalog queries
pub mod exercises;

/// Structured logging setup
pub mod logging;

/// Preference persistence and reconciliation
pub mod preferences;

/// Auth attempt rate limiting
pub mod rate_limiting;

/// Routine storage, migration, and generation
pub mod routines;

/// Local key-value storage backends
pub mod storage;

pub use repsync_core::{clock, constants, errors, models};
