// ABOUTME: Core types and constants for the RepSync offline-resilient fitness data layer
// ABOUTME: Foundation crate with error handling, domain models, clock abstraction, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `RepSync` Core
//!
//! Foundation crate providing shared types and constants for the `RepSync`
//! data layer. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ProviderError`
//! - **constants**: TTLs, retry timings, rate limits, storage keys, and user-facing messages
//! - **models**: Exercise, preference, and routine documents
//! - **clock**: Injectable wall clock so time-driven logic can be tested without sleeping

/// Injectable wall clock (`SystemClock` for production, `ManualClock` for tests)
pub mod clock;

/// Application constants organized by domain
pub mod constants;

/// Unified error handling system with standard error codes
pub mod errors;

/// Core data models (exercises, preferences, routines)
pub mod models;
