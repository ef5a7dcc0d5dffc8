// ABOUTME: Shared HTTP client with connection pooling for the exercise catalog API
// ABOUTME: Per-request timeouts come from the adaptive retry plan, not from the client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use repsync_core::constants::exercise_api::CONNECT_TIMEOUT_SECS;
use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// Configured connect timeout for the shared client
static CONNECT_TIMEOUT: OnceLock<u64> = OnceLock::new();

/// Global shared HTTP client
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Initialize the shared HTTP client connect timeout
///
/// Must be called before the first request to take effect. If not called,
/// `CONNECT_TIMEOUT_SECS` is used.
pub fn initialize_shared_client(connect_timeout_secs: u64) {
    let _ = CONNECT_TIMEOUT.set(connect_timeout_secs);
}

/// Get the shared HTTP client
///
/// No overall request timeout is set here: the retry wrapper bounds every
/// attempt with a timeout picked from the service wake state (90 s cold start,
/// 15 s normal, 8 s on retries).
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let connect_timeout = CONNECT_TIMEOUT
            .get()
            .copied()
            .unwrap_or(CONNECT_TIMEOUT_SECS);

        ClientBuilder::new()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}
