// ABOUTME: Rate limit defaults for authentication entry points
// ABOUTME: Soft cooldown after a few attempts, hard block at the maximum per window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Login attempts allowed per window
pub const LOGIN_MAX_ATTEMPTS: u32 = 8;

/// Login window (3 minutes)
pub const LOGIN_WINDOW_SECS: u64 = 180;

/// Registration attempts allowed per window
pub const REGISTER_MAX_ATTEMPTS: u32 = 5;

/// Registration window (5 minutes)
pub const REGISTER_WINDOW_SECS: u64 = 300;

/// Password reset attempts allowed per window
pub const PASSWORD_RESET_MAX_ATTEMPTS: u32 = 3;

/// Password reset window (5 minutes)
pub const PASSWORD_RESET_WINDOW_SECS: u64 = 300;

/// Attempt count at which the short cooldown kicks in
pub const SOFT_THRESHOLD: u32 = 3;

/// Short cooldown measured from the first attempt in the window
pub const SOFT_COOLDOWN_SECS: u64 = 30;

/// Table size above which stale records are pruned
pub const CLEANUP_THRESHOLD: usize = 1_000;

/// Key prefixes for the auth flows
pub const LOGIN_KEY_PREFIX: &str = "login_";
/// Registration key prefix
pub const REGISTER_KEY_PREFIX: &str = "register_";
/// Password reset key prefix
pub const PASSWORD_RESET_KEY_PREFIX: &str = "reset_";
