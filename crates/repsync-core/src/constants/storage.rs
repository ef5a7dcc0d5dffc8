// ABOUTME: Storage keys for the local key-value store and remote document collections
// ABOUTME: Per-user namespaces are built by appending the user id to these prefixes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Local preference document key prefix (`user_preferences:<userId>`)
pub const PREFERENCES_KEY_PREFIX: &str = "user_preferences:";

/// Remote collection holding preference documents keyed by user id
pub const PREFERENCES_COLLECTION: &str = "userPreferences";

/// Legacy shared routine list written by older app versions
pub const LEGACY_ROUTINES_KEY: &str = "workout_routines";

/// Per-user routine list key prefix (`routines:<userId>`)
pub const ROUTINES_KEY_PREFIX: &str = "routines:";

/// Per-user migration flag key prefix (`routines_migrated:<userId>`)
pub const ROUTINES_MIGRATED_KEY_PREFIX: &str = "routines_migrated:";

/// Default file name of the file-backed key-value store
pub const STORE_FILE_NAME: &str = "repsync-store.json";

/// Directory created under the platform data dir
pub const DATA_DIR_NAME: &str = "repsync";
