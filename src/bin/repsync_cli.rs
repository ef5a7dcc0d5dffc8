// ABOUTME: RepSync CLI - query the exercise catalog through the offline-resilient data layer
// ABOUTME: Uses the file-backed store so cached results survive between invocations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Command-line access to the `RepSync` data layer.
//!
//! Usage:
//! ```bash
//! # Full catalog, or filtered by muscle / equipment
//! repsync-cli exercises
//! repsync-cli exercises --muscle chest
//!
//! # Case-insensitive search
//! repsync-cli search "press"
//!
//! # One exercise by id
//! repsync-cli exercise 0001
//!
//! # Serve from the local cache only
//! repsync-cli --offline exercises --equipment dumbbell
//!
//! # Drop cached entries (all, or those matching a substring)
//! repsync-cli cache clear
//! repsync-cli cache clear search
//!
//! # Service status and cache summary
//! repsync-cli status
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use repsync::config::{StorageBackend, SyncConfig};
use repsync::connectivity::NetworkState;
use repsync::context::{http_exercise_source, open_store, Collaborators, SyncContext};
use repsync::logging::LoggingConfig;
use repsync_providers::{InMemoryAuthProvider, InMemoryDocumentStore};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "repsync-cli",
    about = "RepSync exercise catalog CLI",
    long_about = "Query the exercise catalog through the RepSync cache, retry, and offline fallbacks."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Exercise API base URL override
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Treat the device as offline (cache only)
    #[arg(long, global = true)]
    offline: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List exercises
    Exercises {
        /// Only exercises targeting this muscle
        #[arg(long, conflicts_with = "equipment")]
        muscle: Option<String>,

        /// Only exercises using this equipment
        #[arg(long)]
        equipment: Option<String>,
    },

    /// Search exercises by name, muscle, or equipment
    Search {
        /// Search text
        query: String,
    },

    /// Show one exercise
    Exercise {
        /// Exercise id
        id: String,
    },

    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },

    /// Show service status and cache summary
    Status,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Remove cached entries
    Clear {
        /// Only remove keys containing this text
        matching: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    online: bool,
    service: repsync_providers::ServiceStatus,
    cached_catalog_size: Option<usize>,
    store_path: String,
    api_url: String,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = SyncConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.exercise_api.base_url = url;
    }
    config.storage.backend = StorageBackend::File;

    let store = open_store(&config.storage).await?;
    let collaborators = Collaborators::new(
        http_exercise_source(&config.exercise_api),
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(InMemoryAuthProvider::new()),
        store,
    );
    let store_path = config.storage.store_path();
    let context = SyncContext::new(config, collaborators);

    let network = if cli.offline {
        NetworkState::offline()
    } else {
        NetworkState::online()
    };
    let (_signal, receiver) = watch::channel(network);
    context.start(receiver).await;
    info!(offline = cli.offline, "RepSync CLI started");

    let exercises = context.exercises();
    match cli.command {
        Command::Exercises { muscle, equipment } => {
            let list = match (muscle, equipment) {
                (Some(muscle), _) => exercises.by_muscle(&muscle).await?,
                (None, Some(equipment)) => exercises.by_equipment(&equipment).await?,
                (None, None) => exercises.all_exercises().await?,
            };
            print_json(&list)?;
        }
        Command::Search { query } => print_json(&exercises.search(&query).await?)?,
        Command::Exercise { id } => print_json(&exercises.by_id(&id).await?)?,
        Command::Cache {
            action: CacheCommand::Clear { matching },
        } => {
            let removed = exercises.clear_cache(matching.as_deref()).await?;
            println!("Removed {removed} cached entries");
        }
        Command::Status => {
            let report = StatusReport {
                online: context.connectivity().is_online(),
                service: exercises.service_status(),
                cached_catalog_size: exercises.cached_catalog().await.map(|c| c.len()),
                store_path: store_path.display().to_string(),
                api_url: context.config().exercise_api.base_url.clone(),
            };
            print_json(&report)?;
        }
    }

    context.shutdown();
    Ok(())
}
