// ABOUTME: Integration tests for the key-value store backends
// ABOUTME: Covers file persistence, corrupt and unreadable files, failed writes, and JSON helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use anyhow::Result;
use repsync::storage::{self, FileStore, KeyValueStore, MemoryStore};
use repsync_core::errors::ErrorCode;
use tempfile::TempDir;

#[tokio::test]
async fn test_file_store_persists_across_reopen() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("store.json");

    {
        let store = FileStore::open(&path).await?;
        store.set("a", "1".to_owned()).await?;
        store.set("b", "2".to_owned()).await?;
        store.remove("a").await?;
    }

    let reopened = FileStore::open(&path).await?;
    assert_eq!(reopened.path(), path.as_path());
    assert_eq!(reopened.get("a").await?, None);
    assert_eq!(reopened.get("b").await?, Some("2".to_owned()));
    assert_eq!(reopened.all_keys().await?, vec!["b".to_owned()]);
    assert!(!path.with_extension("json.tmp").exists());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_file_starts_empty_and_is_replaced() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    std::fs::write(&path, b"{\"half\": ")?;

    let store = FileStore::open(&path).await?;
    assert!(store.all_keys().await?.is_empty());

    store.set("k", "v".to_owned()).await?;
    let reopened = FileStore::open(&path).await?;
    assert_eq!(reopened.get("k").await?, Some("v".to_owned()));
    Ok(())
}

#[tokio::test]
async fn test_multi_remove() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    let store = FileStore::open(&path).await?;
    for key in ["x", "y", "z"] {
        store.set(key, key.to_owned()).await?;
    }

    store
        .multi_remove(&["x".to_owned(), "z".to_owned(), "missing".to_owned()])
        .await?;

    let reopened = FileStore::open(&path).await?;
    assert_eq!(reopened.all_keys().await?, vec!["y".to_owned()]);
    Ok(())
}

#[tokio::test]
async fn test_json_helpers() -> Result<()> {
    let store = MemoryStore::new();
    storage::set_json(&store, "list", &vec![1_u32, 2, 3]).await?;

    let list: Option<Vec<u32>> = storage::get_json(&store, "list").await?;
    assert_eq!(list, Some(vec![1, 2, 3]));

    let missing: Option<Vec<u32>> = storage::get_json(&store, "nothing").await?;
    assert!(missing.is_none());

    store.set("bad", "not json".to_owned()).await?;
    let error = storage::get_json::<Vec<u32>>(&store, "bad")
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::SerializationError);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_store_file_fails_open() -> Result<()> {
    let dir = TempDir::new()?;
    // A directory at the store path cannot be read as a file
    let path = dir.path().join("store.json");
    std::fs::create_dir(&path)?;

    let error = FileStore::open(&path).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::StorageError);
    assert!(path.is_dir());
    Ok(())
}

#[tokio::test]
async fn test_failed_write_leaves_store_unchanged() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    let store = FileStore::open(&path).await?;
    store.set("kept", "1".to_owned()).await?;

    // Block the temp file so every write fails
    let temp = path.with_extension("json.tmp");
    std::fs::create_dir(&temp)?;

    assert!(store.set("lost", "2".to_owned()).await.is_err());
    assert!(store.remove("kept").await.is_err());
    assert!(store.multi_remove(&["kept".to_owned()]).await.is_err());
    assert_eq!(store.get("lost").await?, None);
    assert_eq!(store.get("kept").await?, Some("1".to_owned()));

    std::fs::remove_dir(&temp)?;
    store.set("later", "3".to_owned()).await?;

    let reopened = FileStore::open(&path).await?;
    let mut keys = reopened.all_keys().await?;
    keys.sort();
    assert_eq!(keys, vec!["kept".to_owned(), "later".to_owned()]);
    Ok(())
}
