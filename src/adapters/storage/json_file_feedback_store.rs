//! JSON file Feedback Store Adapter
//!
//! Keeps the whole feedback log in one JSON document:
//! `{feedbackItems, lastTrainingDate, version}`. Every mutation re-reads the
//! document, applies the change and rewrites it atomically while holding a
//! process-wide write lock. There is no in-memory cache, so a failed write
//! is never visible to later reads.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::json_document::{read_or_default, write_atomic};
use crate::domain::feedback::{FeedbackItem, FeedbackStoreState};
use crate::domain::foundation::{FeedbackId, Timestamp};
use crate::ports::{FeedbackStore, StorageError};

/// File-backed feedback log.
#[derive(Debug)]
pub struct JsonFileFeedbackStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileFeedbackStore {
    /// Creates a store over `path` without touching the filesystem.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store and writes an empty document if none exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self::new(path);
        let exists = tokio::fs::try_exists(&store.path)
            .await
            .map_err(StorageError::from)?;
        if !exists {
            write_atomic(&store.path, &FeedbackStoreState::new()).await?;
            tracing::info!(path = %store.path.display(), "Created feedback store");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<FeedbackStoreState, StorageError> {
        read_or_default(&self.path).await
    }
}

#[async_trait]
impl FeedbackStore for JsonFileFeedbackStore {
    async fn append(&self, item: FeedbackItem) -> Result<usize, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.load().await?;
        let id = item.id.clone();
        let total = state.push(item)?;
        write_atomic(&self.path, &state).await?;

        tracing::debug!(feedback_id = %id, total, "Feedback appended");
        Ok(total)
    }

    async fn unprocessed(&self) -> Result<Vec<FeedbackItem>, StorageError> {
        Ok(self.load().await?.unprocessed())
    }

    async fn unprocessed_count(&self) -> Result<usize, StorageError> {
        Ok(self.load().await?.unprocessed_count())
    }

    async fn mark_applied(&self, ids: &[FeedbackId]) -> Result<usize, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.load().await?;
        let changed = state.mark_applied(ids, Timestamp::now());
        if changed > 0 {
            write_atomic(&self.path, &state).await?;
        }

        tracing::debug!(requested = ids.len(), changed, "Feedback marked applied");
        Ok(changed)
    }

    async fn snapshot(&self) -> Result<FeedbackStoreState, StorageError> {
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::NewFeedback;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn item(id: &str) -> FeedbackItem {
        NewFeedback::new("Do you ship abroad?", "No.", "Yes, to over 40 countries!")
            .with_id(id)
            .validate(Timestamp::now())
            .unwrap()
    }

    fn id(value: &str) -> FeedbackId {
        FeedbackId::new(value).unwrap()
    }

    #[tokio::test]
    async fn open_creates_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("feedback.json");
        JsonFileFeedbackStore::open(&path).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["feedbackItems"], serde_json::json!([]));
        assert!(value["lastTrainingDate"].is_null());
        assert_eq!(value["version"], 1);
    }

    #[tokio::test]
    async fn open_propagates_stat_errors() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        tokio::fs::write(&blocker, "keep me").await.unwrap();

        let result = JsonFileFeedbackStore::open(blocker.join("feedback.json")).await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        let untouched = tokio::fs::read_to_string(&blocker).await.unwrap();
        assert_eq!(untouched, "keep me");
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.json");

        let store = JsonFileFeedbackStore::open(&path).await.unwrap();
        assert_eq!(store.append(item("a")).await.unwrap(), 1);
        assert_eq!(store.append(item("b")).await.unwrap(), 2);
        store.mark_applied(&[id("a")]).await.unwrap();
        drop(store);

        let reopened = JsonFileFeedbackStore::open(&path).await.unwrap();
        let snapshot = reopened.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(reopened.unprocessed_count().await.unwrap(), 1);
        assert!(snapshot.last_training_date().is_some());
    }

    #[tokio::test]
    async fn duplicate_id_conflicts_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileFeedbackStore::open(dir.path().join("f.json")).await.unwrap();
        store.append(item("a")).await.unwrap();

        let err = store.append(item("a")).await.unwrap_err();
        assert_eq!(err, StorageError::Conflict(id("a")));
        assert_eq!(store.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_applied_twice_leaves_file_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.json");
        let store = JsonFileFeedbackStore::open(&path).await.unwrap();
        store.append(item("a")).await.unwrap();

        assert_eq!(store.mark_applied(&[id("a")]).await.unwrap(), 1);
        let first = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(store.mark_applied(&[id("a")]).await.unwrap(), 0);
        let second = tokio::fs::read_to_string(&path).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            JsonFileFeedbackStore::open(dir.path().join("f.json"))
                .await
                .unwrap(),
        );

        let mut tasks = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.append(item(&format!("fb-{}", i))).await.unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.unprocessed_count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn unreadable_document_propagates_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.json");
        tokio::fs::write(&path, "garbage").await.unwrap();
        let store = JsonFileFeedbackStore::new(&path);

        assert!(matches!(
            store.append(item("a")).await,
            Err(StorageError::Serialization(_))
        ));
        assert!(store.unprocessed().await.is_err());
    }

    #[tokio::test]
    async fn reads_document_written_by_other_tools() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.json");
        tokio::fs::write(
            &path,
            r#"{
              "feedbackItems": [
                {"id": "1712345678901", "originalPrompt": "p", "originalResponse": "r",
                 "correctedResponse": "c", "context": {}, "timestamp": "2024-04-05T10:00:00.000Z",
                 "applied": false}
              ],
              "lastTrainingDate": null,
              "version": 1
            }"#,
        )
        .await
        .unwrap();

        let store = JsonFileFeedbackStore::new(&path);
        let pending = store.unprocessed().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_str(), "1712345678901");
    }
}
