//! JSON file training sink.
//!
//! Appends accepted examples to a JSON array on disk. Downstream jobs read
//! the file; embeddings are left null.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::json_document::{read_or_default, write_atomic};
use crate::domain::feedback::TrainingExample;
use crate::ports::{StorageError, TrainingReceipt, TrainingSink, TrainingSinkError};

/// File-backed training example log.
#[derive(Debug)]
pub struct JsonFileTrainingLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileTrainingLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every example written so far.
    pub async fn examples(&self) -> Result<Vec<TrainingExample>, StorageError> {
        read_or_default(&self.path).await
    }
}

#[async_trait]
impl TrainingSink for JsonFileTrainingLog {
    async fn submit(
        &self,
        examples: &[TrainingExample],
    ) -> Result<TrainingReceipt, TrainingSinkError> {
        let _guard = self.write_lock.lock().await;

        let mut all: Vec<TrainingExample> = read_or_default(&self.path).await?;
        all.extend_from_slice(examples);
        write_atomic(&self.path, &all).await?;

        tracing::info!(
            path = %self.path.display(),
            added = examples.len(),
            total = all.len(),
            "Training examples written"
        );
        Ok(TrainingReceipt::all(examples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::NewFeedback;
    use crate::domain::foundation::Timestamp;
    use tempfile::TempDir;

    fn example(id: &str) -> TrainingExample {
        let item = NewFeedback::new("p", "r", "c")
            .with_id(id)
            .validate(Timestamp::now())
            .unwrap();
        TrainingExample::from(&item)
    }

    #[tokio::test]
    async fn batches_accumulate_in_one_array() {
        let dir = TempDir::new().unwrap();
        let log = JsonFileTrainingLog::new(dir.path().join("training.json"));

        log.submit(&[example("a")]).await.unwrap();
        let receipt = log.submit(&[example("b"), example("c")]).await.unwrap();

        assert_eq!(receipt.accepted_count(), 2);
        let stored = log.examples().await.unwrap();
        let ids: Vec<_> = stored.iter().map(|e| e.feedback_id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn corrupt_log_fails_the_submission() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("training.json");
        tokio::fs::write(&path, "[{").await.unwrap();

        let log = JsonFileTrainingLog::new(&path);
        assert!(matches!(
            log.submit(&[example("a")]).await,
            Err(TrainingSinkError::Storage(StorageError::Serialization(_)))
        ));
    }
}
