//! In-memory feedback store.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::feedback::{FeedbackItem, FeedbackStoreState};
use crate::domain::foundation::{FeedbackId, Timestamp};
use crate::ports::{FeedbackStore, StorageError};

/// Feedback log held in memory.
///
/// Mutations work on a copy of the state and commit it only when the
/// simulated write succeeds, so the failure injection mirrors the file store.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    state: RwLock<FeedbackStoreState>,
    fail_writes: AtomicBool,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing state.
    pub fn with_state(state: FeedbackStoreState) -> Self {
        Self {
            state: RwLock::new(state),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes subsequent writes fail with an IO error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::io("simulated write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn append(&self, item: FeedbackItem) -> Result<usize, StorageError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let total = next.push(item)?;
        self.check_write()?;
        *state = next;
        Ok(total)
    }

    async fn unprocessed(&self) -> Result<Vec<FeedbackItem>, StorageError> {
        Ok(self.state.read().await.unprocessed())
    }

    async fn unprocessed_count(&self) -> Result<usize, StorageError> {
        Ok(self.state.read().await.unprocessed_count())
    }

    async fn mark_applied(&self, ids: &[FeedbackId]) -> Result<usize, StorageError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let changed = next.mark_applied(ids, Timestamp::now());
        if changed > 0 {
            self.check_write()?;
            *state = next;
        }
        Ok(changed)
    }

    async fn snapshot(&self) -> Result<FeedbackStoreState, StorageError> {
        Ok(self.state.read().await.clone())
    }
}
