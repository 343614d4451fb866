//! Feedback Store Port - Append-only correction log with apply-once flags.
//!
//! Every mutating call is a read-modify-write of the whole state and
//! implementations serialize them process-wide. A failed write leaves the
//! previously persisted state visible.

use async_trait::async_trait;

use super::StorageError;
use crate::domain::feedback::{FeedbackItem, FeedbackStoreState};
use crate::domain::foundation::FeedbackId;

/// Port for the feedback log.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Persists a validated item and returns the new total count.
    ///
    /// # Errors
    ///
    /// `StorageError::Conflict` if an item with the same id exists.
    async fn append(&self, item: FeedbackItem) -> Result<usize, StorageError>;

    /// Items not yet applied, in insertion order.
    async fn unprocessed(&self) -> Result<Vec<FeedbackItem>, StorageError>;

    /// Live count of unapplied items.
    async fn unprocessed_count(&self) -> Result<usize, StorageError>;

    /// Marks items applied and stamps the training date. Idempotent; returns
    /// how many items changed.
    async fn mark_applied(&self, ids: &[FeedbackId]) -> Result<usize, StorageError>;

    /// The whole persisted state.
    async fn snapshot(&self) -> Result<FeedbackStoreState, StorageError>;
}
