//! Training Sink Port - Hand-off of training examples to the update job.
//!
//! The sink stands in for whatever consumes corrected examples (an embedding
//! store, a fine-tuning queue). A failed submission leaves the source
//! feedback unapplied.

use async_trait::async_trait;

use super::StorageError;
use crate::domain::feedback::TrainingExample;
use crate::domain::foundation::FeedbackId;

/// Which examples a sink accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingReceipt {
    /// Feedback ids of the accepted examples.
    pub accepted: Vec<FeedbackId>,
}

impl TrainingReceipt {
    /// A receipt accepting every example.
    pub fn all(examples: &[TrainingExample]) -> Self {
        Self {
            accepted: examples.iter().map(|e| e.feedback_id().clone()).collect(),
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

/// Errors from a training hand-off.
#[derive(Debug, thiserror::Error)]
pub enum TrainingSinkError {
    #[error("training batch rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Port for consuming training examples.
#[async_trait]
pub trait TrainingSink: Send + Sync {
    /// Submits a batch. The receipt may accept a subset.
    async fn submit(
        &self,
        examples: &[TrainingExample],
    ) -> Result<TrainingReceipt, TrainingSinkError>;
}
