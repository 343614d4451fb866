//! SubmitFeedbackHandler - Command handler for human corrections.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::retrain::RetrainTrigger;
use crate::domain::conversation::FaqCache;
use crate::domain::feedback::NewFeedback;
use crate::domain::foundation::{FeedbackId, Timestamp, ValidationError};
use crate::ports::{FeedbackStore, StorageError};

/// Command to record a corrected reply.
#[derive(Debug, Clone)]
pub struct SubmitFeedbackCommand {
    pub feedback: NewFeedback,
}

/// Result of a stored correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFeedbackResult {
    pub id: FeedbackId,
    /// Total items in the log after the append.
    pub total: usize,
    /// Whether the append pushed the backlog over the threshold and a
    /// background retrain was started.
    pub retrain_started: bool,
}

/// Errors that can occur when submitting feedback.
#[derive(Debug, Clone, Error)]
pub enum SubmitFeedbackError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Handler for feedback submissions.
pub struct SubmitFeedbackHandler {
    store: Arc<dyn FeedbackStore>,
    faq: Arc<RwLock<FaqCache>>,
    trigger: Arc<RetrainTrigger>,
}

impl SubmitFeedbackHandler {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        faq: Arc<RwLock<FaqCache>>,
        trigger: Arc<RetrainTrigger>,
    ) -> Self {
        Self {
            store,
            faq,
            trigger,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitFeedbackCommand,
    ) -> Result<SubmitFeedbackResult, SubmitFeedbackError> {
        // 1. Validate before anything is persisted
        let item = cmd.feedback.validate(Timestamp::now())?;
        let id = item.id.clone();
        let question = item.original_prompt.clone();
        let answer = item.corrected_response.clone();

        // 2. Persist
        let total = self.store.append(item).await?;
        tracing::info!(feedback_id = %id, total, "Feedback recorded");

        // 3. Remember question/answer pairs for the FAQ shortcut
        if self.faq.write().await.remember(&question, &answer) {
            tracing::debug!(feedback_id = %id, "Correction cached as FAQ answer");
        }

        // 4. Start a retrain if the backlog is large enough
        let retrain_started = match self.trigger.spawn_if_due().await {
            Ok(handle) => handle.is_some(),
            Err(err) => {
                tracing::warn!(error = %err, "Threshold check after feedback failed");
                false
            }
        };

        Ok(SubmitFeedbackResult {
            id,
            total,
            retrain_started,
        })
    }
}
