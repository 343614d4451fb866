//! RetrainTrigger - Single-flight hand-off of pending feedback to training.
//!
//! A run snapshots the unapplied feedback, converts it to training examples,
//! submits them to the sink and marks the accepted subset applied. Only one
//! run is in progress at a time; a concurrent attempt returns
//! [`RetrainOutcome::Skipped`] without touching the store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::domain::feedback::TrainingExample;
use crate::domain::foundation::FeedbackId;
use crate::ports::{FeedbackStore, StorageError, TrainingSink, TrainingSinkError};

/// Default number of unapplied items that triggers a run.
pub const DEFAULT_FEEDBACK_THRESHOLD: usize = 10;

/// What a run attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrainOutcome {
    /// Another run held the in-progress flag.
    Skipped,
    /// Nothing was pending.
    NoOp,
    /// Examples were submitted; `applied` items were marked, `pending`
    /// items were not accepted and stay unapplied.
    Completed { applied: usize, pending: usize },
}

/// Errors from a run. The in-progress flag is released in every case.
#[derive(Debug, Error)]
pub enum RetrainError {
    /// The training hand-off failed; the batch stays unapplied.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<TrainingSinkError> for RetrainError {
    fn from(err: TrainingSinkError) -> Self {
        RetrainError::TrainingFailed(err.to_string())
    }
}

/// Clears the in-progress flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Threshold check plus single-flight training run.
pub struct RetrainTrigger {
    store: Arc<dyn FeedbackStore>,
    sink: Arc<dyn TrainingSink>,
    threshold: usize,
    running: AtomicBool,
}

impl RetrainTrigger {
    pub fn new(store: Arc<dyn FeedbackStore>, sink: Arc<dyn TrainingSink>) -> Self {
        Self {
            store,
            sink,
            threshold: DEFAULT_FEEDBACK_THRESHOLD,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// True while a run holds the in-progress flag.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// True when enough unapplied feedback has accumulated.
    pub async fn should_trigger(&self) -> Result<bool, StorageError> {
        Ok(self.store.unprocessed_count().await? >= self.threshold)
    }

    /// Attempts a run now.
    pub async fn run(&self) -> Result<RetrainOutcome, RetrainError> {
        let Some(_in_flight) = self.try_acquire() else {
            tracing::debug!("Retrain already in progress, skipping");
            return Ok(RetrainOutcome::Skipped);
        };

        let batch = self.store.unprocessed().await?;
        if batch.is_empty() {
            tracing::debug!("No pending feedback, nothing to train");
            return Ok(RetrainOutcome::NoOp);
        }

        let examples: Vec<TrainingExample> = batch.iter().map(TrainingExample::from).collect();
        tracing::info!(items = examples.len(), "Starting retrain run");

        let receipt = match self.sink.submit(&examples).await {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::error!(items = examples.len(), error = %err, "Training hand-off failed");
                return Err(err.into());
            }
        };

        // Only ids from this snapshot are marked, whatever the sink reports.
        let mut in_batch: HashSet<&FeedbackId> = batch.iter().map(|item| &item.id).collect();
        let accepted: Vec<FeedbackId> = receipt
            .accepted
            .into_iter()
            .filter(|id| in_batch.remove(id))
            .collect();

        let applied = self.store.mark_applied(&accepted).await?;
        let pending = batch.len().saturating_sub(accepted.len());

        tracing::info!(applied, pending, "Retrain run completed");
        Ok(RetrainOutcome::Completed { applied, pending })
    }

    /// Starts a background run when the threshold is met.
    ///
    /// Returns the task handle if a run was spawned.
    pub async fn spawn_if_due(
        self: &Arc<Self>,
    ) -> Result<Option<JoinHandle<Result<RetrainOutcome, RetrainError>>>, StorageError> {
        if !self.should_trigger().await? {
            return Ok(None);
        }

        let trigger = Arc::clone(self);
        Ok(Some(tokio::spawn(async move {
            let result = trigger.run().await;
            if let Err(err) = &result {
                tracing::error!(error = %err, "Background retrain failed");
            }
            result
        })))
    }

    fn try_acquire(&self) -> Option<InFlight<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.running))
    }
}
