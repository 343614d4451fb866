//! In-memory training sink.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::feedback::TrainingExample;
use crate::domain::foundation::FeedbackId;
use crate::ports::{TrainingReceipt, TrainingSink, TrainingSinkError};

/// Collects submitted examples in memory.
///
/// Supports rejecting specific feedback ids, failing whole batches and
/// simulated latency.
#[derive(Debug, Default)]
pub struct InMemoryTrainingLog {
    examples: RwLock<Vec<TrainingExample>>,
    rejected: HashSet<FeedbackId>,
    fail: AtomicBool,
    delay: Duration,
    submissions: AtomicUsize,
}

impl InMemoryTrainingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Examples from these feedback ids are left out of every receipt.
    pub fn rejecting(mut self, ids: impl IntoIterator<Item = FeedbackId>) -> Self {
        self.rejected.extend(ids);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes subsequent submissions fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every accepted example, in submission order.
    pub async fn examples(&self) -> Vec<TrainingExample> {
        self.examples.read().await.clone()
    }

    /// Number of `submit` calls, failed ones included.
    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrainingSink for InMemoryTrainingLog {
    async fn submit(
        &self,
        examples: &[TrainingExample],
    ) -> Result<TrainingReceipt, TrainingSinkError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(TrainingSinkError::Rejected(
                "simulated training failure".to_string(),
            ));
        }

        let accepted: Vec<TrainingExample> = examples
            .iter()
            .filter(|e| !self.rejected.contains(e.feedback_id()))
            .cloned()
            .collect();
        let receipt = TrainingReceipt::all(&accepted);
        self.examples.write().await.extend(accepted);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::NewFeedback;
    use crate::domain::foundation::Timestamp;

    fn example(id: &str) -> TrainingExample {
        let item = NewFeedback::new("p", "r", "c")
            .with_id(id)
            .validate(Timestamp::now())
            .unwrap();
        TrainingExample::from(&item)
    }

    fn id(value: &str) -> FeedbackId {
        FeedbackId::new(value).unwrap()
    }

    #[tokio::test]
    async fn accepts_all_by_default() {
        let log = InMemoryTrainingLog::new();
        let receipt = log.submit(&[example("a"), example("b")]).await.unwrap();

        assert_eq!(receipt.accepted, vec![id("a"), id("b")]);
        assert_eq!(log.examples().await.len(), 2);
        assert_eq!(log.submission_count(), 1);
    }

    #[tokio::test]
    async fn rejected_ids_are_left_out() {
        let log = InMemoryTrainingLog::new().rejecting([id("b")]);
        let receipt = log.submit(&[example("a"), example("b")]).await.unwrap();

        assert_eq!(receipt.accepted, vec![id("a")]);
        assert_eq!(log.examples().await.len(), 1);
    }

    #[tokio::test]
    async fn failing_sink_stores_nothing() {
        let log = InMemoryTrainingLog::new();
        log.set_failing(true);

        assert!(log.submit(&[example("a")]).await.is_err());
        assert!(log.examples().await.is_empty());
        assert_eq!(log.submission_count(), 1);
    }
}
