//! RetrainScheduler - Background timer for retrain runs.
//!
//! Every tick attempts a run regardless of the threshold; the single-flight
//! flag in [`RetrainTrigger`] keeps ticks and feedback-triggered runs from
//! overlapping.
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a watch channel. A run already in progress finishes
//! before the loop observes the signal, so a batch is never left half-applied.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::retrain::{RetrainOutcome, RetrainTrigger};

/// Default period between timer runs: once a day.
pub const DEFAULT_RETRAIN_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Periodic driver for a [`RetrainTrigger`].
pub struct RetrainScheduler {
    trigger: Arc<RetrainTrigger>,
    interval: Duration,
    check_on_start: bool,
}

impl RetrainScheduler {
    pub fn new(trigger: Arc<RetrainTrigger>) -> Self {
        Self {
            trigger,
            interval: DEFAULT_RETRAIN_INTERVAL,
            check_on_start: true,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Whether to run once at startup when the threshold is already met.
    pub fn with_check_on_start(mut self, check_on_start: bool) -> Self {
        self.check_on_start = check_on_start;
        self
    }

    /// Spawns the timer loop.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { self.run(shutdown_rx).await });
        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Runs the timer loop until the shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Retrain scheduler started");

        if self.check_on_start {
            match self.trigger.should_trigger().await {
                Ok(true) => self.attempt("startup").await,
                Ok(false) => {}
                Err(err) => tracing::warn!(error = %err, "Startup threshold check failed"),
            }
        }

        let mut interval = time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Retrain scheduler stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.attempt("timer").await;
                }
            }
        }
    }

    async fn attempt(&self, source: &'static str) {
        match self.trigger.run().await {
            Ok(RetrainOutcome::Completed { applied, pending }) => {
                tracing::info!(source, applied, pending, "Scheduled retrain completed");
            }
            Ok(outcome) => tracing::debug!(source, outcome = ?outcome, "Scheduled retrain attempt"),
            Err(err) => tracing::error!(source, error = %err, "Scheduled retrain failed"),
        }
    }
}

/// Handle to a running scheduler.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals shutdown and waits for the loop to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "Retrain scheduler task ended abnormally");
        }
    }
}
