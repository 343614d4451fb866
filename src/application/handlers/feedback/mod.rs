//! Feedback handlers - Corrections in, training runs out.

mod retrain;
mod retrain_scheduler;
mod submit_feedback;

pub use retrain::{RetrainError, RetrainOutcome, RetrainTrigger, DEFAULT_FEEDBACK_THRESHOLD};
pub use retrain_scheduler::{RetrainScheduler, SchedulerHandle, DEFAULT_RETRAIN_INTERVAL};
pub use submit_feedback::{
    SubmitFeedbackCommand, SubmitFeedbackError, SubmitFeedbackHandler, SubmitFeedbackResult,
};
