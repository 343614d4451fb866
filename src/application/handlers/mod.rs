//! Application handlers.
//!
//! Command handlers and background services that orchestrate domain
//! operations across ports.

pub mod feedback;
pub mod reply;

pub use feedback::{
    RetrainError, RetrainOutcome, RetrainScheduler, RetrainTrigger, SchedulerHandle,
    SubmitFeedbackCommand, SubmitFeedbackError, SubmitFeedbackHandler, SubmitFeedbackResult,
    DEFAULT_FEEDBACK_THRESHOLD, DEFAULT_RETRAIN_INTERVAL,
};
pub use reply::{
    InboundMessage, ReplyError, ReplyOrchestrator, ReplyOutcome, ReplyRoute, ReplyStats,
    FALLBACK_REPLY,
};
