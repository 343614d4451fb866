//! Application layer - Command handlers and background services.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Replies and feedback are separate command paths that share the FAQ cache.

pub mod handlers;

pub use handlers::{
    // Reply handling
    InboundMessage, ReplyError, ReplyOrchestrator, ReplyOutcome, ReplyRoute, ReplyStats,
    FALLBACK_REPLY,
    // Feedback and retraining
    RetrainError, RetrainOutcome, RetrainScheduler, RetrainTrigger, SchedulerHandle,
    SubmitFeedbackCommand, SubmitFeedbackError, SubmitFeedbackHandler, SubmitFeedbackResult,
};
