//! Reply handlers - Inbound post to outbound reply.

mod reply_orchestrator;

pub use reply_orchestrator::{
    InboundMessage, ReplyError, ReplyOrchestrator, ReplyOutcome, ReplyRoute, ReplyStats,
    FALLBACK_REPLY,
};
