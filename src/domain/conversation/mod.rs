//! Conversation domain module.
//!
//! Pure reply logic: the escalation decision, persona selection, context
//! window assembly, response sanitization and the FAQ cache.

mod context;
mod escalation;
mod faq;
mod message;
mod sanitizer;
mod voice;

pub use context::{
    describe_turn, format_handle, plain_handle, ContextBuilder, SentimentLabel,
    DEFAULT_HISTORY_WINDOW, DEFAULT_SOFT_TARGET_CHARS,
};
pub use escalation::{EscalationPolicy, EscalationReason, DEFAULT_ESCALATION_KEYWORDS};
pub use faq::FaqCache;
pub use message::{user_turns, ChatMessage, Message, MessageRole};
pub use sanitizer::{
    repair_rules, RepairRule, ResponseSanitizer, SanitizerLimits, HARD_CAP_CHARS, LIST_CLOSING,
    SHORT_REPLY_CHARS,
};
pub use voice::{select_persona, Persona, PersonaPrompts};
