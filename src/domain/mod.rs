//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `conversation` - Escalation, persona selection, context assembly and reply sanitization
//! - `feedback` - Human corrections, the persisted feedback log and training examples

pub mod conversation;
pub mod feedback;
pub mod foundation;
