//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Completion providers (mock, OpenAI-compatible HTTP)
//! - `storage` - Conversation logs, feedback log and training sinks

pub mod ai;
pub mod storage;

pub use ai::{provider_from_config, MockCompletionProvider, OpenAICompatibleProvider};
pub use storage::{
    InMemoryConversationStore, InMemoryFeedbackStore, InMemoryTrainingLog, JsonFileFeedbackStore,
    JsonFileTrainingLog,
};
