//! Storage adapters - Implementations of the persistence ports.
//!
//! # Available Adapters
//!
//! - `InMemoryConversationStore` - Conversation logs for the process lifetime
//! - `InMemoryFeedbackStore` - Feedback log in memory, for tests and ephemeral runs
//! - `JsonFileFeedbackStore` - Feedback log as one atomically rewritten JSON document
//! - `InMemoryTrainingLog` - Training sink that keeps examples in memory
//! - `JsonFileTrainingLog` - Training sink that appends to a JSON array on disk
//!
//! # Usage
//!
//! ```ignore
//! use reply_desk::adapters::storage::JsonFileFeedbackStore;
//!
//! let store = JsonFileFeedbackStore::open("data/feedback.json").await?;
//! store.append(item).await?;
//! ```

mod in_memory_conversation_store;
mod in_memory_feedback_store;
mod in_memory_training_log;
mod json_document;
mod json_file_feedback_store;
mod json_file_training_log;

pub use in_memory_conversation_store::InMemoryConversationStore;
pub use in_memory_feedback_store::InMemoryFeedbackStore;
pub use in_memory_training_log::InMemoryTrainingLog;
pub use json_file_feedback_store::JsonFileFeedbackStore;
pub use json_file_training_log::JsonFileTrainingLog;
