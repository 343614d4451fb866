//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `CompletionProvider` - Text-completion backend (real or mock)
//! - `ConversationStore` - Per-conversation message history
//! - `FeedbackStore` - Correction log with idempotent apply
//! - `TrainingSink` - Consumer of training examples

mod completion_provider;
mod conversation_store;
mod feedback_store;
mod storage_error;
mod training_sink;

pub use completion_provider::{
    CompletionParams, CompletionProvider, CompletionRequest, CompletionResponse, FinishReason,
    ProviderError, ProviderInfo, TokenUsage,
};
pub use conversation_store::ConversationStore;
pub use feedback_store::FeedbackStore;
pub use storage_error::StorageError;
pub use training_sink::{TrainingReceipt, TrainingSink, TrainingSinkError};
