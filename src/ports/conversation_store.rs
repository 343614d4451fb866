//! Conversation Store Port - Per-conversation ordered message logs.

use async_trait::async_trait;

use super::StorageError;
use crate::domain::conversation::{user_turns, Message};
use crate::domain::foundation::ConversationKey;

/// Port for conversation history.
///
/// A conversation is created on its first append and only grows. Appends to
/// one key never affect another.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Full history of a conversation, oldest first. Unknown keys yield an
    /// empty log.
    async fn history(&self, key: &ConversationKey) -> Result<Vec<Message>, StorageError>;

    /// Appends messages in order and returns the new log length.
    ///
    /// All messages of one call land contiguously.
    async fn append(
        &self,
        key: &ConversationKey,
        messages: Vec<Message>,
    ) -> Result<usize, StorageError>;

    /// Number of user turns recorded so far.
    async fn user_turn_count(&self, key: &ConversationKey) -> Result<usize, StorageError> {
        Ok(user_turns(&self.history(key).await?))
    }
}
