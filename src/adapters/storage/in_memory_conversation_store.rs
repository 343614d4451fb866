//! In-memory conversation store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::conversation::Message;
use crate::domain::foundation::ConversationKey;
use crate::ports::{ConversationStore, StorageError};

/// Conversation logs keyed by conversation, held for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<ConversationKey, Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conversations seen so far.
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn history(&self, key: &ConversationKey) -> Result<Vec<Message>, StorageError> {
        Ok(self
            .conversations
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(
        &self,
        key: &ConversationKey,
        messages: Vec<Message>,
    ) -> Result<usize, StorageError> {
        let mut conversations = self.conversations.write().await;
        let log = conversations.entry(key.clone()).or_default();
        log.extend(messages);
        Ok(log.len())
    }
}
