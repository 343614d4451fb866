//! Conversation messages and their wire form.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (persona prompt).
    System,
    /// Inbound post from the customer.
    User,
    /// Reply produced by the pipeline.
    Assistant,
}

/// A message recorded in a conversation log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: Timestamp,
    /// Set on user turns that were routed to a human.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escalated: bool,
}

impl Message {
    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Timestamp::now(),
            escalated: false,
        }
    }

    /// Creates an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Timestamp::now(),
            escalated: false,
        }
    }

    /// Flags this message as escalated to human review.
    pub fn flagged(mut self) -> Self {
        self.escalated = true;
        self
    }

    /// Projects the message onto the provider wire form.
    pub fn to_chat(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.content.clone())
    }
}

/// A `{role, content}` pair as sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a new chat message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// Counts prior user turns in a conversation log.
pub fn user_turns(history: &[Message]) -> usize {
    history.iter().filter(|m| m.role == MessageRole::User).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn unflagged_message_omits_escalated_field() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(json.get("escalated").is_none());

        let json = serde_json::to_value(Message::user("hi").flagged()).unwrap();
        assert_eq!(json["escalated"], true);
    }

    #[test]
    fn user_turns_ignores_assistant_messages() {
        let history = vec![
            Message::user("a"),
            Message::assistant("b"),
            Message::user("c").flagged(),
        ];
        assert_eq!(user_turns(&history), 2);
    }

    #[test]
    fn to_chat_keeps_role_and_content() {
        let chat = Message::assistant("Thanks!").to_chat();
        assert_eq!(chat, ChatMessage::new(MessageRole::Assistant, "Thanks!"));
    }
}
