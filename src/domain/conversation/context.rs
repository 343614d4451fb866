//! Context window assembly for completion requests.
//!
//! A request is the persona prompt (with reply guidelines), at most
//! `history_window` prior messages, and the current user turn. Older turns
//! are dropped, never summarized.

use super::message::{ChatMessage, Message};

/// Default number of prior messages included in a request.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Default soft length target communicated to the model.
pub const DEFAULT_SOFT_TARGET_CHARS: usize = 250;

/// Sentiment bucket shown to the model next to the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Buckets a score in [-1, 1].
    pub fn from_score(score: f32) -> Self {
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

/// Normalizes a handle to its `@name` form.
pub fn format_handle(handle: &str) -> String {
    let handle = handle.trim();
    if handle.is_empty() || handle.starts_with('@') {
        handle.to_string()
    } else {
        format!("@{}", handle)
    }
}

/// Strips a leading `@` from a handle.
pub fn plain_handle(handle: &str) -> &str {
    let handle = handle.trim();
    handle.strip_prefix('@').unwrap_or(handle)
}

/// The user turn as recorded in conversation history.
pub fn describe_turn(handle: &str, text: &str, sentiment: f32) -> String {
    format!(
        "Message from {}: \"{}\"\nSentiment: {}",
        format_handle(handle),
        text,
        SentimentLabel::from_score(sentiment).as_str()
    )
}

/// Builds provider requests from persona, history and the current turn.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    history_window: usize,
    soft_target_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW, DEFAULT_SOFT_TARGET_CHARS)
    }
}

impl ContextBuilder {
    /// Creates a builder with the given window size and soft length target.
    pub fn new(history_window: usize, soft_target_chars: usize) -> Self {
        Self {
            history_window,
            soft_target_chars,
        }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Assembles the ordered message list for the provider.
    ///
    /// `history` is the full conversation log, oldest first. `turn` is the
    /// recorded form of the current post (see [`describe_turn`]).
    pub fn build(&self, persona_prompt: &str, history: &[Message], turn: &str) -> Vec<ChatMessage> {
        let start = history.len().saturating_sub(self.history_window);
        let recent = &history[start..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt(persona_prompt)));
        messages.extend(recent.iter().map(Message::to_chat));
        messages.push(ChatMessage::user(self.user_turn(turn)));
        messages
    }

    fn system_prompt(&self, persona_prompt: &str) -> String {
        format!(
            "{persona}\n\nIMPORTANT GUIDELINES:\n\
             1. Sound like a real human - use contractions and varied sentence structure\n\
             2. Keep your responses SHORT AND COMPLETE - no longer than {limit} characters\n\
             3. NEVER end mid-sentence or with an incomplete thought\n\
             4. When discussing features or integrations, be specific and concise\n\
             5. If you can't fit everything in one message, provide a complete thought then invite them to DM for more\n\
             6. Focus on giving ONE complete answer rather than trying to cover everything partially\n\
             7. NEVER produce lists that would get cut off - choose 2-3 examples instead\n\
             8. Respond in a complete, self-contained way that can stand alone",
            persona = persona_prompt,
            limit = self.soft_target_chars,
        )
    }

    fn user_turn(&self, turn: &str) -> String {
        format!(
            "{turn}\n\nRespond directly and naturally. Keep it under {limit} characters and ensure \
             it's a COMPLETE thought - never end mid-sentence. Don't use their @ handle in your reply.",
            turn = turn,
            limit = self.soft_target_chars,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageRole;

    fn history(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("user {}", i))
                } else {
                    Message::assistant(format!("assistant {}", i))
                }
            })
            .collect()
    }

    mod labels {
        use super::*;

        #[test]
        fn buckets_scores() {
            assert_eq!(SentimentLabel::from_score(0.2), SentimentLabel::Positive);
            assert_eq!(SentimentLabel::from_score(-0.01), SentimentLabel::Negative);
            assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
        }

        #[test]
        fn handles_normalize_both_ways() {
            assert_eq!(format_handle("acme"), "@acme");
            assert_eq!(format_handle("@acme"), "@acme");
            assert_eq!(plain_handle("@acme"), "acme");
            assert_eq!(plain_handle("acme"), "acme");
        }

        #[test]
        fn describe_turn_records_handle_and_label() {
            assert_eq!(
                describe_turn("acme", "where is my order", -0.4),
                "Message from @acme: \"where is my order\"\nSentiment: Negative"
            );
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn empty_history_yields_system_and_turn() {
            let messages = ContextBuilder::default().build("persona", &[], "turn");

            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].role, MessageRole::System);
            assert!(messages[0].content.starts_with("persona\n\nIMPORTANT GUIDELINES:"));
            assert_eq!(messages[1].role, MessageRole::User);
            assert!(messages[1].content.starts_with("turn\n\n"));
        }

        #[test]
        fn keeps_only_the_last_five_messages_in_order() {
            let messages = ContextBuilder::default().build("persona", &history(12), "turn");

            assert_eq!(messages.len(), 7);
            let middle: Vec<&str> = messages[1..6].iter().map(|m| m.content.as_str()).collect();
            assert_eq!(
                middle,
                vec!["assistant 7", "user 8", "assistant 9", "user 10", "assistant 11"]
            );
        }

        #[test]
        fn short_history_is_included_whole() {
            let messages = ContextBuilder::default().build("persona", &history(3), "turn");
            assert_eq!(messages.len(), 5);
            assert_eq!(messages[1].content, "user 0");
        }

        #[test]
        fn instructions_carry_the_soft_target() {
            let messages = ContextBuilder::new(2, 180).build("persona", &[], "turn");
            assert!(messages[0].content.contains("no longer than 180 characters"));
            assert!(messages[1].content.contains("under 180 characters"));
            assert!(messages[1].content.contains("Don't use their @ handle"));
        }

        #[test]
        fn window_never_exceeds_configured_size() {
            let builder = ContextBuilder::new(5, 250);
            for len in 0..30 {
                let messages = builder.build("p", &history(len), "t");
                assert_eq!(messages.len(), len.min(5) + 2);
            }
        }
    }
}
