//! Training examples derived from feedback items.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FeedbackItem;
use crate::domain::foundation::{FeedbackId, Timestamp};

/// Back-reference from an example to the correction it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingMetadata {
    pub original_response: String,
    pub feedback_id: FeedbackId,
    pub timestamp: Timestamp,
}

/// A prompt/completion pair handed to the training collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub prompt: String,
    pub completion: String,
    pub metadata: TrainingMetadata,
    /// Left empty; embedding generation happens outside this crate.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl TrainingExample {
    pub fn feedback_id(&self) -> &FeedbackId {
        &self.metadata.feedback_id
    }
}

impl From<&FeedbackItem> for TrainingExample {
    fn from(item: &FeedbackItem) -> Self {
        let context = Value::Object(item.context.clone());
        Self {
            prompt: format!("Context: {}\nPrompt: {}", context, item.original_prompt),
            completion: item.corrected_response.clone(),
            metadata: TrainingMetadata {
                original_response: item.original_response.clone(),
                feedback_id: item.id.clone(),
                timestamp: item.timestamp,
            },
            embedding: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::NewFeedback;
    use serde_json::json;

    #[test]
    fn example_pairs_prompt_and_context_with_correction() {
        let item = NewFeedback::new("Do you ship to Canada?", "No.", "Yes, we ship to Canada!")
            .with_id("fb-7")
            .with_context(json!({"channel": "twitter"}))
            .validate(Timestamp::now())
            .unwrap();

        let example = TrainingExample::from(&item);

        assert_eq!(
            example.prompt,
            "Context: {\"channel\":\"twitter\"}\nPrompt: Do you ship to Canada?"
        );
        assert_eq!(example.completion, "Yes, we ship to Canada!");
        assert_eq!(example.metadata.original_response, "No.");
        assert_eq!(example.feedback_id().as_str(), "fb-7");
        assert!(example.embedding.is_none());
    }

    #[test]
    fn empty_context_renders_as_empty_object() {
        let item = NewFeedback::new("p", "r", "c")
            .validate(Timestamp::now())
            .unwrap();
        assert!(TrainingExample::from(&item).prompt.starts_with("Context: {}\n"));
    }

    #[test]
    fn serializes_with_null_embedding_and_camel_case_metadata() {
        let item = NewFeedback::new("p", "r", "c")
            .with_id("fb-1")
            .validate(Timestamp::now())
            .unwrap();
        let value = serde_json::to_value(TrainingExample::from(&item)).unwrap();

        assert!(value["embedding"].is_null());
        assert_eq!(value["metadata"]["feedbackId"], "fb-1");
        assert_eq!(value["metadata"]["originalResponse"], "r");
    }
}
