//! Feedback items: human corrections of automated replies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{FeedbackId, Timestamp, ValidationError};

/// A correction as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    /// Caller-supplied id. When absent an id is derived from the submission time.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub original_prompt: String,
    #[serde(default)]
    pub original_response: String,
    #[serde(default)]
    pub corrected_response: String,
    /// Opaque mapping stored alongside the correction.
    #[serde(default)]
    pub context: Option<Value>,
}

impl NewFeedback {
    pub fn new(
        original_prompt: impl Into<String>,
        original_response: impl Into<String>,
        corrected_response: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            original_prompt: original_prompt.into(),
            original_response: original_response.into(),
            corrected_response: corrected_response.into(),
            context: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Validates the submission and stamps it, producing an unapplied item.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the prompt, response, correction or a supplied id is blank
    /// - `InvalidFormat` if the context is present but not a JSON object
    pub fn validate(self, now: Timestamp) -> Result<FeedbackItem, ValidationError> {
        require("originalPrompt", &self.original_prompt)?;
        require("originalResponse", &self.original_response)?;
        require("correctedResponse", &self.corrected_response)?;

        let context = match self.context {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ValidationError::invalid_format(
                    "context",
                    "must be a JSON object",
                ))
            }
        };

        let id = match self.id {
            Some(id) => FeedbackId::new(id)?,
            None => FeedbackId::time_derived(now),
        };

        Ok(FeedbackItem {
            id,
            original_prompt: self.original_prompt,
            original_response: self.original_response,
            corrected_response: self.corrected_response,
            context,
            timestamp: now,
            applied: false,
        })
    }
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(())
}

/// A stored correction. Immutable except for `applied`, which goes from
/// false to true exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: FeedbackId,
    pub original_prompt: String,
    pub original_response: String,
    pub corrected_response: String,
    #[serde(default)]
    pub context: Map<String, Value>,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub applied: bool,
}
