//! Feedback domain module.
//!
//! Human corrections of automated replies, the persisted log that tracks
//! which corrections have been applied, and the training examples derived
//! from them.

mod item;
mod state;
mod training;

pub use item::{FeedbackItem, NewFeedback};
pub use state::{DuplicateFeedbackId, FeedbackStoreState, FEEDBACK_SCHEMA_VERSION};
pub use training::{TrainingExample, TrainingMetadata};
