//! Feedback log configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the feedback log and training log are kept
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON document on disk
    #[default]
    File,
    /// Process memory only (lost on exit)
    Memory,
}

/// Feedback log configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// JSON document path for the file backend
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Unapplied items needed before a retrain is attempted
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

impl FeedbackConfig {
    /// Validate feedback configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.threshold == 0 {
            return Err(ValidationError::InvalidFeedbackThreshold);
        }
        if self.backend == StorageBackend::File && self.store_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("feedback.store_path"));
        }
        Ok(())
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            store_path: default_store_path(),
            threshold: default_threshold(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/feedback.json")
}

fn default_threshold() -> usize {
    10
}
