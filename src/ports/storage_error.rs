//! Errors shared by the persistence ports.

use crate::domain::foundation::FeedbackId;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to (de)serialize store document: {0}")]
    Serialization(String),

    #[error("Feedback item '{0}' already exists")]
    Conflict(FeedbackId),
}

impl StorageError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<crate::domain::feedback::DuplicateFeedbackId> for StorageError {
    fn from(err: crate::domain::feedback::DuplicateFeedbackId) -> Self {
        Self::Conflict(err.0)
    }
}
