//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Sampling parameter {name} out of range: {value}")]
    InvalidSamplingParam { name: &'static str, value: f32 },

    #[error("Sentiment cutoff {name} must be within [-1, 1], got {value}")]
    InvalidCutoff { name: &'static str, value: f32 },

    #[error("Escalation threshold must be between 0 and 10, got {0}")]
    InvalidEscalationThreshold(u8),

    #[error("History window must be at least 1")]
    InvalidHistoryWindow,

    #[error("Reply length limits are inconsistent (soft target {soft_target}, hard cap {hard_cap})")]
    InvalidLengthLimits { soft_target: usize, hard_cap: usize },

    #[error("Feedback threshold must be at least 1")]
    InvalidFeedbackThreshold,

    #[error("Training interval must be at least 1 second")]
    InvalidTrainingInterval,

    #[error("Path for {0} cannot be empty")]
    EmptyPath(&'static str),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
