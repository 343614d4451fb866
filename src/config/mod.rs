//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `REPLY_DESK` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a runnable
//! configuration backed by the mock provider.
//!
//! # Example
//!
//! ```no_run
//! use reply_desk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Feedback threshold: {}", config.feedback.threshold);
//! ```

mod ai;
mod error;
mod feedback;
mod logging;
mod reply;
mod training;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use feedback::{FeedbackConfig, StorageBackend};
pub use logging::LoggingConfig;
pub use reply::ReplyConfig;
pub use training::TrainingConfig;

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REPLY_DESK";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Completion provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Escalation, persona and reply length settings
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Feedback log location and retrain threshold
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Retraining schedule and training-example log
    #[serde(default)]
    pub training: TrainingConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `REPLY_DESK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `REPLY_DESK__AI__PROVIDER=openai_compatible` -> `ai.provider`
    /// - `REPLY_DESK__FEEDBACK__THRESHOLD=5` -> `feedback.threshold = 5`
    /// - `REPLY_DESK__REPLY__ESCALATION_KEYWORDS=refund,cancel` -> list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load from the current process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("reply.escalation_keywords"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.reply.validate()?;
        self.feedback.validate()?;
        self.training.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
