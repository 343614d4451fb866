//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log level and output format
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Validate logging configuration
    ///
    /// Plain levels are checked; full filter directives
    /// (`reply_desk=debug,info`) are passed through.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let level = self.level.trim().to_lowercase();
        if level.is_empty() {
            return Err(ValidationError::InvalidLogLevel(self.level.clone()));
        }
        let is_directive = level.contains('=') || level.contains(',');
        if !is_directive && !LEVELS.contains(&level.as_str()) {
            return Err(ValidationError::InvalidLogLevel(self.level.clone()));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
