//! Retraining schedule configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use super::feedback::StorageBackend;

/// Retraining schedule and training-example log
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Seconds between scheduled runs (default: once daily)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Attempt a run at startup when the threshold is already met
    #[serde(default = "default_check_on_start")]
    pub check_on_start: bool,

    #[serde(default)]
    pub backend: StorageBackend,

    /// JSON array of accepted training examples for the file backend
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl TrainingConfig {
    /// Get interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate training configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::InvalidTrainingInterval);
        }
        if self.backend == StorageBackend::File && self.log_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("training.log_path"));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            check_on_start: default_check_on_start(),
            backend: StorageBackend::default(),
            log_path: default_log_path(),
        }
    }
}

fn default_interval() -> u64 {
    86_400
}

fn default_check_on_start() -> bool {
    true
}

fn default_log_path() -> PathBuf {
    PathBuf::from("data/training_examples.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(24 * 60 * 60));
        assert!(config.check_on_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = TrainingConfig {
            interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTrainingInterval));
    }
}
