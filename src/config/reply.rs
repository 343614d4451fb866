//! Reply pipeline configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::conversation::{
    ContextBuilder, EscalationPolicy, PersonaPrompts, SanitizerLimits, DEFAULT_ESCALATION_KEYWORDS,
    DEFAULT_HISTORY_WINDOW, DEFAULT_SOFT_TARGET_CHARS, HARD_CAP_CHARS, SHORT_REPLY_CHARS,
};

/// Escalation, persona, context and length settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyConfig {
    /// Sensitive keywords (comma-separated in the environment)
    #[serde(default = "default_keywords")]
    pub escalation_keywords: Vec<String>,

    #[serde(default = "default_severe_cutoff")]
    pub severe_sentiment_cutoff: f32,

    #[serde(default = "default_keyword_cutoff")]
    pub keyword_sentiment_cutoff: f32,

    #[serde(default = "default_repeat_turns")]
    pub repeat_contact_turns: usize,

    #[serde(default)]
    pub repeat_contact_sentiment_cutoff: f32,

    #[serde(default = "default_complex_chars")]
    pub complex_question_chars: usize,

    /// Settings-scale threshold (0-10). Not read by the classifier; kept so
    /// operators can see when it disagrees with `severe_sentiment_cutoff`.
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u8,

    /// Prior messages included in each request
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Length target communicated to the model
    #[serde(default = "default_soft_target")]
    pub soft_target_chars: usize,

    /// Length no reply may exceed
    #[serde(default = "default_hard_cap")]
    pub hard_cap_chars: usize,

    /// Seed for the canned escalation reply picker (random when unset)
    pub canned_reply_seed: Option<u64>,

    pub default_prompt: Option<String>,
    pub technical_prompt: Option<String>,
    pub casual_prompt: Option<String>,
    pub support_prompt: Option<String>,
}

impl ReplyConfig {
    /// Escalation rules built from the configured cutoffs
    pub fn escalation_policy(&self) -> EscalationPolicy {
        let mut policy = EscalationPolicy::default().with_keywords(&self.escalation_keywords);
        policy.severe_sentiment_cutoff = self.severe_sentiment_cutoff;
        policy.keyword_sentiment_cutoff = self.keyword_sentiment_cutoff;
        policy.repeat_contact_turns = self.repeat_contact_turns;
        policy.repeat_contact_sentiment_cutoff = self.repeat_contact_sentiment_cutoff;
        policy.complex_question_chars = self.complex_question_chars;
        policy
    }

    /// Persona prompts with any configured overrides applied
    pub fn persona_prompts(&self) -> PersonaPrompts {
        let mut prompts = PersonaPrompts::default();
        let overrides = [
            (&self.default_prompt, &mut prompts.default),
            (&self.technical_prompt, &mut prompts.technical),
            (&self.casual_prompt, &mut prompts.casual),
            (&self.support_prompt, &mut prompts.support),
        ];
        for (custom, slot) in overrides {
            if let Some(text) = custom.as_ref().filter(|t| !t.trim().is_empty()) {
                *slot = text.clone();
            }
        }
        prompts
    }

    pub fn context_builder(&self) -> ContextBuilder {
        ContextBuilder::new(self.history_window, self.soft_target_chars)
    }

    pub fn sanitizer_limits(&self) -> SanitizerLimits {
        SanitizerLimits {
            hard_cap_chars: self.hard_cap_chars,
            short_reply_chars: SHORT_REPLY_CHARS.min(self.hard_cap_chars),
        }
    }

    /// The severe cutoff implied by `escalation_threshold`, when it differs
    /// from the configured one.
    pub fn threshold_mismatch(&self) -> Option<f32> {
        let implied = -(f32::from(self.escalation_threshold) / 10.0);
        if (implied - self.severe_sentiment_cutoff).abs() > f32::EPSILON {
            Some(implied)
        } else {
            None
        }
    }

    /// Validate reply configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let cutoffs = [
            ("severe_sentiment_cutoff", self.severe_sentiment_cutoff),
            ("keyword_sentiment_cutoff", self.keyword_sentiment_cutoff),
            (
                "repeat_contact_sentiment_cutoff",
                self.repeat_contact_sentiment_cutoff,
            ),
        ];
        for (name, value) in cutoffs {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidCutoff { name, value });
            }
        }

        if self.escalation_threshold > 10 {
            return Err(ValidationError::InvalidEscalationThreshold(
                self.escalation_threshold,
            ));
        }

        if self.history_window == 0 {
            return Err(ValidationError::InvalidHistoryWindow);
        }

        if self.hard_cap_chars < 20
            || self.soft_target_chars == 0
            || self.soft_target_chars > self.hard_cap_chars
        {
            return Err(ValidationError::InvalidLengthLimits {
                soft_target: self.soft_target_chars,
                hard_cap: self.hard_cap_chars,
            });
        }

        Ok(())
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            escalation_keywords: default_keywords(),
            severe_sentiment_cutoff: default_severe_cutoff(),
            keyword_sentiment_cutoff: default_keyword_cutoff(),
            repeat_contact_turns: default_repeat_turns(),
            repeat_contact_sentiment_cutoff: 0.0,
            complex_question_chars: default_complex_chars(),
            escalation_threshold: default_escalation_threshold(),
            history_window: default_history_window(),
            soft_target_chars: default_soft_target(),
            hard_cap_chars: default_hard_cap(),
            canned_reply_seed: None,
            default_prompt: None,
            technical_prompt: None,
            casual_prompt: None,
            support_prompt: None,
        }
    }
}

fn default_keywords() -> Vec<String> {
    DEFAULT_ESCALATION_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_severe_cutoff() -> f32 {
    -0.7
}

fn default_keyword_cutoff() -> f32 {
    -0.3
}

fn default_repeat_turns() -> usize {
    3
}

fn default_complex_chars() -> usize {
    200
}

fn default_escalation_threshold() -> u8 {
    7
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_soft_target() -> usize {
    DEFAULT_SOFT_TARGET_CHARS
}

fn default_hard_cap() -> usize {
    HARD_CAP_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Persona;

    #[test]
    fn test_reply_config_defaults() {
        let config = ReplyConfig::default();
        assert_eq!(config.escalation_keywords.len(), 15);
        assert_eq!(config.history_window, 5);
        assert_eq!(config.hard_cap_chars, 275);
        assert_eq!(config.soft_target_chars, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_uses_configured_cutoffs() {
        let config = ReplyConfig {
            severe_sentiment_cutoff: -0.5,
            escalation_keywords: vec!["Chargeback".to_string()],
            ..Default::default()
        };
        let policy = config.escalation_policy();
        assert_eq!(policy.severe_sentiment_cutoff, -0.5);
        assert_eq!(policy.keywords(), &["chargeback".to_string()]);
        assert!(policy.should_escalate("hm", -0.6, 0));
    }

    #[test]
    fn test_prompt_overrides_apply() {
        let config = ReplyConfig {
            casual_prompt: Some("You are Riley.".to_string()),
            support_prompt: Some("   ".to_string()),
            ..Default::default()
        };
        let prompts = config.persona_prompts();
        assert_eq!(prompts.prompt_for(Persona::Casual), "You are Riley.");
        assert!(prompts.prompt_for(Persona::Support).contains("Alex"));
    }

    #[test]
    fn test_default_threshold_matches_severe_cutoff() {
        assert_eq!(ReplyConfig::default().threshold_mismatch(), None);

        let config = ReplyConfig {
            escalation_threshold: 5,
            ..Default::default()
        };
        assert_eq!(config.threshold_mismatch(), Some(-0.5));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = ReplyConfig {
            keyword_sentiment_cutoff: -1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCutoff { name: "keyword_sentiment_cutoff", .. })
        ));

        let config = ReplyConfig {
            soft_target_chars: 300,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLengthLimits { .. })
        ));

        let config = ReplyConfig {
            history_window: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidHistoryWindow));
    }

    #[test]
    fn test_sanitizer_limits_follow_hard_cap() {
        let config = ReplyConfig {
            hard_cap_chars: 140,
            soft_target_chars: 120,
            ..Default::default()
        };
        let limits = config.sanitizer_limits();
        assert_eq!(limits.hard_cap_chars, 140);
        assert_eq!(limits.short_reply_chars, 140);
    }
}
