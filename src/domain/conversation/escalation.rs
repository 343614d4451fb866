//! Escalation decision: route a post to a human or let the pipeline answer.
//!
//! Rules are evaluated in a fixed order and the first one that holds wins:
//!
//! 1. sentiment below the severe cutoff
//! 2. an escalation keyword together with sentiment below the keyword cutoff
//! 3. a repeat contact (enough prior user turns) with negative sentiment
//! 4. a long post that asks a question
//!
//! The classifier is a pure function of its inputs.

use serde::Serialize;

/// Keywords that mark a post as sensitive, matched as case-insensitive substrings.
pub const DEFAULT_ESCALATION_KEYWORDS: &[&str] = &[
    "refund",
    "cancel",
    "broken",
    "not working",
    "issue",
    "problem",
    "disappointed",
    "angry",
    "lawsuit",
    "legal",
    "urgent",
    "immediately",
    "help me",
    "frustrated",
    "terrible",
];

/// Which rule caused an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    SevereSentiment,
    SensitiveKeyword,
    RepeatContact,
    ComplexQuestion,
}

/// Cutoffs and keyword list for the escalation decision.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationPolicy {
    keywords: Vec<String>,
    pub severe_sentiment_cutoff: f32,
    pub keyword_sentiment_cutoff: f32,
    pub repeat_contact_turns: usize,
    pub repeat_contact_sentiment_cutoff: f32,
    pub complex_question_chars: usize,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_ESCALATION_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            severe_sentiment_cutoff: -0.7,
            keyword_sentiment_cutoff: -0.3,
            repeat_contact_turns: 3,
            repeat_contact_sentiment_cutoff: 0.0,
            complex_question_chars: 200,
        }
    }
}

impl EscalationPolicy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the keyword list. Keywords are lower-cased; blanks are dropped.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    /// Returns the configured keywords.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns true if the post should go to a human.
    pub fn should_escalate(&self, text: &str, sentiment: f32, prior_user_turns: usize) -> bool {
        self.classify(text, sentiment, prior_user_turns).is_some()
    }

    /// Returns the first matching escalation rule, if any.
    pub fn classify(
        &self,
        text: &str,
        sentiment: f32,
        prior_user_turns: usize,
    ) -> Option<EscalationReason> {
        if sentiment < self.severe_sentiment_cutoff {
            return Some(EscalationReason::SevereSentiment);
        }

        if sentiment < self.keyword_sentiment_cutoff && self.contains_keyword(text) {
            return Some(EscalationReason::SensitiveKeyword);
        }

        if prior_user_turns >= self.repeat_contact_turns
            && sentiment < self.repeat_contact_sentiment_cutoff
        {
            return Some(EscalationReason::RepeatContact);
        }

        if text.chars().count() > self.complex_question_chars && text.contains('?') {
            return Some(EscalationReason::ComplexQuestion);
        }

        None
    }

    fn contains_keyword(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}
