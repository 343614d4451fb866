//! Persona selection.
//!
//! A persona is a fixed system-prompt template. The selector picks one from
//! the post text and its sentiment score; first match wins:
//! support, then technical, then casual, then default.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SUPPORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"help|broken|service|problem|issue|doesn't work|isn't working|failed")
        .expect("support pattern is valid")
});

static TECHNICAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"integration|feature|implement|how to|how do|setup|connect|api|code")
        .expect("technical pattern is valid")
});

static CASUAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"love|thanks|great|cool|awesome|excited|happy").expect("casual pattern is valid")
});

const DEFAULT_PROMPT: &str = "You are a friendly and professional social media manager named Jamie. \
Your tone is helpful but conversational - you use contractions like 'we'll' instead of 'we will', \
vary your sentence length, and occasionally start sentences with connectors like 'Actually,' or 'Plus,'. \
You're knowledgeable but approachable, and you respond like a real person would - concise but complete, \
with a touch of warmth.";

const TECHNICAL_PROMPT: &str = "You are a technical support specialist named Taylor who really knows the product. \
You explain technical concepts clearly but conversationally, avoiding jargon when possible. \
You show empathy when users have problems ('That definitely sounds frustrating!'). \
You use analogies to explain complex ideas and vary your sentence structure to sound natural. \
Your responses are helpful and precise but never sound like they came from a manual.";

const CASUAL_PROMPT: &str = "You are Sam, a friendly and casual social media rep who loves connecting with customers. \
Your style is upbeat and conversational with the occasional emoji. \
You use casual phrases, contractions, and sometimes short, punchy sentences. \
Feel free to show enthusiasm ('Love this question!') or personality ('I'm a huge fan of that feature too!'). \
Your messages should feel like texts from a friend - warm, genuine and never corporate.";

const SUPPORT_PROMPT: &str = "You are Alex, a customer support specialist who genuinely cares about solving problems. \
You first acknowledge the customer's feelings ('I completely understand how frustrating this must be'), \
then provide clear solutions. Your tone is empathetic but efficient, like a helpful colleague rather than \
a corporate representative. Use natural language with occasional phrases like 'Let me look into this for you' \
or 'I'd recommend trying...' that a real support person would use.";

/// Brand voice used for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Default,
    Technical,
    Casual,
    Support,
}

/// Static persona-to-prompt mapping, overridable from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaPrompts {
    pub default: String,
    pub technical: String,
    pub casual: String,
    pub support: String,
}

impl Default for PersonaPrompts {
    fn default() -> Self {
        Self {
            default: DEFAULT_PROMPT.to_string(),
            technical: TECHNICAL_PROMPT.to_string(),
            casual: CASUAL_PROMPT.to_string(),
            support: SUPPORT_PROMPT.to_string(),
        }
    }
}

impl PersonaPrompts {
    /// Returns the system prompt for a persona.
    pub fn prompt_for(&self, persona: Persona) -> &str {
        match persona {
            Persona::Default => &self.default,
            Persona::Technical => &self.technical,
            Persona::Casual => &self.casual,
            Persona::Support => &self.support,
        }
    }
}

/// Sentiment above which a post gets the casual persona.
const CASUAL_SENTIMENT: f32 = 0.3;
/// Sentiment below which a post gets the support persona.
const SUPPORT_SENTIMENT: f32 = -0.3;

/// Picks a persona for a post.
pub fn select_persona(text: &str, sentiment: f32) -> Persona {
    let text = text.to_lowercase();

    if sentiment < SUPPORT_SENTIMENT || SUPPORT_PATTERN.is_match(&text) {
        return Persona::Support;
    }
    if TECHNICAL_PATTERN.is_match(&text) {
        return Persona::Technical;
    }
    if sentiment > CASUAL_SENTIMENT || CASUAL_PATTERN.is_match(&text) {
        return Persona::Casual;
    }
    Persona::Default
}
