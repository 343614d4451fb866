//! Response sanitization and completion repair.
//!
//! Turns raw provider text into a reply that reads like a person wrote it,
//! stands on its own, fits in `hard_cap_chars` characters and never ends
//! mid-sentence.
//!
//! # Steps
//!
//! 1. Cosmetic cleanup: mention artifacts, edge quotes, AI self-references,
//!    a leading echo of the addressee's handle.
//! 2. Completion repair: a dangling list item is cut and replaced by a closing
//!    clause; otherwise the first matching rule of [`repair_rules`] rewrites a
//!    known trailing-off phrase into a complete sentence.
//! 3. Fragment fix: terminal punctuation is added when missing.
//! 4. Length bound: cut at the last sentence end that fits, else at the best
//!    break point, else hard; then repair again.
//!
//! The sanitizer is pure: the same input always yields the same bytes.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Hard upper bound on reply length, in characters.
pub const HARD_CAP_CHARS: usize = 275;

/// Replies shorter than this get a bare `.` when they lack terminal punctuation.
pub const SHORT_REPLY_CHARS: usize = 240;

/// Closing clause appended after a dangling list item is removed.
pub const LIST_CLOSING: &str = "Contact us for the complete list.";

/// Closing clause used when a long fragment is cut at a trailing comma.
const COMMA_CLOSING: &str = " and more.";

/// How far from the end a comma may sit and still be used as a cut point.
const COMMA_LOOKBACK_CHARS: usize = 50;

/// A hard cut keeps `cap - HARD_CUT_MARGIN` characters before the final period.
const HARD_CUT_MARGIN: usize = 3;

/// Truncate-and-repair rounds before falling back to a plain truncation.
const MAX_TRUNCATION_PASSES: usize = 3;

/// Break points tried, in priority order, when no sentence end fits.
const BREAK_POINTS: [&str; 8] = [". ", "! ", "? ", ", ", "; ", ": ", " - ", " "];

static DOUBLE_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"@@+(\w+)").expect("valid regex"));
static SPACED_DOUBLE_AT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\s+@(\w+)").expect("valid regex"));
static SPACED_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\s+(\w+)").expect("valid regex"));
static EDGE_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^["'“”‘’]+|["'“”‘’]+$"#).expect("valid regex"));
static AI_PHRASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:as an AI(?: language model)?|as a language model|AI assistant|I'm an AI|I am an AI|I'd be happy to help|I'm here to assist)\b",
    )
    .expect("valid regex")
});
static LEADING_HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@\w+[,:]?\s*").expect("valid regex"));
static EXTRA_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([,.!?;:])").expect("valid regex"));
static LEADING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s,;:.!?-]+").expect("valid regex"));

static NUMBERED_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\.\s+[^.!?]*$").expect("valid regex"));
static BULLET_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\n)[ \t]*[-*•][ \t]+[^.!?\n]*$").expect("valid regex"));

static REPAIR_RULES: Lazy<Vec<RepairRule>> = Lazy::new(|| {
    vec![
        RepairRule::new("dm_us", r"\bDM us\b[^.!?]*$", "DM us for more information."),
        RepairRule::new(
            "continually_adding",
            r"\bwe are continually adding more(?:\.?\s*(?:Would you|If you)[^.!?]*|[^.!?]*)$",
            "we are continually adding more. Let us know if you need help with a specific integration.",
        ),
        RepairRule::new(
            "looking_for_feedback",
            r"\bwe['’]re always looking for feedb[^.!?]*$",
            "we're always looking for feedback to improve our service.",
        ),
        RepairRule::new(
            "reach_out",
            r"\bfeel free to reach out[^.!?]*$",
            "feel free to reach out if you need anything else.",
        ),
        RepairRule::new(
            "contact_us_for",
            r"\bcontact us for[^.!?]*$",
            "contact us for more information.",
        ),
        RepairRule::new(
            "and_more",
            r"\band more(?:\.?\s*(?:Would you|If you)[^.!?]*|[^.!?]*)$",
            "and more.",
        ),
        RepairRule::new(
            "please_let_us",
            r"\bplease let us[^.!?]*$",
            "please let us know if you have any other questions.",
        ),
        RepairRule::new("i_can_help", r"\bI can help[^.!?]*$", "I can help you with that."),
        RepairRule::new(
            "more_info",
            r"\bmore info[^.!?]*$",
            "more information is available on our website.",
        ),
        RepairRule::new(
            "custom_pricing",
            r"\bcustom pricing[^.!?]*$",
            "custom pricing tailored to your needs.",
        ),
        RepairRule::new(
            "information_about",
            r"\binformation about[^.!?]*$",
            "information is available.",
        ),
    ]
});

/// One completion-repair rule: a trailing phrase and its canonical completion.
///
/// Patterns are anchored at the end and only match when no sentence
/// terminator follows the phrase, so completed sentences are left alone.
#[derive(Debug)]
pub struct RepairRule {
    name: &'static str,
    pattern: Regex,
    completion: &'static str,
}

impl RepairRule {
    fn new(name: &'static str, pattern: &str, completion: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("repair rule pattern is valid"),
            completion,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn completion(&self) -> &'static str {
        self.completion
    }

    /// Returns true if the response trails off into this rule's phrase.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Replaces the trailing phrase with the canonical completion.
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace(text, NoExpand(self.completion))
            .into_owned()
    }
}

/// The ordered repair table, evaluated first-match-wins.
pub fn repair_rules() -> &'static [RepairRule] {
    &REPAIR_RULES
}

/// Length limits applied by the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizerLimits {
    pub hard_cap_chars: usize,
    pub short_reply_chars: usize,
}

impl Default for SanitizerLimits {
    fn default() -> Self {
        Self {
            hard_cap_chars: HARD_CAP_CHARS,
            short_reply_chars: SHORT_REPLY_CHARS,
        }
    }
}

/// Cleans, repairs and bounds provider output.
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer {
    limits: SanitizerLimits,
}

impl ResponseSanitizer {
    /// Creates a sanitizer with the default 275-character cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sanitizer with custom limits.
    pub fn with_limits(limits: SanitizerLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> SanitizerLimits {
        self.limits
    }

    /// Runs the full pipeline.
    ///
    /// `addressee` is the handle of the person being answered; a leading
    /// echo of it is removed.
    pub fn sanitize(&self, raw: &str, addressee: Option<&str>) -> String {
        let cleaned = self.cleanup(raw, addressee);
        let repaired = self.fix_fragment(&self.repair(&cleaned));
        self.enforce_length(repaired)
    }

    /// Step 1: cosmetic cleanup.
    pub fn cleanup(&self, raw: &str, addressee: Option<&str>) -> String {
        let text = DOUBLE_AT.replace_all(raw.trim(), "@$1");
        let text = SPACED_DOUBLE_AT.replace_all(&text, "@$1");
        let text = SPACED_AT.replace_all(&text, "@$1");
        let text = EDGE_QUOTES.replace_all(text.trim(), "");
        let text = AI_PHRASES.replace_all(text.trim(), "");

        let mut text = text.trim().to_string();
        if let Some(handle) = addressee
            .map(|h| h.trim().trim_start_matches('@'))
            .filter(|h| !h.is_empty())
        {
            let pattern = format!(r"(?i)^@?{}\b[,:]?\s*", regex::escape(handle));
            if let Ok(echo) = Regex::new(&pattern) {
                text = echo.replace(&text, "").into_owned();
            }
        }
        let text = LEADING_HANDLE.replace(&text, "");

        let text = EXTRA_SPACES.replace_all(&text, " ");
        let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
        let text = LEADING_PUNCT.replace(&text, "");
        text.trim().to_string()
    }

    /// Step 2: completion repair.
    pub fn repair(&self, text: &str) -> String {
        if let Some(head) = strip_dangling_item(text) {
            let head = head.trim();
            if head.is_empty() {
                return LIST_CLOSING.to_string();
            }
            return format!("{} {}", close_sentence(head), LIST_CLOSING);
        }

        repair_rules()
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.apply(text))
            .unwrap_or_else(|| text.to_string())
    }

    /// Step 3: make sure a fragment ends in terminal punctuation.
    pub fn fix_fragment(&self, text: &str) -> String {
        if ends_with_terminal(text) {
            return text.to_string();
        }

        let len = char_len(text);
        if len < self.limits.short_reply_chars {
            return format!("{}.", text);
        }

        if let Some(comma) = text.rfind(", ") {
            let comma_pos = char_len(&text[..comma]);
            if comma_pos > 0 && comma_pos + COMMA_LOOKBACK_CHARS > len {
                return format!("{}{}", &text[..=comma], COMMA_CLOSING);
            }
        }

        format!("{}.", text)
    }

    /// Step 4: bound the length, re-repairing after each cut.
    pub fn enforce_length(&self, text: String) -> String {
        let cap = self.limits.hard_cap_chars;
        let mut text = text;

        for _ in 0..MAX_TRUNCATION_PASSES {
            if char_len(&text) <= cap {
                return text;
            }
            text = match self.truncate(&text) {
                Cut::Sentence(head) => head,
                Cut::Break(head) => self.repair_cut(&head),
            };
        }

        if char_len(&text) > cap {
            text = self.truncate(&text).closed();
        }
        text
    }

    /// Repairs an ending created by a cut, or closes it with a period.
    fn repair_cut(&self, head: &str) -> String {
        let repaired = self.repair(head);
        if repaired == head {
            close_sentence(head)
        } else {
            self.fix_fragment(&repaired)
        }
    }

    /// Cuts an over-long reply to at most `hard_cap_chars` characters.
    fn truncate(&self, text: &str) -> Cut {
        let cap = self.limits.hard_cap_chars;

        if let Some(end) = sentence_ends(text)
            .into_iter()
            .filter(|&end| end <= cap)
            .last()
        {
            return Cut::Sentence(take_chars(text, end).to_string());
        }

        let head = take_chars(text, cap);
        for separator in BREAK_POINTS {
            if let Some(idx) = head.rfind(separator) {
                if idx > 0 {
                    return Cut::Break(head[..=idx].to_string());
                }
            }
        }

        let keep = cap.saturating_sub(HARD_CUT_MARGIN);
        Cut::Break(take_chars(text, keep).to_string())
    }
}

/// Result of a length cut.
enum Cut {
    /// Ends at a sentence terminator present in the text.
    Sentence(String),
    /// Ends at a break point or a hard cut, without added punctuation.
    Break(String),
}

impl Cut {
    fn closed(self) -> String {
        match self {
            Cut::Sentence(head) => head,
            Cut::Break(head) => close_sentence(&head),
        }
    }
}

/// Removes a dangling numbered or bulleted list item, returning what precedes it.
fn strip_dangling_item(text: &str) -> Option<&str> {
    NUMBERED_TAIL
        .find(text)
        .or_else(|| BULLET_TAIL.find(text))
        .map(|m| &text[..m.start()])
}

/// Character positions just past each `.`, `!` or `?` that is followed by
/// whitespace or the end of the text.
fn sentence_ends(text: &str) -> Vec<usize> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            is_terminal(**c) && chars.get(i + 1).map_or(true, |next| next.is_whitespace())
        })
        .map(|(i, _)| i + 1)
        .collect()
}

/// Drops trailing separators and guarantees terminal punctuation.
fn close_sentence(text: &str) -> String {
    let trimmed =
        text.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));
    if ends_with_terminal(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn ends_with_terminal(text: &str) -> bool {
    text.chars().last().map_or(false, is_terminal)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
