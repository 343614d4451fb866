//! Question/answer pairs learned from accepted corrections.
//!
//! A pair is remembered when the corrected reply was given to a question.
//! Later questions that contain a remembered question are answered directly.

/// Corrected replies must be longer than this to be remembered.
const MIN_ANSWER_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FaqEntry {
    question: String,
    needle: String,
    answer: String,
}

/// Insertion-ordered FAQ cache. Lookups return the first match.
#[derive(Debug, Clone, Default)]
pub struct FaqCache {
    entries: Vec<FaqEntry>,
}

impl FaqCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers a corrected answer to a question.
    ///
    /// Returns false when the pair does not qualify: the prompt must ask a
    /// question and the answer must be longer than ten characters. An existing
    /// question keeps its position and gets the new answer.
    pub fn remember(&mut self, question: &str, answer: &str) -> bool {
        let question = question.trim();
        let answer = answer.trim();
        if !question.contains('?') || answer.chars().count() <= MIN_ANSWER_CHARS {
            return false;
        }

        let needle = question.to_lowercase();
        match self.entries.iter_mut().find(|e| e.needle == needle) {
            Some(existing) => existing.answer = answer.to_string(),
            None => self.entries.push(FaqEntry {
                question: question.to_string(),
                needle,
                answer: answer.to_string(),
            }),
        }
        true
    }

    /// Finds a remembered answer for an inbound question.
    ///
    /// Only text containing `?` is looked up. Matching is a case-insensitive
    /// substring test against each remembered question.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        if !text.contains('?') {
            return None;
        }
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .find(|e| haystack.contains(&e.needle))
            .map(|e| e.answer.as_str())
    }

    /// Remembered questions, oldest first.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.question.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_question_with_long_answer() {
        let mut faq = FaqCache::new();
        assert!(faq.remember("Do you support SSO?", "Yes, SAML and OIDC on every plan."));
        assert_eq!(faq.len(), 1);
    }

    #[test]
    fn ignores_statements_and_short_answers() {
        let mut faq = FaqCache::new();
        assert!(!faq.remember("Love the app", "Thanks so much for saying so!"));
        assert!(!faq.remember("Do you support SSO?", "Yes we do."));
        assert!(faq.is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive_substring() {
        let mut faq = FaqCache::new();
        faq.remember("do you support sso?", "Yes, SAML and OIDC on every plan.");

        assert_eq!(
            faq.lookup("Hey team, DO YOU SUPPORT SSO? asking for a friend"),
            Some("Yes, SAML and OIDC on every plan.")
        );
        assert_eq!(faq.lookup("Do you support SCIM?"), None);
    }

    #[test]
    fn lookup_requires_a_question() {
        let mut faq = FaqCache::new();
        faq.remember("pricing?", "Plans start at ten dollars a month.");
        assert_eq!(faq.lookup("pricing"), None);
    }

    #[test]
    fn re_remembering_updates_answer_in_place() {
        let mut faq = FaqCache::new();
        faq.remember("First?", "The original answer text.");
        faq.remember("Second?", "Another answer entirely.");
        faq.remember("FIRST?", "An updated answer text.");

        assert_eq!(faq.questions().collect::<Vec<_>>(), vec!["First?", "Second?"]);
        assert_eq!(faq.lookup("first?"), Some("An updated answer text."));
    }
}
