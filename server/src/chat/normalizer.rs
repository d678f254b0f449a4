//! Typo correction for chat queries.
//!
//! Each whitespace-delimited token is compared against a small ordered
//! vocabulary. A token within [`MAX_CORRECTION_DISTANCE`] edits of some
//! vocabulary word is replaced by the closest one; other tokens pass through
//! untouched.

pub const DEFAULT_VOCABULARY: &[&str] = &[
    "today", "tomorrow", "next", "party", "concert", "event", "hockey", "house", "team",
];

pub const MAX_CORRECTION_DISTANCE: usize = 2;

#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    vocabulary: Vec<String>,
    max_distance: usize,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_VOCABULARY.iter().copied())
    }
}

impl QueryNormalizer {
    /// Vocabulary order is significant: on equal distance the earlier word wins.
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            max_distance: MAX_CORRECTION_DISTANCE,
        }
    }

    pub fn with_max_distance(mut self, max_distance: usize) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Closest vocabulary word within the distance threshold, if any.
    pub fn correct_token(&self, token: &str) -> Option<&str> {
        let lowered = token.to_lowercase();
        let mut best: Option<(usize, &str)> = None;

        for word in &self.vocabulary {
            let distance = strsim::levenshtein(&lowered, word);
            if distance > self.max_distance {
                continue;
            }
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, word.as_str()));
            }
        }

        best.map(|(_, word)| word)
    }

    pub fn normalize(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.correct_token(token).unwrap_or(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrects_close_typos() {
        let normalizer = QueryNormalizer::default();
        assert_eq!(normalizer.normalize("whats nxt"), "whats next");
        assert_eq!(normalizer.normalize("tomorow"), "tomorrow");
        assert_eq!(normalizer.normalize("Todya"), "today");
    }

    #[test]
    fn test_far_tokens_pass_through() {
        let normalizer = QueryNormalizer::default();
        assert_eq!(normalizer.normalize("Fallapalooza"), "Fallapalooza");
        assert_eq!(normalizer.normalize("rugby"), "rugby");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        let normalizer = QueryNormalizer::default();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   "), "");
        assert_eq!(normalizer.normalize("  next   party "), "next party");
    }

    #[test]
    fn test_exact_vocabulary_is_unchanged() {
        let normalizer = QueryNormalizer::default();
        let text = "today tomorrow next party concert event hockey house team";
        assert_eq!(normalizer.normalize(text), text);
    }

    #[test]
    fn test_ties_resolve_to_earlier_word() {
        // "bat" is one edit from both; the first listed wins
        let normalizer = QueryNormalizer::new(["cat", "bag"]);
        assert_eq!(normalizer.correct_token("bat"), Some("cat"));

        let reversed = QueryNormalizer::new(["bag", "cat"]);
        assert_eq!(reversed.correct_token("bat"), Some("bag"));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = QueryNormalizer::default().with_max_distance(0);
        assert_eq!(strict.normalize("nxt"), "nxt");
        assert_eq!(strict.normalize("next"), "next");
    }
}
