use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use stopwords::{Language, Stopwords, NLTK};

use super::error::ClassifierError;

lazy_static! {
    /// Runs of two or more word characters; single letters and punctuation never become features.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").expect("token pattern is valid");
    static ref ENGLISH_STOP_WORDS: HashSet<&'static str> = NLTK::stopwords(Language::English)
        .map(|words| words.iter().copied().collect())
        .unwrap_or_default();
}

/// Turns raw SMS text into the n-gram features the vectorizer counts.
///
/// Analysis is: lowercase, extract word tokens, drop English stop words, then
/// emit every n-gram in `ngram_range` (inclusive) joined by a single space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analyzer {
    ngram_range: (usize, usize),
    stop_words: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            stop_words: true,
        }
    }
}

impl Analyzer {
    /// Creates an analyzer, rejecting ranges like `(0, 1)` or `(3, 2)`.
    pub fn new(ngram_range: (usize, usize), stop_words: bool) -> Result<Self, ClassifierError> {
        let (min_n, max_n) = ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::ValidationError(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }
        Ok(Self {
            ngram_range,
            stop_words,
        })
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    pub fn removes_stop_words(&self) -> bool {
        self.stop_words
    }

    /// Lowercased word tokens with stop words removed.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !(self.stop_words && ENGLISH_STOP_WORDS.contains(token)))
            .map(str::to_string)
            .collect()
    }

    /// Full feature list for `text`, n-grams included. Repeats are kept so callers can count them.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let (min_n, max_n) = self.ngram_range;

        let mut features = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            if n == 1 {
                features.extend(tokens.iter().cloned());
                continue;
            }
            features.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        features
    }
}
