use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::builder::ClassifierBuilder;
use super::error::ClassifierError;
use super::naive_bayes::MultinomialNb;
use super::vectorizer::TfidfVectorizer;
use super::ClassifierInfo;

/// A fitted TF-IDF + multinomial naive Bayes pipeline.
///
/// # Thread Safety
///
/// The pipeline is immutable once built and prediction never mutates it, so a
/// single instance can be shared across threads behind an `Arc` with no locking.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use upi_sms_classifier::{Classifier, ClassDefinition};
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(Classifier::builder()
///     .add_class(ClassDefinition::new("Shopping").with_examples(vec!["flipkart order"]))?
///     .add_class(ClassDefinition::new("Travel").with_examples(vec!["irctc ticket"]))?
///     .build()?);
///
/// let classifier_clone = Arc::clone(&classifier);
/// thread::spawn(move || {
///     classifier_clone.predict("flipkart sale").unwrap();
/// }).join().unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::new()
    }

    pub(crate) fn from_parts(vectorizer: TfidfVectorizer, model: MultinomialNb) -> Self {
        Self { vectorizer, model }
    }

    /// Returns information about the fitted pipeline
    pub fn info(&self) -> ClassifierInfo {
        let analyzer = self.vectorizer.analyzer();
        ClassifierInfo {
            num_classes: self.model.classes().len(),
            class_labels: self.model.classes().to_vec(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
            ngram_range: analyzer.ngram_range(),
            stop_words: analyzer.removes_stop_words(),
            alpha: self.model.alpha(),
        }
    }

    /// Every label the classifier can return, sorted.
    pub fn labels(&self) -> &[String] {
        self.model.classes()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &MultinomialNb {
        &self.model
    }

    /// Number of word tokens left in `text` after lowercasing and stop-word removal.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.vectorizer.analyzer().tokens(text).len()
    }

    fn validate_input(text: &str) -> Result<&str, ClassifierError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }
        Ok(text)
    }

    /// Predicts the category of `text` and returns the probability of every class.
    ///
    /// # Returns
    /// A tuple containing:
    /// * The predicted class label
    /// * A HashMap of class labels to posterior probabilities (summing to 1.0)
    pub fn predict(&self, text: &str) -> Result<(String, HashMap<String, f64>), ClassifierError> {
        let text = Self::validate_input(text)?;
        let row = self.vectorizer.transform(text);

        let label = self.model.predict(&row)?.to_string();
        let proba = self.model.predict_proba(&row)?;
        let scores = self
            .model
            .classes()
            .iter()
            .cloned()
            .zip(proba.iter().copied())
            .collect();

        Ok((label, scores))
    }

    /// All classes ordered from most to least probable. Equal probabilities keep label order,
    /// so the first entry always matches [`predict`](Self::predict).
    pub fn rank(&self, text: &str) -> Result<Vec<(String, f64)>, ClassifierError> {
        let text = Self::validate_input(text)?;
        let row = self.vectorizer.transform(text);
        let proba = self.model.predict_proba(&row)?;

        let mut ranked: Vec<(String, f64)> = self
            .model
            .classes()
            .iter()
            .cloned()
            .zip(proba.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    pub fn predict_label(&self, text: &str) -> Result<String, ClassifierError> {
        let text = Self::validate_input(text)?;
        let row = self.vectorizer.transform(text);
        Ok(self.model.predict(&row)?.to_string())
    }

    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>, ClassifierError> {
        texts.iter().map(|t| self.predict_label(t.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassDefinition;

    fn setup_test_classifier() -> Classifier {
        Classifier::builder()
            .add_class(
                ClassDefinition::new("Food & Dining")
                    .with_examples(vec!["paid to zomato for dinner", "swiggy order paid"]),
            )
            .unwrap()
            .add_class(
                ClassDefinition::new("Transportation")
                    .with_examples(vec!["uber ride payment", "ola cab ride fare"]),
            )
            .unwrap()
            .build()
            .expect("Failed to create classifier")
    }

    #[test]
    fn test_class_info() {
        let classifier = setup_test_classifier();
        let info = classifier.info();
        assert_eq!(info.num_classes, 2);
        assert_eq!(info.class_labels, vec!["Food & Dining", "Transportation"]);
        assert_eq!(info.ngram_range, (1, 2));
        assert!(info.vocabulary_size > 0);
    }

    #[test]
    fn test_prediction_validation() {
        let classifier = setup_test_classifier();
        assert!(matches!(classifier.predict(""), Err(ClassifierError::ValidationError(_))));
        assert!(matches!(classifier.predict("  \n "), Err(ClassifierError::ValidationError(_))));
    }

    #[test]
    fn test_predict_and_rank_agree() {
        let classifier = setup_test_classifier();
        let (label, scores) = classifier.predict("zomato dinner").unwrap();
        assert_eq!(label, "Food & Dining");

        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-9);

        let ranked = classifier.rank("zomato dinner").unwrap();
        assert_eq!(ranked[0].0, label);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_unseen_text_still_returns_known_label() {
        let classifier = setup_test_classifier();
        let (label, _) = classifier.predict("xyzzy plugh").unwrap();
        assert!(classifier.labels().contains(&label));
    }

    #[test]
    fn test_predict_batch() {
        let classifier = setup_test_classifier();
        let labels = classifier.predict_batch(&["uber ride", "swiggy order"]).unwrap();
        assert_eq!(labels, vec!["Transportation", "Food & Dining"]);
    }

    #[test]
    fn test_count_tokens() {
        let classifier = setup_test_classifier();
        assert_eq!(classifier.count_tokens("paid to the uber driver"), 3);
    }
}
