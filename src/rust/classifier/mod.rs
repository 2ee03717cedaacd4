mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod naive_bayes;
mod tokenizer;
mod utils;
mod vectorizer;

use serde::Serialize;

pub use builder::{ClassDefinition, ClassifierBuilder};
pub use classifier::Classifier;
pub use error::ClassifierError;
pub use naive_bayes::MultinomialNb;
pub use tokenizer::Analyzer;
pub use vectorizer::{SparseVector, TfidfVectorizer};

/// Information about a fitted classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierInfo {
    /// Number of classes the classifier is trained on
    pub num_classes: usize,
    /// Labels of the classes, sorted
    pub class_labels: Vec<String>,
    /// Number of n-gram terms in the TF-IDF vocabulary
    pub vocabulary_size: usize,
    /// Inclusive n-gram range used for features
    pub ngram_range: (usize, usize),
    /// Whether English stop words are removed before n-grams are built
    pub stop_words: bool,
    /// Additive smoothing of the naive Bayes model
    pub alpha: f64,
}
