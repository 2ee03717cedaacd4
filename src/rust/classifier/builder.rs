use std::collections::BTreeMap;

use log::info;

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::naive_bayes::MultinomialNb;
use super::tokenizer::Analyzer;
use super::vectorizer::TfidfVectorizer;
use crate::dataset::LabeledText;

const MAX_CLASSES: usize = 100;

/// A category and the example messages that teach the classifier what it looks like.
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    /// The category name returned by predictions, e.g. "Food & Dining"
    pub label: String,
    /// Example texts that belong to this category
    pub examples: Option<Vec<String>>,
}

impl ClassDefinition {
    /// Creates a new class definition with no examples yet
    ///
    /// # Example
    /// ```
    /// use upi_sms_classifier::ClassDefinition;
    ///
    /// let class = ClassDefinition::new("Food & Dining");
    /// assert!(class.examples.is_none());
    /// ```
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            examples: None,
        }
    }

    /// Adds examples to the class definition
    ///
    /// # Example
    /// ```
    /// use upi_sms_classifier::ClassDefinition;
    ///
    /// let class = ClassDefinition::new("Travel").with_examples(vec![
    ///     "Rs.1350.00 paid to IRCTC",
    ///     "Flight booking on makemytrip@upi",
    /// ]);
    /// assert_eq!(class.examples.unwrap().len(), 2);
    /// ```
    pub fn with_examples(mut self, examples: Vec<impl Into<String>>) -> Self {
        self.examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }
}

/// A builder for fitting a [`Classifier`] with a fluent interface.
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use upi_sms_classifier::{Classifier, ClassDefinition};
///
/// let classifier = Classifier::builder()
///     .with_alpha(0.5)
///     .add_class(ClassDefinition::new("Food & Dining").with_examples(vec!["paid to zomato"]))?
///     .add_class(ClassDefinition::new("Transportation").with_examples(vec!["uber ride payment"]))?
///     .build()?;
///
/// let (label, _) = classifier.predict("zomato order")?;
/// assert_eq!(label, "Food & Dining");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClassifierBuilder {
    ngram_range: (usize, usize),
    stop_words: bool,
    min_df: usize,
    alpha: f64,
    class_examples: BTreeMap<String, Vec<String>>,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierBuilder {
    /// Creates a builder with unigram+bigram features, English stop words removed and `alpha = 1.0`
    pub fn new() -> Self {
        Self {
            ngram_range: (1, 2),
            stop_words: true,
            min_df: 1,
            alpha: 1.0,
            class_examples: BTreeMap::new(),
        }
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    pub fn with_stop_words(mut self, remove: bool) -> Self {
        self.stop_words = remove;
        self
    }

    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Sets the additive smoothing parameter of the naive Bayes model
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Validates class data according to the following rules:
    /// - Label must not be blank
    /// - Must have at least one example
    /// - No example text can be blank
    fn validate_class_data(label: &str, examples: &[impl AsRef<str>]) -> Result<(), ClassifierError> {
        if label.trim().is_empty() {
            return Err(ClassifierError::ValidationError("Class label cannot be empty".into()));
        }
        if examples.is_empty() {
            return Err(ClassifierError::ValidationError(format!(
                "Class '{}' must have at least one example",
                label
            )));
        }
        if let Some(pos) = examples.iter().position(|e| e.as_ref().trim().is_empty()) {
            return Err(ClassifierError::ValidationError(format!(
                "Example {} of class '{}' cannot be empty",
                pos + 1,
                label
            )));
        }
        Ok(())
    }

    fn ensure_capacity_for(&self, label: &str) -> Result<(), ClassifierError> {
        if !self.class_examples.contains_key(label) && self.class_examples.len() >= MAX_CLASSES {
            return Err(ClassifierError::ValidationError(format!(
                "Maximum number of classes ({}) exceeded",
                MAX_CLASSES
            )));
        }
        Ok(())
    }

    /// Adds a whole class at once. Adding the same label twice is an error.
    pub fn add_class(mut self, class: ClassDefinition) -> Result<Self, ClassifierError> {
        let examples = class.examples.unwrap_or_default();
        Self::validate_class_data(&class.label, &examples)?;

        if self.class_examples.contains_key(&class.label) {
            return Err(ClassifierError::ValidationError(format!(
                "Class '{}' was already added",
                class.label
            )));
        }
        self.ensure_capacity_for(&class.label)?;

        self.class_examples.insert(class.label, examples);
        Ok(self)
    }

    /// Adds labeled rows, grouping them into classes by label. Rows for a label
    /// that already exists are appended to it.
    pub fn add_examples(mut self, examples: &[LabeledText]) -> Result<Self, ClassifierError> {
        for example in examples {
            Self::validate_class_data(&example.label, &[example.text.as_str()])?;
            self.ensure_capacity_for(&example.label)?;
            self.class_examples
                .entry(example.label.clone())
                .or_default()
                .push(example.text.clone());
        }
        Ok(self)
    }

    /// Fits the vectorizer and the naive Bayes model and returns the finished pipeline
    ///
    /// # Errors
    /// - `BuildError` if no classes were added or the corpus has no usable terms
    /// - `ValidationError` if the n-gram range or alpha is invalid
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        if self.class_examples.is_empty() {
            return Err(ClassifierError::BuildError("At least one class must be added".to_string()));
        }

        let analyzer = Analyzer::new(self.ngram_range, self.stop_words)?;
        let mut vectorizer = TfidfVectorizer::new(analyzer).with_min_df(self.min_df);

        let (documents, labels): (Vec<&str>, Vec<String>) = self
            .class_examples
            .iter()
            .flat_map(|(label, examples)| examples.iter().map(move |text| (text.as_str(), label.clone())))
            .unzip();

        let rows = vectorizer.fit_transform(&documents)?;
        let model = MultinomialNb::fit(&rows, &labels, vectorizer.vocabulary_size(), self.alpha)?;

        info!(
            "Fitted classifier: {} classes, {} examples, {} features",
            model.classes().len(),
            documents.len(),
            vectorizer.vocabulary_size()
        );

        Ok(Classifier::from_parts(vectorizer, model))
    }
}
