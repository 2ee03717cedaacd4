use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::tokenizer::Analyzer;
use super::utils::normalize_sparse;

/// Sparse feature row: `(vocabulary index, weight)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// TF-IDF vectorizer over the n-gram features produced by an [`Analyzer`].
///
/// The vocabulary is sorted lexicographically and every term's column is its
/// rank, so two fits over the same corpus always produce the same columns.
/// IDF is smoothed as if one extra document contained every term:
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    min_df: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(Analyzer::default())
    }
}

impl TfidfVectorizer {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            min_df: 1,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    /// Terms seen in fewer than `min_df` training documents are left out of the vocabulary.
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn min_df(&self) -> usize {
        self.min_df
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Learns the vocabulary and IDF weights from `documents`.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<(), ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::BuildError(
                "Cannot fit a vectorizer on an empty corpus".into(),
            ));
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let unique: HashSet<String> = self.analyzer.analyze(document.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n_documents = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::new();
        for (term, df) in document_frequency {
            if df < self.min_df {
                continue;
            }
            vocabulary.insert(term, idf.len());
            idf.push(((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0);
        }

        if vocabulary.is_empty() {
            return Err(ClassifierError::BuildError(
                "Empty vocabulary; the documents may only contain stop words".into(),
            ));
        }

        debug!(
            "Fitted TF-IDF vocabulary of {} terms over {} documents",
            vocabulary.len(),
            documents.len()
        );
        self.vocabulary = vocabulary;
        self.idf = idf;
        Ok(())
    }

    /// Maps `text` to an L2-normalized TF-IDF row. Unknown terms are ignored, so
    /// a text with no known terms maps to the empty vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for feature in self.analyzer.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&feature) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();
        normalize_sparse(&mut row);
        row
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>, ClassifierError> {
        self.fit(documents)?;
        Ok(documents.iter().map(|d| self.transform(d.as_ref())).collect())
    }
}
