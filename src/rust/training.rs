//! End-to-end training run: load, split, fit, evaluate, persist.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::classifier::{Classifier, ClassifierError};
use crate::dataset::Dataset;
use crate::metrics::ClassificationReport;
use crate::model_manager::ModelManager;

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub alpha: f64,
    pub ngram_range: (usize, usize),
    pub min_df: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/upi_dataset.csv"),
            output_path: PathBuf::from("upi_sms_model.json"),
            test_size: 0.2,
            seed: 42,
            alpha: 1.0,
            ngram_range: (1, 2),
            min_df: 1,
        }
    }
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub classifier: Classifier,
    pub report: ClassificationReport,
    pub train_size: usize,
    pub test_size: usize,
    pub artifact_path: PathBuf,
}

impl TrainingOutcome {
    pub fn accuracy(&self) -> f64 {
        self.report.accuracy
    }
}

/// Fits the TF-IDF + naive Bayes pipeline on every row of `dataset`.
pub fn fit(dataset: &Dataset, config: &TrainingConfig) -> Result<Classifier, ClassifierError> {
    Classifier::builder()
        .with_ngram_range(config.ngram_range.0, config.ngram_range.1)
        .with_min_df(config.min_df)
        .with_alpha(config.alpha)
        .add_examples(dataset.rows())?
        .build()
}

/// Runs a full training pass. Evaluation is reported, never enforced; the
/// artifact is written only after everything before it succeeded.
pub fn train(config: &TrainingConfig) -> Result<TrainingOutcome> {
    let dataset = Dataset::from_csv(&config.data_path)
        .with_context(|| format!("Failed to load dataset {:?}", config.data_path))?;
    info!("Dataset shape: ({}, 2)", dataset.len());
    for (label, count) in dataset.label_counts() {
        debug!("  {}: {} rows", label, count);
    }

    let (train_set, test_set) = dataset
        .stratified_split(config.test_size, config.seed)
        .context("Failed to split dataset")?;
    info!(
        "Split {} rows into {} train / {} test (seed {})",
        dataset.len(),
        train_set.len(),
        test_set.len(),
        config.seed
    );

    let classifier = fit(&train_set, config).context("Failed to fit classifier")?;

    let predicted = classifier
        .predict_batch(&test_set.texts())
        .context("Failed to evaluate classifier")?;
    let report = ClassificationReport::new(&test_set.labels(), &predicted);
    info!("Held-out accuracy: {:.4}", report.accuracy);

    ModelManager::save(&classifier, &config.output_path)
        .with_context(|| format!("Failed to save model to {:?}", config.output_path))?;
    info!("Model saved as {:?}", config.output_path);

    Ok(TrainingOutcome {
        classifier,
        report,
        train_size: train_set.len(),
        test_size: test_set.len(),
        artifact_path: config.output_path.clone(),
    })
}
