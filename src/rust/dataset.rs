//! Labeled SMS datasets: CSV loading and the seeded, stratified train/test split.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("Row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error("Dataset is empty")]
    Empty,
    #[error("test_size must be strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),
    #[error("The {side} set size {size} should be greater or equal to the number of classes {n_classes}")]
    SplitTooSmall {
        side: &'static str,
        size: usize,
        n_classes: usize,
    },
    #[error("The least populated class '{label}' has only {count} member(s); at least 2 are needed to stratify")]
    TooFewMembers { label: String, count: usize },
}

/// One training row: an SMS and its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledText {
    pub text: String,
    pub label: String,
}

impl LabeledText {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<LabeledText>,
}

impl Dataset {
    pub fn new(rows: Vec<LabeledText>) -> Self {
        Self { rows }
    }

    /// Loads a CSV file with a header row naming at least the `text` and `label` columns.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }
        info!("Loading dataset from {:?}", path);
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr.headers()?.clone();
        for column in ["text", "label"] {
            if !headers.iter().any(|h| h.trim() == column) {
                return Err(DatasetError::MissingColumn(column));
            }
        }

        let mut rows = Vec::new();
        for (i, record) in rdr.deserialize::<LabeledText>().enumerate() {
            // +2: one for the header, one for 1-based line numbers.
            let row = i + 2;
            let record = record?;
            if record.text.trim().is_empty() {
                return Err(DatasetError::InvalidRow {
                    row,
                    reason: "text is empty".into(),
                });
            }
            if record.label.trim().is_empty() {
                return Err(DatasetError::InvalidRow {
                    row,
                    reason: "label is empty".into(),
                });
            }
            rows.push(LabeledText::new(record.text, record.label.trim()));
        }

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        debug!("Read {} labeled rows", rows.len());
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LabeledText] {
        &self.rows
    }

    pub fn texts(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    /// Number of rows per label, sorted by label.
    pub fn label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Splits into `(train, test)` so that every label keeps roughly the same share
    /// of rows on both sides.
    ///
    /// The test side gets `ceil(n * test_size)` rows and the train side the rest;
    /// both must hold at least one row per label. Test rows are spread over labels
    /// in proportion to their size. Leftover rows go to the labels with the largest
    /// fractional share, ties in label order, and never take a label's last train row.
    ///
    /// Labels are visited in sorted order and each label's rows are shuffled with
    /// one `StdRng` seeded from `seed`, so a given dataset and seed always produce
    /// the same split.
    pub fn stratified_split(&self, test_size: f64, seed: u64) -> Result<(Dataset, Dataset), DatasetError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(DatasetError::InvalidTestSize(test_size));
        }
        if self.rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            groups.entry(row.label.as_str()).or_default().push(i);
        }
        if let Some((label, indices)) = groups.iter().find(|(_, indices)| indices.len() < 2) {
            return Err(DatasetError::TooFewMembers {
                label: label.to_string(),
                count: indices.len(),
            });
        }

        let n = self.rows.len();
        let n_classes = groups.len();
        let n_test = ((n as f64 * test_size).ceil() as usize).min(n);
        let n_train = n - n_test;
        for (side, size) in [("test", n_test), ("train", n_train)] {
            if size < n_classes {
                return Err(DatasetError::SplitTooSmall { side, size, n_classes });
            }
        }

        let counts: Vec<usize> = groups.values().map(Vec::len).collect();
        let test_counts = allocate_test_rows(&counts, n_test);
        debug!("Stratified split: {} train / {} test over {} labels", n_train, n_test, n_classes);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train_indices = Vec::new();
        let mut test_indices = Vec::new();
        for (indices, &take) in groups.values_mut().zip(&test_counts) {
            indices.shuffle(&mut rng);
            test_indices.extend_from_slice(&indices[..take]);
            train_indices.extend_from_slice(&indices[take..]);
        }
        train_indices.sort_unstable();
        test_indices.sort_unstable();

        let pick = |indices: &[usize]| Dataset::new(indices.iter().map(|&i| self.rows[i].clone()).collect());
        Ok((pick(&train_indices), pick(&test_indices)))
    }
}

/// Largest-remainder allocation of `n_test` rows over labels with `counts` rows.
/// Every label keeps at least one row out of the test side.
fn allocate_test_rows(counts: &[usize], n_test: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let mut allocated: Vec<usize> = counts.iter().map(|&c| n_test * c / n).collect();
    let mut remaining = n_test - allocated.iter().sum::<usize>();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse((n_test * counts[i]) % n));
    while remaining > 0 {
        let before = remaining;
        for &i in &order {
            if remaining == 0 {
                break;
            }
            if allocated[i] + 1 < counts[i] {
                allocated[i] += 1;
                remaining -= 1;
            }
        }
        if remaining == before {
            break;
        }
    }
    allocated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_csv() -> String {
        let mut csv = String::from("text,label\n");
        for i in 0..10 {
            csv.push_str(&format!("\"Rs.{}.00 paid to swiggy, order {}\",Food & Dining\n", 100 + i, i));
            csv.push_str(&format!("Rs.{}.00 paid for uber ride {},Transportation\n", 200 + i, i));
        }
        for i in 0..5 {
            csv.push_str(&format!("Rs.{}.00 paid to IRCTC {},Travel\n", 900 + i, i));
        }
        csv
    }

    #[test]
    fn test_load_from_reader() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(dataset.len(), 25);
        assert_eq!(dataset.rows()[0].text, "Rs.100.00 paid to swiggy, order 0");
        assert_eq!(dataset.rows()[0].label, "Food & Dining");

        let counts = dataset.label_counts();
        assert_eq!(counts["Food & Dining"], 10);
        assert_eq!(counts["Travel"], 5);
    }

    #[test]
    fn test_missing_column() {
        let result = Dataset::from_reader("message,label\nhello there,Food\n".as_bytes());
        assert!(matches!(result, Err(DatasetError::MissingColumn("text"))));
    }

    #[test]
    fn test_blank_fields_rejected() {
        let result = Dataset::from_reader("text,label\nswiggy order,Food\n  ,Food\n".as_bytes());
        assert!(matches!(result, Err(DatasetError::InvalidRow { row: 3, .. })));

        let result = Dataset::from_reader("text,label\nswiggy order,\n".as_bytes());
        assert!(matches!(result, Err(DatasetError::InvalidRow { row: 2, .. })));
    }

    #[test]
    fn test_malformed_row() {
        let result = Dataset::from_reader("text,label\nswiggy order,Food,extra\n".as_bytes());
        assert!(matches!(result, Err(DatasetError::Csv(_))));
    }

    #[test]
    fn test_empty_and_missing_file() {
        assert!(matches!(
            Dataset::from_reader("text,label\n".as_bytes()),
            Err(DatasetError::Empty)
        ));
        assert!(matches!(
            Dataset::from_csv("/definitely/not/here.csv"),
            Err(DatasetError::NotFound(_))
        ));
    }

    #[test]
    fn test_stratified_split_keeps_class_balance() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();
        let (train, test) = dataset.stratified_split(0.2, 42).unwrap();

        assert_eq!(train.len() + test.len(), dataset.len());
        let test_counts = test.label_counts();
        assert_eq!(test_counts["Food & Dining"], 2);
        assert_eq!(test_counts["Transportation"], 2);
        assert_eq!(test_counts["Travel"], 1);
        assert_eq!(train.label_counts()["Travel"], 4);
    }

    #[test]
    fn test_split_sizes_follow_test_fraction() {
        let mut rows = Vec::new();
        for label in ["A", "B", "C", "D", "E", "F", "G"] {
            for i in 0..12 {
                rows.push(LabeledText::new(format!("{} sample {}", label, i), label));
            }
        }
        let dataset = Dataset::new(rows);
        let (train, test) = dataset.stratified_split(0.2, 42).unwrap();

        assert_eq!(test.len(), 17);
        assert_eq!(train.len(), 67);
        let test_counts = test.label_counts();
        assert_eq!(test_counts["A"], 3);
        assert_eq!(test_counts["C"], 3);
        assert_eq!(test_counts["D"], 2);
        assert_eq!(test_counts["G"], 2);
    }

    #[test]
    fn test_split_smaller_than_label_count_fails() {
        let mut rows = Vec::new();
        for label in ["A", "B", "C", "D", "E"] {
            rows.push(LabeledText::new("first", label));
            rows.push(LabeledText::new("second", label));
        }
        let dataset = Dataset::new(rows);
        assert!(matches!(
            dataset.stratified_split(0.2, 42),
            Err(DatasetError::SplitTooSmall { side: "test", size: 2, n_classes: 5 })
        ));
        assert!(matches!(
            dataset.stratified_split(0.8, 42),
            Err(DatasetError::SplitTooSmall { side: "train", size: 2, n_classes: 5 })
        ));
    }

    #[test]
    fn test_allocation_keeps_a_train_row_per_label() {
        assert_eq!(allocate_test_rows(&[12, 12, 12], 7), vec![3, 2, 2]);
        assert_eq!(allocate_test_rows(&[2, 2, 6], 6), vec![1, 1, 4]);
        assert_eq!(allocate_test_rows(&[10, 10, 5], 5), vec![2, 2, 1]);
    }

    #[test]
    fn test_stratified_split_is_deterministic() {
        let dataset = Dataset::from_reader(sample_csv().as_bytes()).unwrap();
        let first = dataset.stratified_split(0.2, 42).unwrap();
        let second = dataset.stratified_split(0.2, 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_errors() {
        let dataset = Dataset::new(vec![
            LabeledText::new("swiggy", "Food"),
            LabeledText::new("zomato", "Food"),
            LabeledText::new("irctc", "Travel"),
        ]);
        assert!(matches!(
            dataset.stratified_split(0.2, 42),
            Err(DatasetError::TooFewMembers { count: 1, .. })
        ));
        assert!(matches!(dataset.stratified_split(0.0, 42), Err(DatasetError::InvalidTestSize(_))));
        assert!(matches!(dataset.stratified_split(1.0, 42), Err(DatasetError::InvalidTestSize(_))));
    }
}
