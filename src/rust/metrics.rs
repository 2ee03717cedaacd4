//! Held-out evaluation: accuracy and a per-class precision/recall/F1 report.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Fraction of positions where `predicted` matches `truth`. Empty input scores 0.
pub fn accuracy<T: AsRef<str>, P: AsRef<str>>(truth: &[T], predicted: &[P]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| {
            let (t, p): (&str, &str) = (t.as_ref(), p.as_ref());
            t == p
        })
        .count();
    correct as f64 / truth.len() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Averages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics over the union of true and predicted labels, plus
/// macro and support-weighted averages. Any ratio with a zero denominator is 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: Averages,
    pub weighted_avg: Averages,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ClassificationReport {
    pub fn new<T: AsRef<str>, P: AsRef<str>>(truth: &[T], predicted: &[P]) -> Self {
        let labels: BTreeSet<&str> = truth
            .iter()
            .map(AsRef::as_ref)
            .chain(predicted.iter().map(AsRef::as_ref))
            .collect();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let mut tp = 0;
                let mut predicted_count = 0;
                let mut support = 0;
                for (t, p) in truth.iter().zip(predicted) {
                    let (t, p): (&str, &str) = (t.as_ref(), p.as_ref());
                    if t == label {
                        support += 1;
                    }
                    if p == label {
                        predicted_count += 1;
                        if t == label {
                            tp += 1;
                        }
                    }
                }
                let precision = ratio(tp, predicted_count);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total_support: usize = classes.iter().map(|c| c.support).sum();
        let n_classes = classes.len().max(1) as f64;
        let macro_avg = Averages {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n_classes,
            support: total_support,
        };
        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total_support == 0 {
                0.0
            } else {
                classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total_support as f64
            }
        };
        let weighted_avg = Averages {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total_support,
        };

        Self {
            accuracy: accuracy(truth, predicted),
            classes,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(0);

        writeln!(f, "{:>width$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&["a", "b", "a", "c"], &["a", "b", "b", "c"]), 0.75);
        let empty: [&str; 0] = [];
        assert_eq!(accuracy(&empty, &empty), 0.0);
    }

    #[test]
    fn test_report_per_class() {
        let truth = ["Food", "Food", "Travel", "Travel"];
        let predicted = ["Food", "Travel", "Travel", "Travel"];
        let report = ClassificationReport::new(&truth, &predicted);

        let food = &report.classes[0];
        assert_eq!(food.label, "Food");
        assert_eq!(food.precision, 1.0);
        assert_eq!(food.recall, 0.5);
        assert!((food.f1 - 2.0 / 3.0).abs() < 1e-12);

        let travel = &report.classes[1];
        assert!((travel.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(travel.recall, 1.0);
        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.weighted_avg.support, 4);
    }

    #[test]
    fn test_predicted_only_label_has_zero_metrics() {
        let report = ClassificationReport::new(&["Food"], &["Bills"]);
        let bills = report.classes.iter().find(|c| c.label == "Bills").unwrap();
        assert_eq!(bills.support, 0);
        assert_eq!(bills.recall, 0.0);
        assert_eq!(bills.f1, 0.0);
    }

    #[test]
    fn test_display_lists_every_class() {
        let report = ClassificationReport::new(&["Food", "Travel"], &["Food", "Travel"]);
        let text = report.to_string();
        assert!(text.contains("Food"));
        assert!(text.contains("Travel"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("1.00"));
    }
}
