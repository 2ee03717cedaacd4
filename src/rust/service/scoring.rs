use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Serialize;

use crate::classifier::{Classifier, ClassifierError};

/// Alternatives offered by [`ScoringMode::Legacy`], whatever the text says.
pub const LEGACY_ALTERNATIVES: [&str; 4] = ["Food & Dining", "Shopping", "Transportation", "Entertainment"];

pub const MAX_ALTERNATIVES: usize = 3;

/// How `confidence` and `alternatives` are filled in for a categorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Top-class probability and the next most probable classes.
    Model,
    /// A random confidence in [0.75, 0.95] and a fixed list of alternatives.
    #[default]
    Legacy,
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(ScoringMode::Model),
            "legacy" => Ok(ScoringMode::Legacy),
            other => Err(format!("unknown scoring mode '{}'", other)),
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Model => f.write_str("model"),
            ScoringMode::Legacy => f.write_str("legacy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorization {
    pub category: String,
    pub confidence: f64,
    pub alternatives: Vec<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Categorizes `text`. `rng` is only drawn from in legacy mode.
pub fn categorize<R: Rng>(
    classifier: &Classifier,
    text: &str,
    mode: ScoringMode,
    rng: &mut R,
) -> Result<Categorization, ClassifierError> {
    match mode {
        ScoringMode::Model => {
            let mut ranked = classifier.rank(text)?.into_iter();
            let (category, probability) = ranked
                .next()
                .ok_or_else(|| ClassifierError::PredictionError("Classifier has no classes".into()))?;
            Ok(Categorization {
                category,
                confidence: round2(probability),
                alternatives: ranked.take(MAX_ALTERNATIVES).map(|(label, _)| label).collect(),
            })
        }
        ScoringMode::Legacy => {
            let category = classifier.predict_label(text)?;
            let alternatives = LEGACY_ALTERNATIVES
                .iter()
                .filter(|alt| **alt != category)
                .take(MAX_ALTERNATIVES)
                .map(|alt| alt.to_string())
                .collect();
            Ok(Categorization {
                confidence: round2(rng.random_range(0.75..=0.95)),
                category,
                alternatives,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassDefinition;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn classifier() -> Classifier {
        Classifier::builder()
            .add_class(ClassDefinition::new("Food & Dining").with_examples(vec!["zomato order", "swiggy dinner"]))
            .unwrap()
            .add_class(ClassDefinition::new("Shopping").with_examples(vec!["flipkart order", "myntra shoes"]))
            .unwrap()
            .add_class(ClassDefinition::new("Travel").with_examples(vec!["irctc ticket", "flight booking"]))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_model_mode_uses_probabilities() {
        let classifier = classifier();
        let mut rng = StdRng::seed_from_u64(0);
        let result = categorize(&classifier, "zomato dinner", ScoringMode::Model, &mut rng).unwrap();

        let ranked = classifier.rank("zomato dinner").unwrap();
        assert_eq!(result.category, "Food & Dining");
        assert_eq!(result.confidence, round2(ranked[0].1));
        let expected: Vec<String> = ranked[1..].iter().map(|(label, _)| label.clone()).collect();
        assert_eq!(result.alternatives, expected);
        assert!(!result.alternatives.contains(&result.category));
    }

    #[test]
    fn test_legacy_mode_confidence_and_alternatives() {
        let classifier = classifier();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let result = categorize(&classifier, "zomato dinner", ScoringMode::Legacy, &mut rng).unwrap();
            assert!((0.75..=0.95).contains(&result.confidence));
            assert_eq!(result.alternatives, vec!["Shopping", "Transportation", "Entertainment"]);
        }

        let result = categorize(&classifier, "irctc ticket", ScoringMode::Legacy, &mut rng).unwrap();
        assert_eq!(result.category, "Travel");
        assert_eq!(result.alternatives, vec!["Food & Dining", "Shopping", "Transportation"]);
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = categorize(&classifier(), "  ", ScoringMode::Model, &mut rng).unwrap_err();
        assert!(matches!(err, ClassifierError::ValidationError(_)));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Legacy".parse::<ScoringMode>().unwrap(), ScoringMode::Legacy);
        assert_eq!("model".parse::<ScoringMode>().unwrap(), ScoringMode::Model);
        assert!("random".parse::<ScoringMode>().is_err());
        assert_eq!(ScoringMode::default().to_string(), "legacy");
    }
}
