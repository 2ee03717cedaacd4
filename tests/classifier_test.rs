use std::sync::Arc;
use std::thread;

use upi_sms_classifier::{
    smoke, training, Classifier, ClassifierError, Dataset, ModelManager, TrainingConfig,
};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/upi_dataset.csv");

fn setup_full_classifier() -> Classifier {
    let dataset = Dataset::from_csv(FIXTURE).expect("fixture dataset loads");
    training::fit(&dataset, &TrainingConfig::default()).expect("Failed to create classifier")
}

#[test]
fn test_fixture_shape() {
    let dataset = Dataset::from_csv(FIXTURE).unwrap();
    let counts = dataset.label_counts();
    assert_eq!(counts.len(), 7);
    assert!(counts.values().all(|&n| n >= 10));
}

#[test]
fn test_zomato_is_food() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_full_classifier();
    let (label, scores) = classifier.predict("Rs.560.00 made to Zomato")?;

    assert_eq!(label, "Food & Dining");
    let total: f64 = scores.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_predictions_stay_in_label_set() {
    let classifier = setup_full_classifier();
    let labels = classifier.labels().to_vec();
    let inputs = [
        "Rs.250.00 debited towards ola ride via UPI.",
        "completely unrelated words here",
        "12345",
        "₹ 99",
    ];
    for text in inputs {
        let label = classifier.predict_label(text).unwrap();
        assert!(labels.contains(&label), "{} not in {:?}", label, labels);
    }
}

#[test]
fn test_smoke_samples_all_predict() {
    let classifier = setup_full_classifier();
    let mut out = Vec::new();
    smoke::run_smoke(&classifier, &mut out).unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(printed.matches("Predicted Category:").count(), smoke::SAMPLE_MESSAGES.len());
    assert_eq!(smoke::SAMPLE_MESSAGES.len(), 17);
}

#[test]
fn test_empty_input_rejected() {
    let classifier = setup_full_classifier();
    assert!(matches!(classifier.predict("   "), Err(ClassifierError::ValidationError(_))));
}

#[test]
fn test_thread_safety() {
    let classifier = Arc::new(setup_full_classifier());
    let expected = classifier.predict_label("IRCTC train ticket").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let classifier = Arc::clone(&classifier);
            let expected = expected.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    assert_eq!(classifier.predict_label("IRCTC train ticket").unwrap(), expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_training_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = TrainingConfig {
        data_path: FIXTURE.into(),
        output_path: dir.path().join("model.json"),
        ..TrainingConfig::default()
    };

    let first = training::train(&config)?;
    assert_eq!(first.train_size, 67);
    assert_eq!(first.test_size, 17);
    assert!((0.0..=1.0).contains(&first.accuracy()));

    let second = training::train(&config)?;
    assert_eq!(first.classifier, second.classifier);

    let loaded = ModelManager::load(&config.output_path)?;
    let original = first.classifier.predict_batch(smoke::SAMPLE_MESSAGES)?;
    let reloaded = loaded.predict_batch(smoke::SAMPLE_MESSAGES)?;
    assert_eq!(original, reloaded);
    Ok(())
}
