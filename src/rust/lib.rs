//! Categorizes UPI bank SMS alerts into spending categories with a TF-IDF +
//! multinomial naive Bayes pipeline, and serves it over HTTP.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use upi_sms_classifier::{Classifier, ClassDefinition};
//!
//! let classifier = Classifier::builder()
//!     .add_class(
//!         ClassDefinition::new("Food & Dining")
//!             .with_examples(vec!["paid to zomato", "swiggy order delivered"])
//!     )?
//!     .add_class(
//!         ClassDefinition::new("Travel")
//!             .with_examples(vec!["irctc ticket booked", "flight booking makemytrip"])
//!     )?
//!     .build()?;
//!
//! let (label, scores) = classifier.predict("Rs.560.00 made to Zomato")?;
//! assert_eq!(label, "Food & Dining");
//! assert_eq!(scores.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Persistence
//!
//! A fitted classifier is saved as a checksummed JSON artifact and loaded back
//! with [`ModelManager`]:
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use upi_sms_classifier::ModelManager;
//!
//! let classifier = ModelManager::load(Path::new("upi_sms_model.json"))?;
//! println!("{:?}", classifier.labels());
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod dataset;
pub mod forecast;
pub mod metrics;
pub mod model_manager;
mod runtime;
pub mod service;
pub mod smoke;
pub mod sms;
pub mod training;

pub use classifier::{Analyzer, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, ClassDefinition};
pub use dataset::{Dataset, DatasetError, LabeledText};
pub use metrics::ClassificationReport;
pub use model_manager::{ModelError, ModelManager};
pub use runtime::{create_runtime, RuntimeConfig};
pub use service::{AppState, ScoringMode};
pub use training::{TrainingConfig, TrainingOutcome};

pub fn init_logger() {
    env_logger::init();
}
