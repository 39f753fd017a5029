//! Drone/Bird Inference Engine
//!
//! Standardizes feature vectors, classifies them with a seeded decision forest, and
//! composes the full ingest -> extract -> scale -> classify pipeline.

mod bootstrap;
mod engine;
mod forest;
mod scaler;
mod service;

pub use bootstrap::{bootstrap_training_set, TargetClass, BIRD_EXEMPLARS, DRONE_EXEMPLARS};
pub use engine::{ClassProbability, ClassifierModel, ModelBundle, Prediction};
pub use forest::{DecisionTree, ForestConfig, RandomForest};
pub use scaler::{ScalerState, StandardScaler};
pub use service::{ClassificationOutcome, ClassificationService, ServiceError};

use thiserror::Error;

/// Errors during fitting and inference
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Model is not trained; initialize the model bundle before predicting")]
    ModelNotInitialized,
    #[error("Training set is empty")]
    EmptyTrainingSet,
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Feature column {index} has degenerate standard deviation {std}")]
    DegenerateFeature { index: usize, std: f64 },
    #[error("Label {label} is outside the {n_classes} known classes")]
    InvalidLabel { label: usize, n_classes: usize },
}
