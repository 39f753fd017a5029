//! Classifier Model and Model Bundle

use crate::bootstrap::{bootstrap_training_set, TargetClass};
use crate::forest::{ForestConfig, RandomForest};
use crate::scaler::{ScalerState, StandardScaler};
use crate::InferenceError;
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Probability assigned to one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub class: TargetClass,
    pub probability: f64,
}

/// Prediction result from inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Most probable class
    pub label: TargetClass,
    /// Probability of `label` as a percentage (0 to 100)
    pub confidence: f64,
    /// Probabilities for each class, in [`TargetClass::ALL`] order
    pub probabilities: Vec<ClassProbability>,
}

/// Decision forest over standardized features, labelled with [`TargetClass`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierModel {
    forest: RandomForest,
}

impl ClassifierModel {
    /// Train on standardized features
    pub fn train(
        standardized: &[FeatureVector],
        labels: &[TargetClass],
        config: ForestConfig,
    ) -> Result<Self, InferenceError> {
        let indices: Vec<usize> = labels.iter().map(TargetClass::index).collect();
        let mut forest = RandomForest::new(config);
        forest.train(standardized, &indices, TargetClass::ALL.len())?;
        Ok(Self { forest })
    }

    /// Per-class probabilities for a standardized vector
    pub fn predict_proba(&self, standardized: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        self.forest.predict_proba(standardized)
    }

    /// Pick the most probable class. Ties go to the class listed first.
    pub fn predict_class(&self, standardized: &FeatureVector) -> Result<Prediction, InferenceError> {
        let proba = self.predict_proba(standardized)?;

        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }

        let prediction = Prediction {
            label: TargetClass::ALL[best],
            confidence: (proba[best] * 100.0).clamp(0.0, 100.0),
            probabilities: TargetClass::ALL
                .iter()
                .zip(&proba)
                .map(|(&class, &probability)| ClassProbability { class, probability })
                .collect(),
        };

        debug!(
            "Prediction: {} (conf={:.2}%)",
            prediction.label, prediction.confidence
        );
        Ok(prediction)
    }

    /// Underlying forest
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

/// Scaler and classifier fitted together on one training set.
///
/// Built once, then shared read-only; the classifier's thresholds only make sense
/// against this exact scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    scaler: ScalerState,
    classifier: ClassifierModel,
}

impl ModelBundle {
    /// Fit the scaler, then train the forest on the scaled features
    pub fn fit(
        features: &[FeatureVector],
        labels: &[TargetClass],
        config: ForestConfig,
    ) -> Result<Self, InferenceError> {
        let scaler = StandardScaler::fit(features)?;
        let standardized = scaler.transform_all(features);
        let classifier = ClassifierModel::train(&standardized, labels, config)?;
        Ok(Self { scaler, classifier })
    }

    /// Fit on the built-in exemplar set and publish the finished bundle
    pub fn bootstrap(config: ForestConfig) -> Result<Arc<Self>, InferenceError> {
        let (features, labels) = bootstrap_training_set();
        info!(
            "Fitting model bundle on {} bootstrap exemplars ({} trees, seed={})",
            features.len(),
            config.n_estimators,
            config.seed
        );
        Ok(Arc::new(Self::fit(&features, &labels, config)?))
    }

    /// Fitted scaler
    pub fn scaler(&self) -> &ScalerState {
        &self.scaler
    }

    /// Trained classifier
    pub fn classifier(&self) -> &ClassifierModel {
        &self.classifier
    }

    /// Standardize raw features
    pub fn standardize(&self, features: &FeatureVector) -> FeatureVector {
        self.scaler.transform(features)
    }

    /// Standardize and classify raw features
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, InferenceError> {
        self.classifier.predict_class(&self.standardize(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{BIRD_EXEMPLARS, DRONE_EXEMPLARS};

    fn bundle() -> Arc<ModelBundle> {
        ModelBundle::bootstrap(ForestConfig::default()).unwrap()
    }

    #[test]
    fn test_drone_exemplar_is_drone() {
        let prediction = bundle()
            .predict(&FeatureVector::new([0.8, 5.2, 120.0, 0.9, 0.7, 150.0, 0.8]))
            .unwrap();
        assert_eq!(prediction.label, TargetClass::Drone);
        assert!(prediction.confidence > 50.0);
    }

    #[test]
    fn test_every_exemplar_matches_its_label() {
        let bundle = bundle();
        for row in DRONE_EXEMPLARS {
            assert_eq!(bundle.predict(&FeatureVector::new(row)).unwrap().label, TargetClass::Drone);
        }
        for row in BIRD_EXEMPLARS {
            assert_eq!(bundle.predict(&FeatureVector::new(row)).unwrap().label, TargetClass::Bird);
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let prediction = bundle()
            .predict(&FeatureVector::new([0.5, 3.5, 90.0, 0.6, 0.5, 110.0, 0.5]))
            .unwrap();
        let total: f64 = prediction.probabilities.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&prediction.confidence));
        assert_eq!(
            prediction.confidence,
            prediction.probabilities[prediction.label.index()].probability * 100.0
        );
    }

    #[test]
    fn test_independent_bundles_agree() {
        let probe = FeatureVector::new([0.1, 0.7, 3.0, 5.0, 0.3, 12.0, 1.0]);
        assert_eq!(bundle().predict(&probe).unwrap(), bundle().predict(&probe).unwrap());
    }

    #[test]
    fn test_bundle_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModelBundle>();
    }

    #[test]
    fn test_prediction_serializes_lowercase_label() {
        let prediction = bundle()
            .predict(&FeatureVector::new(DRONE_EXEMPLARS[0]))
            .unwrap();
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["label"], "drone");
        assert_eq!(json["probabilities"][1]["class"], "drone");
    }
}
