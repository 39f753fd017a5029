//! Standard Scaling

use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fitted per-feature `(mean, std)` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    means: [f64; FEATURE_DIMENSION],
    stds: [f64; FEATURE_DIMENSION],
    degenerate: Vec<usize>,
}

impl ScalerState {
    /// Build a state from known statistics.
    ///
    /// Every std must be finite and strictly positive.
    pub fn from_parts(
        means: [f64; FEATURE_DIMENSION],
        stds: [f64; FEATURE_DIMENSION],
    ) -> Result<Self, InferenceError> {
        if let Some((index, &std)) = stds
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s <= 0.0)
        {
            return Err(InferenceError::DegenerateFeature { index, std });
        }

        Ok(Self {
            means,
            stds,
            degenerate: Vec::new(),
        })
    }

    /// Per-feature means
    pub fn means(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.means
    }

    /// Per-feature standard deviations, after zero substitution
    pub fn stds(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.stds
    }

    /// Columns whose std was zero at fit time and scale by 1
    pub fn degenerate_columns(&self) -> &[usize] {
        &self.degenerate
    }

    /// Apply `(x - mean) / std` per column
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let mut out = *features.values();
        for (i, v) in out.iter_mut().enumerate() {
            *v = (*v - self.means[i]) / self.stds[i];
        }
        FeatureVector::new(out)
    }

    /// Transform a batch
    pub fn transform_all(&self, features: &[FeatureVector]) -> Vec<FeatureVector> {
        features.iter().map(|f| self.transform(f)).collect()
    }
}

/// Fits [`ScalerState`] from a training set
pub struct StandardScaler;

impl StandardScaler {
    /// Compute per-column mean and population std.
    ///
    /// Zero-variance columns get std 1.0 so they pass through centred but unscaled.
    pub fn fit(training: &[FeatureVector]) -> Result<ScalerState, InferenceError> {
        if training.is_empty() {
            return Err(InferenceError::EmptyTrainingSet);
        }

        let n = training.len() as f64;
        let mut means = [0.0; FEATURE_DIMENSION];
        let mut stds = [0.0; FEATURE_DIMENSION];
        let mut degenerate = Vec::new();

        for col in 0..FEATURE_DIMENSION {
            let mean = training.iter().map(|f| f.values()[col]).sum::<f64>() / n;
            let variance = training
                .iter()
                .map(|f| {
                    let d = f.values()[col] - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let std = variance.sqrt();

            means[col] = mean;
            stds[col] = if std <= f64::EPSILON * mean.abs().max(1.0) {
                degenerate.push(col);
                1.0
            } else {
                std
            };
        }

        if !degenerate.is_empty() {
            debug!("Zero-variance feature columns {:?} scaled by 1.0", degenerate);
        }

        Ok(ScalerState {
            means,
            stds,
            degenerate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap_training_set;

    #[test]
    fn test_fit_bootstrap_set() {
        let (features, _) = bootstrap_training_set();
        let state = StandardScaler::fit(&features).unwrap();
        assert!(state.degenerate_columns().is_empty());

        let scaled = state.transform_all(&features);
        for col in 0..FEATURE_DIMENSION {
            let column: Vec<f64> = scaled.iter().map(|f| f.values()[col]).collect();
            let mean = column.iter().sum::<f64>() / column.len() as f64;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / column.len() as f64;
            assert!(mean.abs() < 1e-9, "column {} mean {}", col, mean);
            assert!((var.sqrt() - 1.0).abs() < 1e-9, "column {} std {}", col, var.sqrt());
        }
    }

    #[test]
    fn test_zero_variance_column_substituted() {
        let rows = vec![
            FeatureVector::new([1.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            FeatureVector::new([2.0, 3.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
        ];
        let state = StandardScaler::fit(&rows).unwrap();
        assert_eq!(state.degenerate_columns(), &[1]);
        assert_eq!(state.stds()[1], 1.0);

        let out = state.transform(&FeatureVector::new([1.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert!(out.is_finite());
        assert_eq!(out.values()[1], 2.0);
        assert_eq!(out.values()[0], -1.0);
    }

    #[test]
    fn test_empty_training_set() {
        assert_eq!(StandardScaler::fit(&[]).unwrap_err(), InferenceError::EmptyTrainingSet);
    }

    #[test]
    fn test_from_parts_rejects_zero_std() {
        let mut stds = [1.0; FEATURE_DIMENSION];
        stds[4] = 0.0;
        let err = ScalerState::from_parts([0.0; FEATURE_DIMENSION], stds).unwrap_err();
        assert_eq!(err, InferenceError::DegenerateFeature { index: 4, std: 0.0 });
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn feature_vector() -> impl Strategy<Value = FeatureVector> {
        prop::array::uniform7(-100.0f64..100.0).prop_map(FeatureVector::new)
    }

    proptest! {
        #[test]
        fn standardized_columns_have_zero_mean_unit_std(
            training in prop::collection::vec(feature_vector(), 3..24),
        ) {
            let state = StandardScaler::fit(&training).unwrap();
            let scaled = state.transform_all(&training);
            let n = scaled.len() as f64;

            for col in 0..FEATURE_DIMENSION {
                if state.degenerate_columns().contains(&col) {
                    continue;
                }
                let mean = scaled.iter().map(|f| f.values()[col]).sum::<f64>() / n;
                let var = scaled.iter().map(|f| (f.values()[col] - mean).powi(2)).sum::<f64>() / n;
                prop_assert!(mean.abs() < 1e-6);
                prop_assert!((var.sqrt() - 1.0).abs() < 1e-6);
            }
        }
    }
}
