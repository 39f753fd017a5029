//! Feature Vector Assembly

use crate::fft::SpectralFeatures;
use crate::statistics::StatisticalFeatures;
use serde::{Deserialize, Serialize};
use signal_ingest::CanonicalSignal;
use tracing::debug;

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 7;

/// Feature names, in vector order
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "mean_amplitude",
    "std_amplitude",
    "dominant_frequency_index",
    "peak_to_mean_spectral_ratio",
    "zero_crossing_rate",
    "spectral_energy",
    "max_amplitude",
];

/// Fixed-order feature vector.
///
/// Order matters: the scaler and the forest were fitted against exactly this layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    /// Wrap raw values
    pub const fn new(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self { values }
    }

    /// Raw values
    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.values
    }

    /// Whether every value is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// `(name, value)` pairs in vector order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }

    pub fn mean_amplitude(&self) -> f64 {
        self.values[0]
    }

    pub fn std_amplitude(&self) -> f64 {
        self.values[1]
    }

    pub fn dominant_frequency_index(&self) -> f64 {
        self.values[2]
    }

    pub fn peak_to_mean_spectral_ratio(&self) -> f64 {
        self.values[3]
    }

    pub fn zero_crossing_rate(&self) -> f64 {
        self.values[4]
    }

    pub fn spectral_energy(&self) -> f64 {
        self.values[5]
    }

    pub fn max_amplitude(&self) -> f64 {
        self.values[6]
    }
}

impl From<[f64; FEATURE_DIMENSION]> for FeatureVector {
    fn from(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self::new(values)
    }
}

/// Stateless extractor turning a canonical signal into a [`FeatureVector`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a canonical signal
    pub fn extract(&self, signal: &CanonicalSignal) -> FeatureVector {
        self.extract_from_samples(&signal.amplitude)
    }

    /// Extract features from an amplitude slice directly
    pub fn extract_from_samples(&self, amplitude: &[f64]) -> FeatureVector {
        if amplitude.is_empty() {
            return FeatureVector::default();
        }

        let stats = StatisticalFeatures::compute(amplitude);
        let spectral = SpectralFeatures::compute(amplitude);

        let features = FeatureVector::new([
            stats.mean,
            stats.std_dev,
            spectral.dominant_frequency_index as f64,
            spectral.peak_to_mean_ratio,
            stats.zero_crossing_rate(amplitude.len()),
            spectral.spectral_energy,
            stats.max,
        ]);

        debug!(
            "Extracted features from {} samples: {:?}",
            amplitude.len(),
            features.values()
        );

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_ingest::{RawTable, SignalIngestor};

    fn ingest(row: &[f64]) -> CanonicalSignal {
        let table = RawTable::from_values(&vec![row.to_vec(); 5]);
        SignalIngestor::default().ingest(&table).unwrap()
    }

    #[test]
    fn test_square_wave_features() {
        let signal = ingest(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
        let features = FeatureExtractor::new().extract(&signal);

        assert!(features.mean_amplitude().abs() < 1e-12);
        assert!((features.std_amplitude() - 1.0).abs() < 1e-12);
        assert!((features.zero_crossing_rate() - 0.75).abs() < 1e-12);
        assert_eq!(features.max_amplitude(), 1.0);
    }

    #[test]
    fn test_constant_signal_has_no_nan() {
        let signal = ingest(&[5.0; 6]);
        let features = FeatureExtractor::new().extract(&signal);

        assert_eq!(features.std_amplitude(), 0.0);
        assert!(features.is_finite());
        assert_eq!(features.max_amplitude(), 1.0);
    }

    #[test]
    fn test_all_zero_signal_has_no_nan() {
        let signal = ingest(&[0.0; 10]);
        let features = FeatureExtractor::new().extract(&signal);

        assert!(features.is_finite());
        assert_eq!(features.peak_to_mean_spectral_ratio(), 0.0);
    }

    #[test]
    fn test_named_order() {
        let features = FeatureVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let names: Vec<_> = features.named().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_NAMES);
        assert_eq!(features.spectral_energy(), 6.0);
    }

    #[test]
    fn test_empty_samples() {
        let features = FeatureExtractor::new().extract_from_samples(&[]);
        assert_eq!(features, FeatureVector::default());
    }
}
