//! Statistical Features Computation

/// Time-domain statistics for an amplitude series
#[derive(Debug, Clone, Default)]
pub struct StatisticalFeatures {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Maximum value
    pub max: f64,
    /// Sign-bit changes in the first difference
    pub zero_crossings: usize,
}

impl StatisticalFeatures {
    /// Compute statistical features from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;

        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let variance = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        Self {
            mean,
            std_dev,
            max,
            zero_crossings: slope_sign_changes(values),
        }
    }

    /// Zero crossings per sample
    pub fn zero_crossing_rate(&self, len: usize) -> f64 {
        if len == 0 {
            0.0
        } else {
            self.zero_crossings as f64 / len as f64
        }
    }
}

/// Count sign changes between consecutive first differences.
///
/// Signs are compared on the raw sign bit: `+0.0` is non-negative, `-0.0` negative.
fn slope_sign_changes(values: &[f64]) -> usize {
    let mut crossings = 0;
    let mut prev_negative: Option<bool> = None;

    for pair in values.windows(2) {
        let negative = (pair[1] - pair[0]).is_sign_negative();
        if prev_negative.is_some_and(|p| p != negative) {
            crossings += 1;
        }
        prev_negative = Some(negative);
    }

    crossings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_std_dev_is_population() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_square_wave_crossings() {
        let values = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let stats = StatisticalFeatures::compute(&values);
        assert_eq!(stats.zero_crossings, 6);
        assert!((stats.zero_crossing_rate(values.len()) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_flat_segments_count_as_non_negative() {
        // Differences: +1, 0, -1, 0 -> signs: +, +, -, +
        let values = vec![0.0, 1.0, 1.0, 0.0, 0.0];
        let stats = StatisticalFeatures::compute(&values);
        assert_eq!(stats.zero_crossings, 2);
    }

    #[test]
    fn test_monotonic_has_no_crossings() {
        let stats = StatisticalFeatures::compute(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.zero_crossings, 0);
    }

    #[test]
    fn test_empty_values() {
        let values: Vec<f64> = vec![];
        let stats = StatisticalFeatures::compute(&values);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.zero_crossing_rate(0), 0.0);
    }
}
