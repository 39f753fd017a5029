//! Peak Amplitude Normalization

/// Largest absolute excursion, `max(|max|, |min|)`, ignoring NaN samples.
///
/// Returns 0.0 for an empty or all-NaN series.
pub fn peak_amplitude(values: &[f64]) -> f64 {
    let (min, max) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return 0.0;
    }
    max.abs().max(min.abs())
}

/// Scale values in place so the peak excursion becomes 1.0.
///
/// A zero peak leaves the series untouched. Returns the peak used.
pub fn normalize_to_peak(values: &mut [f64]) -> f64 {
    let peak = peak_amplitude(values);
    if peak > 0.0 {
        for v in values.iter_mut() {
            *v /= peak;
        }
    }
    peak
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_uses_larger_excursion() {
        assert_eq!(peak_amplitude(&[1.0, -4.0, 2.0]), 4.0);
        assert_eq!(peak_amplitude(&[1.0, 3.0, 2.0]), 3.0);
        assert_eq!(peak_amplitude(&[f64::NAN, -2.0]), 2.0);
        assert_eq!(peak_amplitude(&[]), 0.0);
    }

    #[test]
    fn test_normalize_scales_to_unit_peak() {
        let mut values = vec![2.0, -4.0, 1.0];
        let peak = normalize_to_peak(&mut values);
        assert_eq!(peak, 4.0);
        assert_eq!(values, vec![0.5, -1.0, 0.25]);
    }

    #[test]
    fn test_all_zero_left_unchanged() {
        let mut values = vec![0.0; 4];
        assert_eq!(normalize_to_peak(&mut values), 0.0);
        assert!(values.iter().all(|&v| v == 0.0));
    }
}
