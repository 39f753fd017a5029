//! FFT-based Spectral Analysis

use rustfft::{num_complex::Complex, FftPlanner};
use tracing::warn;

/// Spectral summary of an amplitude series
#[derive(Debug, Clone, Default)]
pub struct SpectralFeatures {
    /// Bin of the strongest positive-frequency component (0 when the band is empty)
    pub dominant_frequency_index: usize,
    /// Largest magnitude over the mean magnitude, full spectrum
    pub peak_to_mean_ratio: f64,
    /// Summed magnitude over the positive-frequency band, DC excluded
    pub spectral_energy: f64,
    /// Whether the spectrum was all zero and the ratio fell back to 0.0
    pub degenerate: bool,
}

impl SpectralFeatures {
    /// Compute spectral features from a signal
    pub fn compute(signal: &[f64]) -> Self {
        if signal.is_empty() {
            return Self::default();
        }

        let magnitude = magnitude_spectrum(signal);
        let n = magnitude.len();

        // Positive frequencies only, DC excluded: bins 1 .. n/2
        let half_band = magnitude.get(1..n / 2).unwrap_or(&[]);

        let mut dominant_frequency_index = 0;
        let mut strongest = f64::NEG_INFINITY;
        for (i, &m) in half_band.iter().enumerate() {
            if m > strongest {
                strongest = m;
                dominant_frequency_index = i + 1;
            }
        }

        let spectral_energy = half_band.iter().sum();

        let peak = magnitude.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = magnitude.iter().sum::<f64>() / n as f64;

        let (peak_to_mean_ratio, degenerate) = if mean > 0.0 {
            (peak / mean, false)
        } else {
            warn!("All-zero spectrum over {} samples, peak-to-mean ratio set to 0", n);
            (0.0, true)
        };

        Self {
            dominant_frequency_index,
            peak_to_mean_ratio,
            spectral_energy,
            degenerate,
        }
    }
}

/// Magnitude of the forward DFT, one bin per input sample
pub fn magnitude_spectrum(signal: &[f64]) -> Vec<f64> {
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();

    if !buffer.is_empty() {
        let fft = FftPlanner::new().plan_fft_forward(buffer.len());
        fft.process(&mut buffer);
    }

    buffer.iter().map(|c| c.norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_bin_of_sine() {
        // 5 cycles over 64 samples lands exactly on bin 5
        let signal: Vec<f64> = (0..64)
            .map(|i| (2.0 * std::f64::consts::PI * 5.0 * i as f64 / 64.0).sin())
            .collect();

        let features = SpectralFeatures::compute(&signal);
        assert_eq!(features.dominant_frequency_index, 5);
        assert!(features.peak_to_mean_ratio > 1.0);
        assert!(!features.degenerate);
    }

    #[test]
    fn test_magnitude_of_constant() {
        let spectrum = magnitude_spectrum(&[1.0; 6]);
        assert!((spectrum[0] - 6.0).abs() < 1e-9);
        assert!(spectrum[1..].iter().all(|m| m.abs() < 1e-9));
    }

    #[test]
    fn test_constant_signal_ratio_is_length() {
        let features = SpectralFeatures::compute(&[1.0; 6]);
        assert!((features.peak_to_mean_ratio - 6.0).abs() < 1e-9);
        assert!(features.spectral_energy.abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_signal_falls_back() {
        let features = SpectralFeatures::compute(&[0.0; 8]);
        assert!(features.degenerate);
        assert_eq!(features.peak_to_mean_ratio, 0.0);
        assert_eq!(features.spectral_energy, 0.0);
        assert_eq!(features.dominant_frequency_index, 1);
    }

    #[test]
    fn test_short_signal_has_empty_band() {
        let features = SpectralFeatures::compute(&[1.0, -1.0, 0.5]);
        assert_eq!(features.dominant_frequency_index, 0);
        assert_eq!(features.spectral_energy, 0.0);
    }

    #[test]
    fn test_empty_signal() {
        let features = SpectralFeatures::compute(&[]);
        assert_eq!(features.spectral_energy, 0.0);
        assert_eq!(features.dominant_frequency_index, 0);
    }
}
