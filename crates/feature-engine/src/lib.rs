//! Feature Engineering Engine
//!
//! Provides statistical and frequency domain feature extraction for target classification.

mod features;
mod fft;
mod statistics;

pub use features::{FeatureExtractor, FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES};
pub use fft::{magnitude_spectrum, SpectralFeatures};
pub use statistics::StatisticalFeatures;
