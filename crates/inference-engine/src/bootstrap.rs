//! Bootstrap Training Set
//!
//! Hand-authored exemplar feature vectors standing in for a labeled dataset. Drones
//! sit high on every feature (regular propeller modulation), birds low (irregular
//! wing beats). Nothing here generalizes beyond that shape.

use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target class, ordered as the classifier reports probabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetClass {
    Bird,
    Drone,
}

impl TargetClass {
    /// All classes in probability order
    pub const ALL: [TargetClass; 2] = [TargetClass::Bird, TargetClass::Drone];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetClass::Bird => "bird",
            TargetClass::Drone => "drone",
        }
    }

    /// Position in [`TargetClass::ALL`]
    pub fn index(&self) -> usize {
        match self {
            TargetClass::Bird => 0,
            TargetClass::Drone => 1,
        }
    }
}

impl fmt::Display for TargetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bird" => Ok(TargetClass::Bird),
            "drone" => Ok(TargetClass::Drone),
            other => Err(format!("unknown target class: {}", other)),
        }
    }
}

/// Drone-like exemplars
pub const DRONE_EXEMPLARS: [[f64; FEATURE_DIMENSION]; 5] = [
    [0.8, 5.2, 120.0, 0.9, 0.7, 150.0, 0.8],
    [0.7, 4.8, 115.0, 0.85, 0.75, 145.0, 0.75],
    [0.75, 5.0, 125.0, 0.88, 0.72, 155.0, 0.78],
    [0.82, 5.3, 118.0, 0.92, 0.68, 152.0, 0.81],
    [0.79, 5.1, 122.0, 0.89, 0.71, 148.0, 0.79],
];

/// Bird-like exemplars
pub const BIRD_EXEMPLARS: [[f64; FEATURE_DIMENSION]; 5] = [
    [0.3, 2.5, 60.0, 0.4, 0.35, 80.0, 0.3],
    [0.25, 2.3, 65.0, 0.45, 0.38, 75.0, 0.28],
    [0.28, 2.4, 63.0, 0.42, 0.36, 78.0, 0.29],
    [0.31, 2.6, 62.0, 0.41, 0.37, 82.0, 0.31],
    [0.27, 2.5, 64.0, 0.43, 0.34, 79.0, 0.30],
];

/// Exemplar features with their labels, drones first
pub fn bootstrap_training_set() -> (Vec<FeatureVector>, Vec<TargetClass>) {
    DRONE_EXEMPLARS
        .iter()
        .map(|row| (FeatureVector::new(*row), TargetClass::Drone))
        .chain(
            BIRD_EXEMPLARS
                .iter()
                .map(|row| (FeatureVector::new(*row), TargetClass::Bird)),
        )
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_set_shape() {
        let (features, labels) = bootstrap_training_set();
        assert_eq!(features.len(), 10);
        assert_eq!(labels.iter().filter(|&&l| l == TargetClass::Drone).count(), 5);
        assert_eq!(labels[0], TargetClass::Drone);
        assert_eq!(labels[9], TargetClass::Bird);
    }

    #[test]
    fn test_class_round_trip_through_str() {
        for class in TargetClass::ALL {
            assert_eq!(class.as_str().parse::<TargetClass>(), Ok(class));
            assert_eq!(TargetClass::ALL[class.index()], class);
        }
        assert!("plane".parse::<TargetClass>().is_err());
    }
}
