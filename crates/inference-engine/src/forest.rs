//! Seeded Random Forest
//!
//! Bagged CART trees with gini impurity. Each tree is grown on a bootstrap resample and
//! considers a random subset of features per split; probabilities are the mean of the
//! per-tree leaf class frequencies.

use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Seed for resampling and feature selection
    pub seed: u64,
    /// Depth limit, `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Smallest node that may be split
    pub min_samples_split: usize,
    /// Features tried per split, `None` uses `floor(sqrt(n_features))`
    pub max_features: Option<usize>,
    /// Resample the training set per tree
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    fn features_per_split(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| (FEATURE_DIMENSION as f64).sqrt().floor() as usize)
            .clamp(1, FEATURE_DIMENSION)
    }
}

/// Small xorshift64 generator, seeded through splitmix64 so seed 0 is usable
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self {
            state: if z == 0 { 0x9E37_79B9_7F4A_7C15 } else { z },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// One CART tree stored as a flat node arena; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_classes: usize,
}

impl DecisionTree {
    fn grow(
        samples: &[FeatureVector],
        labels: &[usize],
        indices: Vec<usize>,
        n_classes: usize,
        config: &ForestConfig,
        rng: &mut SeededRng,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            n_classes,
        };
        tree.build_node(samples, labels, indices, 0, config, rng);
        tree
    }

    fn build_node(
        &mut self,
        samples: &[FeatureVector],
        labels: &[usize],
        indices: Vec<usize>,
        depth: usize,
        config: &ForestConfig,
        rng: &mut SeededRng,
    ) -> usize {
        let counts = class_counts(labels, &indices, self.n_classes);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = config.max_depth.is_some_and(|d| depth >= d);

        let split = if is_pure || depth_reached || indices.len() < config.min_samples_split {
            None
        } else {
            self.find_split(samples, labels, &indices, config, rng)
        };

        let Some(split) = split else {
            let total = indices.len().max(1) as f64;
            let id = self.nodes.len();
            self.nodes.push(TreeNode::Leaf {
                distribution: counts.iter().map(|&c| c as f64 / total).collect(),
            });
            return id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| samples[i].values()[split.feature] <= split.threshold);

        // Reserve the slot so children land after their parent
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            distribution: Vec::new(),
        });

        let left = self.build_node(samples, labels, left_idx, depth + 1, config, rng);
        let right = self.build_node(samples, labels, right_idx, depth + 1, config, rng);
        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Visit features in random order until `features_per_split` non-constant ones have
    /// been evaluated, keeping the lowest weighted gini.
    fn find_split(
        &self,
        samples: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
        config: &ForestConfig,
        rng: &mut SeededRng,
    ) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..FEATURE_DIMENSION).collect();
        rng.shuffle(&mut features);

        let wanted = config.features_per_split();
        let mut visited = 0;
        let mut best: Option<BestSplit> = None;

        for feature in features {
            let mut sorted: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (samples[i].values()[feature], labels[i]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (first, last) = (sorted[0].0, sorted[sorted.len() - 1].0);
            if first >= last {
                continue;
            }
            visited += 1;

            if let Some(candidate) = best_threshold(&sorted, feature, self.n_classes) {
                if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }

            if visited >= wanted && best.is_some() {
                break;
            }
        }

        best
    }

    /// Class frequencies of the leaf a sample falls into
    pub fn predict_proba(&self, features: &FeatureVector) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if features.values()[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn class_counts(labels: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in indices {
        counts[labels[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Sweep a feature sorted by value, splitting between distinct neighbours
fn best_threshold(sorted: &[(f64, usize)], feature: usize, n_classes: usize) -> Option<BestSplit> {
    let total = sorted.len();
    let mut right = vec![0; n_classes];
    for &(_, label) in sorted {
        right[label] += 1;
    }
    let mut left = vec![0; n_classes];
    let mut best: Option<BestSplit> = None;

    for pos in 0..total - 1 {
        let label = sorted[pos].1;
        left[label] += 1;
        right[label] -= 1;

        let (here, next) = (sorted[pos].0, sorted[pos + 1].0);
        if here >= next {
            continue;
        }

        let n_left = pos + 1;
        let n_right = total - n_left;
        let impurity = (n_left as f64 * gini(&left, n_left)
            + n_right as f64 * gini(&right, n_right))
            / total as f64;

        if best.as_ref().map_or(true, |b| impurity < b.impurity) {
            let mut threshold = here + (next - here) / 2.0;
            if threshold >= next {
                threshold = here;
            }
            best = Some(BestSplit {
                feature,
                threshold,
                impurity,
            });
        }
    }

    best
}

/// Bagged ensemble of [`DecisionTree`]s
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Create an untrained forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_classes: 0,
        }
    }

    /// Grow every tree. Labels are class indices below `n_classes`.
    pub fn train(
        &mut self,
        samples: &[FeatureVector],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<(), InferenceError> {
        if samples.is_empty() {
            return Err(InferenceError::EmptyTrainingSet);
        }
        if samples.len() != labels.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} labels", samples.len()),
                actual: format!("{} labels", labels.len()),
            });
        }
        if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(InferenceError::InvalidLabel { label, n_classes });
        }
        if self.config.n_estimators == 0 {
            return Err(InferenceError::InvalidInputShape {
                expected: "at least 1 tree".to_string(),
                actual: "0 trees".to_string(),
            });
        }

        let mut master = SeededRng::new(self.config.seed);
        let n = samples.len();

        let trees: Vec<DecisionTree> = (0..self.config.n_estimators)
            .map(|_| {
                let mut rng = SeededRng::new(master.next_u64());
                let indices: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| rng.below(n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::grow(samples, labels, indices, n_classes, &self.config, &mut rng)
            })
            .collect();

        let nodes: usize = trees.iter().map(DecisionTree::node_count).sum();
        info!(
            "Trained random forest: {} trees, {} nodes, {} samples, seed={}",
            trees.len(),
            nodes,
            n,
            self.config.seed
        );

        self.trees = trees;
        self.n_classes = n_classes;
        Ok(())
    }

    /// Whether [`RandomForest::train`] has completed
    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Mean class probabilities across trees, summing to 1
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        if !self.is_trained() {
            return Err(InferenceError::ModelNotInitialized);
        }

        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in probabilities.iter_mut().zip(tree.predict_proba(features)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in probabilities.iter_mut() {
            *p /= n_trees;
        }

        debug!("Forest probabilities: {:?}", probabilities);
        Ok(probabilities)
    }

    /// Configuration the forest was built with
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Number of trees
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Vec<FeatureVector>, Vec<usize>) {
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for i in 0..6 {
            let offset = i as f64 * 0.1;
            samples.push(FeatureVector::new([-2.0 - offset; FEATURE_DIMENSION]));
            labels.push(0);
            samples.push(FeatureVector::new([2.0 + offset; FEATURE_DIMENSION]));
            labels.push(1);
        }
        (samples, labels)
    }

    #[test]
    fn test_untrained_forest() {
        let forest = RandomForest::new(ForestConfig::default());
        assert!(!forest.is_trained());
        let err = forest.predict_proba(&FeatureVector::default()).unwrap_err();
        assert_eq!(err, InferenceError::ModelNotInitialized);
    }

    #[test]
    fn test_separable_blobs() {
        let (samples, labels) = two_blobs();
        let mut forest = RandomForest::new(ForestConfig::default());
        forest.train(&samples, &labels, 2).unwrap();
        assert_eq!(forest.tree_count(), 100);

        let low = forest.predict_proba(&FeatureVector::new([-2.5; FEATURE_DIMENSION])).unwrap();
        let high = forest.predict_proba(&FeatureVector::new([2.5; FEATURE_DIMENSION])).unwrap();
        assert!(low[0] > 0.9);
        assert!(high[1] > 0.9);
        assert!((low.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (samples, labels) = two_blobs();
        let probe = FeatureVector::new([0.1, -0.3, 0.2, 0.0, -0.1, 0.4, 0.05]);

        let mut a = RandomForest::new(ForestConfig::default());
        let mut b = RandomForest::new(ForestConfig::default());
        a.train(&samples, &labels, 2).unwrap();
        b.train(&samples, &labels, 2).unwrap();

        assert_eq!(a.predict_proba(&probe).unwrap(), b.predict_proba(&probe).unwrap());
    }

    #[test]
    fn test_single_tree_without_bootstrap_is_exact() {
        let (samples, labels) = two_blobs();
        let config = ForestConfig {
            n_estimators: 1,
            bootstrap: false,
            ..Default::default()
        };
        let mut forest = RandomForest::new(config);
        forest.train(&samples, &labels, 2).unwrap();

        for (sample, &label) in samples.iter().zip(&labels) {
            let proba = forest.predict_proba(sample).unwrap();
            assert_eq!(proba[label], 1.0);
        }
    }

    #[test]
    fn test_depth_limit_gives_mixed_leaf() {
        let samples = vec![
            FeatureVector::new([0.0; FEATURE_DIMENSION]),
            FeatureVector::new([1.0; FEATURE_DIMENSION]),
        ];
        let config = ForestConfig {
            n_estimators: 1,
            bootstrap: false,
            max_depth: Some(0),
            ..Default::default()
        };
        let mut forest = RandomForest::new(config);
        forest.train(&samples, &[0, 1], 2).unwrap();
        assert_eq!(forest.predict_proba(&samples[0]).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_training_input_checks() {
        let mut forest = RandomForest::new(ForestConfig::default());
        assert_eq!(forest.train(&[], &[], 2).unwrap_err(), InferenceError::EmptyTrainingSet);

        let samples = vec![FeatureVector::default(); 2];
        assert!(matches!(
            forest.train(&samples, &[0], 2),
            Err(InferenceError::InvalidInputShape { .. })
        ));
        assert_eq!(
            forest.train(&samples, &[0, 3], 2).unwrap_err(),
            InferenceError::InvalidLabel { label: 3, n_classes: 2 }
        );
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[5, 0], 5), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[0, 0], 0), 0.0);
    }

    #[test]
    fn test_rng_is_deterministic() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        let mut c = SeededRng::new(0);
        let first = a.next_u64();
        assert_eq!(first, b.next_u64());
        assert_ne!(c.next_u64(), 0);
        assert!((0..1000).all(|_| a.below(7) < 7));
    }
}
