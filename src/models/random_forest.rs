//! Bagged ensemble of classification trees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::FeatureMatrix;
use crate::models::decision_tree::{DecisionTree, TreeConfig};
use crate::types::Label;

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unbounded)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features examined per split (ceil(sqrt(n_features)) if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed; tree `i` is grown from `seed + i`
    pub seed: u64
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new()
        }
    }

    /// Fits every tree on its own bootstrap sample. Callers are expected to have
    /// validated dimensions and labels (see [`crate::models::train`]).
    pub fn fit(&mut self, matrix: &FeatureMatrix, labels: &[Label]) {
        self.feature_names = matrix.columns().to_vec();

        let n_features = matrix.n_columns();
        let n_samples = matrix.n_rows();
        let max_features = self.config.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features.max(1));

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features
        };

        self.trees = (0..self.config.n_trees)
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(i as u64));
                let sample = if self.config.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let mut tree = DecisionTree::new(tree_config.clone());
                tree.fit(matrix.rows(), labels, sample, &mut rng);
                tree
            })
            .collect();

        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (total, importance) in self.feature_importances.iter_mut().zip(tree.feature_importances()) {
                *total += importance;
            }
        }

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for importance in &mut self.feature_importances {
                *importance /= sum;
            }
        }

        debug!(
            "Fitted {} trees on {} samples x {} features (max depth reached: {})",
            self.trees.len(),
            n_samples,
            n_features,
            self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );
    }

    /// Ensemble fraud probability: mean of the per-tree leaf fraud fractions.
    pub fn predict_proba_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict_proba_one(features)).sum();
        (total / self.trees.len() as f64).clamp(0.0, 1.0)
    }

    /// Hard class by majority vote of the trees.
    pub fn predict_one(&self, features: &[f64]) -> Label {
        let votes = self.trees.iter().filter(|tree| tree.predict_one(features) == 1).count();
        Label::from(votes * 2 > self.trees.len())
    }

    pub fn predict_proba(&self, matrix: &FeatureMatrix) -> Vec<f64> {
        matrix.rows().iter().map(|row| self.predict_proba_one(row)).collect()
    }

    pub fn predict(&self, matrix: &FeatureMatrix) -> Vec<Label> {
        matrix.rows().iter().map(|row| self.predict_one(row)).collect()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Encoded column names the forest was trained on, in matrix order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names with importances, most important first.
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self.feature_names.iter()
            .zip(self.feature_importances.iter())
            .map(|(name, &importance)| (name.as_str(), importance))
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    pub fn is_consistent(&self) -> bool {
        let n_features = self.feature_names.len();
        !self.trees.is_empty() && self.trees.iter().all(|tree| tree.is_consistent(n_features))
    }
}
