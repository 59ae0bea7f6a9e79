//! CART classification tree for binary fraud labels.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::types::Label;

/// Growth limits for a single tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth (None = grow until leaves are pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each child of a split
    pub min_samples_leaf: usize,
    /// Features examined per split
    pub max_features: usize
}

/// Tree nodes are stored in a flat arena; children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Leaf {
        fraud_probability: f64,
        samples: usize
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64
}

/// Training inputs shared by every recursive call.
struct GrowContext<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [Label],
    rng: &'a mut ChaCha8Rng
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    feature_importances: Vec<f64>
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            feature_importances: Vec::new()
        }
    }

    /// Grows the tree on the rows listed in `sample` (duplicates allowed, as
    /// produced by bootstrap sampling).
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[Label], sample: Vec<usize>, rng: &mut ChaCha8Rng) {
        let n_features = features.first().map(Vec::len).unwrap_or(0);

        self.nodes.clear();
        self.feature_importances = vec![0.0; n_features];

        let mut context = GrowContext { features, labels, rng };
        self.grow(&mut context, sample, 0);

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for importance in &mut self.feature_importances {
                *importance /= total;
            }
        }
    }

    fn grow(&mut self, context: &mut GrowContext<'_>, indices: Vec<usize>, depth: usize) -> usize {
        let node_index = self.nodes.len();
        let positives = count_positives(context.labels, &indices);
        let impurity = gini(positives, indices.len());

        self.nodes.push(leaf(positives, indices.len()));

        let depth_reached = self.config.max_depth.is_some_and(|max_depth| depth >= max_depth);

        if depth_reached || indices.len() < self.config.min_samples_split || impurity <= f64::EPSILON {
            return node_index
        }

        let Some(split) = self.find_best_split(context, &indices, impurity) else {
            return node_index
        };

        self.feature_importances[split.feature] += split.gain * indices.len() as f64;

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices.iter()
            .partition(|&&row| context.features[row][split.feature] <= split.threshold);

        let left = self.grow(context, left_indices, depth + 1);
        let right = self.grow(context, right_indices, depth + 1);

        self.nodes[node_index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right
        };

        node_index
    }

    /// Scans features in random order. At least `max_features` are examined;
    /// the scan continues past that only while no valid split has been found.
    fn find_best_split(&self, context: &mut GrowContext<'_>, indices: &[usize], parent_impurity: f64) -> Option<SplitCandidate> {
        let n_features = self.feature_importances.len();
        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(&mut *context.rng);

        let total = indices.len();
        let total_positives = count_positives(context.labels, indices);
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;

        for (visited, &feature) in order.iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }

            let mut pairs: Vec<(f64, Label)> = indices.iter()
                .map(|&row| (context.features[row][feature], context.labels[row]))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_positives = 0;

            for position in 0..total.saturating_sub(1) {
                if pairs[position].1 == 1 {
                    left_positives += 1;
                }

                let left_count = position + 1;
                let right_count = total - left_count;

                if pairs[position].0 == pairs[position + 1].0 || left_count < min_leaf || right_count < min_leaf {
                    continue;
                }

                let weighted = (left_count as f64 * gini(left_positives, left_count)
                    + right_count as f64 * gini(total_positives - left_positives, right_count))
                    / total as f64;
                let gain = parent_impurity - weighted;

                if gain > f64::EPSILON && best.as_ref().is_none_or(|current| gain > current.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (pairs[position].0 + pairs[position + 1].0) / 2.0,
                        gain
                    });
                }
            }
        }

        best
    }

    /// Fraction of fraud samples in the leaf reached by `features`.
    pub fn predict_proba_one(&self, features: &[f64]) -> f64 {
        let mut index = 0;

        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { fraud_probability, .. }) => return *fraud_probability,
                Some(Node::Split { feature, threshold, left, right }) => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                None => return 0.5
            }
        }
    }

    pub fn predict_one(&self, features: &[f64]) -> Label {
        Label::from(self.predict_proba_one(features) > 0.5)
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn depth(&self) -> usize {
        fn depth_at(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => 1 + depth_at(nodes, *left).max(depth_at(nodes, *right)),
                Some(Node::Leaf { .. }) => 1,
                None => 0
            }
        }

        depth_at(&self.nodes, 0)
    }

    /// Validates a deserialized tree: every child points forward inside the
    /// arena and every split feature exists.
    pub fn is_consistent(&self, n_features: usize) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().enumerate().all(|(index, node)| match node {
            Node::Leaf { fraud_probability, .. } => (0.0..=1.0).contains(fraud_probability),
            Node::Split { feature, threshold, left, right } => {
                *feature < n_features
                    && threshold.is_finite()
                    && *left > index && *left < self.nodes.len()
                    && *right > index && *right < self.nodes.len()
            }
        })
    }
}

fn count_positives(labels: &[Label], indices: &[usize]) -> usize {
    indices.iter().filter(|&&row| labels[row] == 1).count()
}

fn gini(positives: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }

    let p = positives as f64 / count as f64;
    2.0 * p * (1.0 - p)
}

fn leaf(positives: usize, count: usize) -> Node {
    Node::Leaf {
        fraud_probability: if count == 0 { 0.5 } else { positives as f64 / count as f64 },
        samples: count
    }
}
