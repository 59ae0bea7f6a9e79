mod decision_tree;
mod errors;
mod evaluation;
mod random_forest;
mod trainer;

pub use decision_tree::{DecisionTree, Node, TreeConfig};
pub use errors::TrainError;
pub use evaluation::ClassificationMetrics;
pub use random_forest::{ForestConfig, RandomForest};
pub use trainer::{require_both_classes, train};
