use serde::Serialize;

use crate::types::Label;

/// Binary classification quality on a labelled holdout set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    pub samples: usize,
    pub accuracy: f64,
    /// Share of predicted fraud that was fraud. Zero when nothing was flagged.
    pub precision: f64,
    /// Share of actual fraud that was flagged. Zero when no fraud was present.
    pub recall: f64
}

impl ClassificationMetrics {
    pub fn evaluate(predictions: &[Label], labels: &[Label]) -> Self {
        let mut true_positives = 0usize;
        let mut false_positives = 0usize;
        let mut false_negatives = 0usize;
        let mut correct = 0usize;

        for (&predicted, &actual) in predictions.iter().zip(labels) {
            match (predicted, actual) {
                (1, 1) => true_positives += 1,
                (1, _) => false_positives += 1,
                (_, 1) => false_negatives += 1,
                _ => {}
            }

            if predicted == actual {
                correct += 1;
            }
        }

        let samples = predictions.len().min(labels.len());

        Self {
            samples,
            accuracy: ratio(correct, samples),
            precision: ratio(true_positives, true_positives + false_positives),
            recall: ratio(true_positives, true_positives + false_negatives)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}
