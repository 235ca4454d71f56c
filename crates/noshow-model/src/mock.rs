//! Mock classifier for testing without a model artifact.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::classifier::{Classifier, ClassifierResult};
use crate::frame::FeatureFrame;

/// Returns preset probabilities, cycling through them row by row.
pub struct MockClassifier {
    probabilities: Vec<f64>,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Cycle through `probabilities` (row `i` gets `probabilities[i % len]`).
    /// An empty list scores every row as 0.0.
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self {
            probabilities,
            calls: AtomicUsize::new(0),
        }
    }

    /// Same probability for every row.
    pub fn constant(probability: f64) -> Self {
        Self::new(vec![probability])
    }

    /// Number of times `predict_probability` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    fn predict_probability(&self, frame: &FeatureFrame) -> ClassifierResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.probabilities.is_empty() {
            return Ok(vec![0.0; frame.len()]);
        }
        Ok((0..frame.len())
            .map(|i| self.probabilities[i % self.probabilities.len()])
            .collect())
    }

    fn describe(&self) -> String {
        format!("mock({} preset probabilities)", self.probabilities.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_rows(n: usize) -> FeatureFrame {
        let mut frame = FeatureFrame::new(vec!["MRN".into()]);
        for i in 0..n {
            frame.push_row(vec![i.to_string()]);
        }
        frame
    }

    #[test]
    fn test_mock_cycles() {
        let mock = MockClassifier::new(vec![0.1, 0.9]);
        let probs = mock.predict_probability(&frame_with_rows(3)).unwrap();
        assert_eq!(probs, vec![0.1, 0.9, 0.1]);
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_mock_empty_presets() {
        let mock = MockClassifier::new(vec![]);
        let probs = mock.predict_probability(&frame_with_rows(2)).unwrap();
        assert_eq!(probs, vec![0.0, 0.0]);
    }
}
