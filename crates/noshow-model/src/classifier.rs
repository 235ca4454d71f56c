//! The classifier capability.

use thiserror::Error;

use crate::frame::FeatureFrame;

/// Classifier errors.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Missing feature column: {0}")]
    MissingColumn(String),

    #[error("Invalid value {value:?} in column {column} (row {row})")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// A pre-trained model that estimates the probability of a no-show.
///
/// Implementations return exactly one probability in `[0, 1]` per input row,
/// in the same order as the rows of the frame. They are loaded once and never
/// mutated, so they must be shareable across threads.
pub trait Classifier: Send + Sync {
    /// Score every row of `frame`.
    fn predict_probability(&self, frame: &FeatureFrame) -> ClassifierResult<Vec<f64>>;

    /// Short human-readable identity for logs.
    fn describe(&self) -> String;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict_probability(&self, frame: &FeatureFrame) -> ClassifierResult<Vec<f64>> {
        (**self).predict_probability(frame)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
