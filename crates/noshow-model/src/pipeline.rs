//! Pre-trained logistic pipeline loaded from a JSON artifact.
//!
//! The artifact carries everything needed to score a row: standardisation
//! parameters and coefficients for numeric columns, per-level weights for
//! categorical columns, and the intercept. Nothing here is fitted; the
//! parameters are taken as given.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::classifier::{Classifier, ClassifierError, ClassifierResult};
use crate::frame::FeatureFrame;

/// A numeric input, standardised as `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericFeature {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
    pub coefficient: f64,
}

/// A one-hot encoded input collapsed into a weight per level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoricalFeature {
    pub column: String,
    pub weights: HashMap<String, f64>,
    /// Weight for levels not seen in training
    #[serde(default)]
    pub unknown: f64,
}

/// Serialized form of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineArtifact {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: Vec<NumericFeature>,
    #[serde(default)]
    pub categorical: Vec<CategoricalFeature>,
}

/// Logistic pipeline ready for scoring.
#[derive(Debug, Clone)]
pub struct LinearPipeline {
    artifact: PipelineArtifact,
    fingerprint: String,
}

impl LinearPipeline {
    /// Load and validate an artifact from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ClassifierResult<Self> {
        let bytes = fs::read(path.as_ref())?;
        let artifact: PipelineArtifact = serde_json::from_slice(&bytes)?;
        Self::build(artifact, fingerprint(&bytes))
    }

    /// Load and validate an artifact from a JSON string.
    pub fn from_json(json: &str) -> ClassifierResult<Self> {
        let artifact: PipelineArtifact = serde_json::from_str(json)?;
        Self::build(artifact, fingerprint(json.as_bytes()))
    }

    fn build(artifact: PipelineArtifact, fingerprint: String) -> ClassifierResult<Self> {
        validate(&artifact)?;
        debug!(
            name = %artifact.name,
            numeric = artifact.numeric.len(),
            categorical = artifact.categorical.len(),
            "pipeline artifact validated"
        );
        Ok(Self {
            artifact,
            fingerprint,
        })
    }

    /// The parsed artifact.
    pub fn artifact(&self) -> &PipelineArtifact {
        &self.artifact
    }

    /// SHA-256 of the artifact bytes (hex).
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Log-odds for one row, given resolved column positions.
    fn log_odds(
        &self,
        row_idx: usize,
        row: &[String],
        numeric_idx: &[usize],
        categorical_idx: &[usize],
    ) -> ClassifierResult<f64> {
        let mut z = self.artifact.intercept;

        for (feature, &idx) in self.artifact.numeric.iter().zip(numeric_idx) {
            let raw = row[idx].trim();
            // Empty cells are imputed with the training mean.
            if raw.is_empty() {
                continue;
            }
            let x: f64 = raw.parse().map_err(|_| ClassifierError::InvalidValue {
                column: feature.column.clone(),
                row: row_idx,
                value: raw.to_string(),
            })?;
            if !x.is_finite() {
                return Err(ClassifierError::InvalidValue {
                    column: feature.column.clone(),
                    row: row_idx,
                    value: raw.to_string(),
                });
            }
            z += feature.coefficient * (x - feature.mean) / feature.scale;
        }

        for (feature, &idx) in self.artifact.categorical.iter().zip(categorical_idx) {
            let level = row[idx].trim();
            z += feature.weights.get(level).copied().unwrap_or(feature.unknown);
        }

        Ok(z)
    }
}

impl Classifier for LinearPipeline {
    fn predict_probability(&self, frame: &FeatureFrame) -> ClassifierResult<Vec<f64>> {
        let numeric_idx = self
            .artifact
            .numeric
            .iter()
            .map(|f| resolve(frame, &f.column))
            .collect::<ClassifierResult<Vec<_>>>()?;
        let categorical_idx = self
            .artifact
            .categorical
            .iter()
            .map(|f| resolve(frame, &f.column))
            .collect::<ClassifierResult<Vec<_>>>()?;

        frame
            .rows()
            .enumerate()
            .map(|(i, row)| {
                self.log_odds(i, row, &numeric_idx, &categorical_idx)
                    .map(sigmoid)
            })
            .collect()
    }

    fn describe(&self) -> String {
        match &self.artifact.version {
            Some(version) => format!("{} v{}", self.artifact.name, version),
            None => self.artifact.name.clone(),
        }
    }
}

fn resolve(frame: &FeatureFrame, column: &str) -> ClassifierResult<usize> {
    frame
        .column_index(column)
        .ok_or_else(|| ClassifierError::MissingColumn(column.to_string()))
}

fn validate(artifact: &PipelineArtifact) -> ClassifierResult<()> {
    if !artifact.intercept.is_finite() {
        return Err(ClassifierError::InvalidArtifact(
            "intercept is not finite".into(),
        ));
    }
    for f in &artifact.numeric {
        if !(f.mean.is_finite() && f.scale.is_finite() && f.coefficient.is_finite()) {
            return Err(ClassifierError::InvalidArtifact(format!(
                "non-finite parameter for column {}",
                f.column
            )));
        }
        if f.scale == 0.0 {
            return Err(ClassifierError::InvalidArtifact(format!(
                "zero scale for column {}",
                f.column
            )));
        }
    }
    for f in &artifact.categorical {
        if !f.unknown.is_finite() || f.weights.values().any(|w| !w.is_finite()) {
            return Err(ClassifierError::InvalidArtifact(format!(
                "non-finite weight for column {}",
                f.column
            )));
        }
    }
    Ok(())
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
