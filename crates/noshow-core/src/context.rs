//! Process-wide read-only state.
//!
//! Built once before the first query and only borrowed afterwards. Nothing in
//! here is mutated after construction, so a single context can back any
//! number of sessions.

use noshow_model::{Classifier, ClassifierError, LinearPipeline};
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::feed::{load_feed, FeedError};
use crate::models::AppointmentTable;

/// Startup errors. Any of these means no query can be served.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to load appointment feed: {0}")]
    Feed(#[from] FeedError),

    #[error("Failed to load model: {0}")]
    Model(#[from] ClassifierError),
}

pub type ContextResult<T> = Result<T, ContextError>;

/// Loaded feed and classifier.
pub struct AppContext {
    table: AppointmentTable,
    classifier: Box<dyn Classifier>,
    excluded_columns: Vec<String>,
}

impl AppContext {
    /// Assemble a context from already-loaded parts.
    pub fn new(
        table: AppointmentTable,
        classifier: Box<dyn Classifier>,
        excluded_columns: Vec<String>,
    ) -> Self {
        Self {
            table,
            classifier,
            excluded_columns,
        }
    }

    /// Load the feed and model artifact named in `config`.
    pub fn load(config: &AppConfig) -> ContextResult<Self> {
        let table = load_feed(&config.feed_path)?;

        let pipeline = LinearPipeline::from_path(&config.model_path)?;
        info!(
            model = %pipeline.describe(),
            fingerprint = %pipeline.fingerprint(),
            path = %config.model_path.display(),
            "model loaded"
        );

        Ok(Self::new(
            table,
            Box::new(pipeline),
            config.excluded_columns.clone(),
        ))
    }

    /// The appointment feed.
    pub fn table(&self) -> &AppointmentTable {
        &self.table
    }

    /// The classifier.
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Columns withheld from the classifier.
    pub fn excluded_columns(&self) -> &[String] {
        &self.excluded_columns
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("rows", &self.table.len())
            .field("classifier", &self.classifier.describe())
            .field("excluded_columns", &self.excluded_columns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noshow_model::MockClassifier;

    fn assert_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_shareable() {
        assert_sync::<AppContext>();
    }

    #[test]
    fn test_load_missing_feed_is_feed_error() {
        let config = AppConfig {
            feed_path: "/no/such/feed.csv".into(),
            ..AppConfig::default()
        };
        let err = AppContext::load(&config).unwrap_err();
        assert!(matches!(err, ContextError::Feed(_)));
    }

    #[test]
    fn test_load_missing_model_is_model_error() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.csv");
        std::fs::write(&feed, "MRN,APPT_ID,CLINIC,APPT_DATE\n1,A1,ORTHO,1/5/24 9:30\n").unwrap();

        let config = AppConfig {
            feed_path: feed,
            model_path: dir.path().join("missing.json"),
            ..AppConfig::default()
        };
        let err = AppContext::load(&config).unwrap_err();
        assert!(matches!(err, ContextError::Model(_)));
    }

    #[test]
    fn test_new_exposes_parts() {
        let ctx = AppContext::new(
            AppointmentTable::default(),
            Box::new(MockClassifier::constant(0.3)),
            vec!["NO_SHOW".into()],
        );
        assert!(ctx.table().is_empty());
        assert_eq!(ctx.excluded_columns(), &["NO_SHOW".to_string()]);
        assert!(ctx.classifier().describe().starts_with("mock"));
    }
}
