//! Classifier boundary for no-show prediction.
//!
//! This crate knows nothing about clinics or date ranges. It receives a
//! [`FeatureFrame`] (rows shaped like the appointment feed) and returns one
//! no-show probability per row, in row order.
//!
//! - [`Classifier`]: the capability the scorer depends on
//! - [`LinearPipeline`]: a pre-trained logistic pipeline loaded from JSON
//! - [`MockClassifier`]: fixed probabilities for tests and demos

pub mod classifier;
pub mod frame;
pub mod mock;
pub mod pipeline;

pub use classifier::*;
pub use frame::*;
pub use mock::*;
pub use pipeline::*;
