//! No-Show Predictor Core Library
//!
//! Filters a clinic's scheduled appointments by clinic and inclusive date
//! range, then scores each one with a pre-trained no-show classifier.
//!
//! # Architecture
//!
//! ```text
//! CSV feed ──load──▶ AppointmentTable ─┐
//!                                      ├──▶ AppContext (read-only)
//! Model artifact ──load──▶ Classifier ─┘            │
//!                                                   ▼
//!   clinic + start + end ──▶ parse ──▶ filter ──▶ classify ──▶ label (> 0.5)
//!                                        │                        │
//!                                        ▼                        ▼
//!                               "No appointments found"     result table
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (AppointmentRecord, DateRange, ScoredAppointment)
//! - [`feed`]: CSV appointment feed loader
//! - [`scorer`]: Filter, classify and label
//! - [`context`]: The loaded feed and classifier
//! - [`config`]: TOML + environment configuration
//! - [`report`]: Table, CSV and JSON rendering
//! - [`session`]: Interactive terminal form

pub mod config;
pub mod context;
pub mod feed;
pub mod models;
pub mod report;
pub mod scorer;
pub mod session;

// Re-export commonly used types
pub use config::AppConfig;
pub use context::{AppContext, ContextError};
pub use models::{AppointmentRecord, AppointmentTable, DateRange, NoShowLabel, ScoredAppointment};
pub use report::OutputFormat;
pub use scorer::{execute, run_query, QueryError, QueryOutcome};
pub use session::Session;
