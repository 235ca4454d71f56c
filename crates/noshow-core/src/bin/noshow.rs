//! No-Show Predictor terminal binary.
//!
//! Loads the appointment feed and model once, then serves queries from an
//! interactive form on stdin/stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! NOSHOW_FEED=appointments.csv NOSHOW_MODEL=model.json cargo run --bin noshow
//! ```
//!
//! See [`noshow_core::config`] for all environment variables. `RUST_LOG`
//! sets the log level (default: info).

use std::env;
use std::io;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use noshow_core::{AppConfig, AppContext, Session};

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::load().context("failed to read configuration")?;
    info!(
        feed = %config.feed_path.display(),
        model = %config.model_path.display(),
        "starting no-show predictor"
    );

    let ctx = AppContext::load(&config).context("startup failed")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(&ctx, &config, stdin.lock(), stdout.lock());
    let summary = session.run()?;

    info!(
        submitted = summary.submitted,
        completed = summary.completed,
        "session ended"
    );
    Ok(())
}
