//! # code-review-logging
//!
//! Logging for code-review.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging to the console and an optional file
//! - [`LogEvent`] - Events emitted during a review run
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//!
//! Library crates log through `tracing`; [`init_tracing`] installs the
//! subscriber that renders those records.

mod events;

pub use events::{comparison_summary, LogEvent, LogFormat, Logger};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
