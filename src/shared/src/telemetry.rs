//! Process-wide tracing setup.
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! An optional append-only log file receives the same events without ANSI colors.

use crate::error::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Calling it twice is harmless; the second call is ignored.
pub fn init(config: &TelemetryConfig) -> Result<()> {
    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if let Err(e) = tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        // Already installed (tests, embedding); keep the existing subscriber.
        tracing::debug!("tracing subscriber not installed: {}", e);
    }
    Ok(())
}
