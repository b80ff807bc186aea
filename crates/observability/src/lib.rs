//! # Observability
//!
//! Log subscriber setup, the optional Prometheus endpoint and the `tilty_*`
//! metric helpers called from the registry and the dispatch loop.
//!
//! Logging and metrics are installed separately: logging once per process,
//! the exporter only for sessions that ask for a metrics port.
//!
//! ```ignore
//! observability::init_logging(&LoggingConfig::default())?;
//! observability::init_metrics(9464)?;
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_device_attached, record_device_fault, record_gesture_sent, record_send_failure,
    record_sample_ingested, record_session_end, record_tick, record_tick_duration_ms,
    record_unknown_device, RunningStats, SessionSummary, StatsSummary,
};

/// Log subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter used when RUST_LOG is unset
    pub default_level: String,
    /// Use `default_level` even when RUST_LOG is set
    pub ignore_env: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            default_level: "info".to_string(),
            ignore_env: false,
        }
    }
}

impl LoggingConfig {
    fn filter(&self) -> EnvFilter {
        if self.ignore_env {
            return EnvFilter::new(&self.default_level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON lines
    #[default]
    Json,
    /// Multi-line human readable
    Pretty,
    /// Single-line human readable
    Compact,
}

/// Install the global tracing subscriber
///
/// Log lines go to stderr; stdout carries the gesture stream.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let layer = match config.format {
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).pretty().boxed(),
        LogFormat::Compact => fmt::layer().with_writer(std::io::stderr).compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(format = ?config.format, level = %config.default_level, "logging initialized");
    Ok(())
}

/// Serve Prometheus metrics on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}
