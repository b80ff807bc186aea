//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{OutboundKind, ServerConfig};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    queue_length: usize,
    encoder_queue_length: usize,
    sample_rate: f64,
    tilt_threshold: f64,
    outbound: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_config(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    queue_length: config.gesture.queue_length,
                    encoder_queue_length: config.gesture.encoder_queue_length,
                    sample_rate: config.gesture.sample_rate,
                    tilt_threshold: config.gesture.tilt_threshold,
                    outbound: format!("{:?}", config.outbound.kind),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ServerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.gesture.tilt_threshold == 0.0 {
        warnings.push("gesture.tilt_threshold is 0 - every nonzero tilt pans".to_string());
    }

    if config.gesture.test_harness {
        warnings.push("gesture.test_harness is enabled - scripted gestures are mixed in".to_string());
    }

    if config.devices.accelerometer_serial.is_none() {
        warnings.push(
            "devices.accelerometer_serial is unset - the first accelerometer to attach is bound"
                .to_string(),
        );
    }

    if config.outbound.kind == OutboundKind::Log {
        warnings.push("outbound.kind is log - gestures are only written to the log".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Accelerometer window: {}", summary.queue_length);
            println!("  Encoder window: {}", summary.encoder_queue_length);
            println!("  Sample period: {}s", summary.sample_rate);
            println!("  Tilt threshold: {}", summary.tilt_threshold);
            println!("  Outbound: {}", summary.outbound);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
