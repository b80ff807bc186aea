//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{DeviceSerial, ServerConfig};
use std::time::Duration;
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::session::{Session, SessionOptions};

/// Execute the `run` command
pub async fn run_server(args: &RunArgs) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => {
            info!(config = %path.display(), "Loading configuration");
            load_config(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            ServerConfig::default()
        }
    };

    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config).context("Invalid configuration after CLI overrides")?;

    info!(
        queue_length = config.gesture.queue_length,
        encoder_queue_length = config.gesture.encoder_queue_length,
        sample_rate = config.gesture.sample_rate,
        tilt_threshold = config.gesture.tilt_threshold,
        outbound = ?config.outbound.kind,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let options = SessionOptions {
        config,
        simulate: args.simulate,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    info!("Starting session...");

    let stats = Session::new(options)
        .run(shutdown_signal())
        .await
        .context("Session failed")?;

    info!(
        reason = %stats.end.reason,
        gestures_sent = stats.end.metrics.gestures_sent(),
        duration_secs = stats.end.duration.as_secs_f64(),
        "Session ended"
    );
    stats.print_summary();

    info!("Tilty server finished");
    Ok(())
}

/// Copy every flag given on the command line over the file values
fn apply_overrides(config: &mut ServerConfig, args: &RunArgs) {
    let gesture = &mut config.gesture;
    if let Some(length) = args.accelerometer_queue_length {
        gesture.queue_length = length;
    }
    if let Some(length) = args.encoder_queue_length {
        gesture.encoder_queue_length = length;
    }
    if let Some(rate) = args.tilt_sample_rate {
        gesture.sample_rate = rate;
    }
    if let Some(threshold) = args.tilt_threshold {
        gesture.tilt_threshold = threshold;
    }
    if args.swap_xy {
        gesture.swap_xy = true;
    }
    if let Some(flip) = args.flip_x {
        gesture.flip_x = flip;
    }
    if let Some(flip) = args.flip_y {
        gesture.flip_y = flip;
    }
    if let Some(flip) = args.flip_z {
        gesture.flip_z = flip;
    }
    if args.test_harness {
        gesture.test_harness = true;
    }

    if let Some(serial) = args.accelerometer_serial {
        config.devices.accelerometer_serial = Some(DeviceSerial::new(serial));
    }
    if let Some(serial) = args.encoder_serial {
        config.devices.encoder_serial = Some(DeviceSerial::new(serial));
    }
    if let Some(outbound) = args.outbound {
        config.outbound.kind = outbound.into();
    }
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves instead of aborting the
/// session.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &ServerConfig) {
    let gesture = &config.gesture;
    println!("\n=== Configuration Summary ===\n");
    println!("Gesture:");
    println!("  Accelerometer window: {}", gesture.queue_length);
    println!("  Encoder window: {}", gesture.encoder_queue_length);
    println!("  Sample period: {}s", gesture.sample_rate);
    println!("  Tilt threshold: {}", gesture.tilt_threshold);
    println!(
        "  Flip: x={} y={} z={}, swap_xy={}",
        gesture.flip_x, gesture.flip_y, gesture.flip_z, gesture.swap_xy
    );
    if gesture.test_harness {
        println!("  Test harness: enabled");
    }

    println!("\nDevices:");
    println!(
        "  Accelerometer: {}",
        serial_label(config.devices.accelerometer_serial)
    );
    println!("  Encoder: {}", serial_label(config.devices.encoder_serial));
    println!("  Attach timeout: {}ms", config.devices.attach_timeout_ms);

    println!("\nOutbound: {:?}", config.outbound.kind);
    println!();
}

fn serial_label(serial: Option<DeviceSerial>) -> String {
    serial.map_or_else(|| "first to attach".to_string(), |s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use contracts::OutboundKind;

    fn run_args(extra: &[&str]) -> RunArgs {
        let argv = ["tilty-server", "run"].iter().chain(extra).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = ServerConfig::default();
        let args = run_args(&[
            "--encoder-queue-length",
            "4",
            "--tilt-sample-rate",
            "0.05",
            "--tilt-threshold",
            "0.01",
            "--flip-x",
            "-1",
            "--flip-z",
            "1",
            "--accelerometer-serial",
            "596113",
            "--outbound",
            "stdout",
            "--test-harness",
        ]);

        apply_overrides(&mut config, &args);

        assert_eq!(config.gesture.encoder_queue_length, 4);
        assert_eq!(config.gesture.sample_rate, 0.05);
        assert_eq!(config.gesture.tilt_threshold, 0.01);
        assert_eq!(config.gesture.flip_x, -1);
        assert_eq!(config.gesture.flip_y, -1);
        assert_eq!(config.gesture.flip_z, 1);
        assert!(config.gesture.test_harness);
        assert_eq!(
            config.devices.accelerometer_serial,
            Some(DeviceSerial::new(596_113))
        );
        assert_eq!(config.devices.encoder_serial, None);
        assert_eq!(config.outbound.kind, OutboundKind::Stdout);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let mut config = ServerConfig::default();
        config.gesture.swap_xy = true;
        config.gesture.queue_length = 7;

        apply_overrides(&mut config, &run_args(&[]));

        assert!(config.gesture.swap_xy);
        assert_eq!(config.gesture.queue_length, 7);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let mut config = ServerConfig::default();
        apply_overrides(&mut config, &run_args(&["--flip-x", "2"]));
        assert!(config_loader::ConfigLoader::validate(&config).is_err());
    }

    #[tokio::test]
    async fn test_missing_config_file_is_reported() {
        let args = run_args(&["--config", "/nonexistent/tilty.toml"]);
        let err = run_server(&args).await.unwrap_err();
        assert!(format!("{err:#}").contains("Configuration file not found"));
    }

    #[tokio::test]
    async fn test_dry_run_accepts_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tilty.toml");
        std::fs::write(&path, "[gesture]\nqueue_length = 3\n").unwrap();

        let args = run_args(&["--config", path.to_str().unwrap(), "--dry-run"]);
        run_server(&args).await.unwrap();
    }
}
