//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{DeviceSerial, ServerConfig};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    gesture: GestureInfo,
    devices: DevicesInfo,
    outbound: OutboundInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    orientation: Option<OrientationInfo>,
}

#[derive(Serialize)]
struct GestureInfo {
    queue_length: usize,
    encoder_queue_length: usize,
    sample_rate: f64,
    tilt_threshold: f64,
    test_harness: bool,
}

#[derive(Serialize)]
struct DevicesInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    accelerometer_serial: Option<DeviceSerial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoder_serial: Option<DeviceSerial>,
    attach_timeout_ms: u64,
    level_on_session_start: bool,
}

#[derive(Serialize)]
struct OutboundInfo {
    kind: String,
}

/// Where each logical axis reads from and with which sign
#[derive(Serialize)]
struct OrientationInfo {
    x: AxisRoute,
    y: AxisRoute,
    encoder_sign: f64,
}

#[derive(Serialize)]
struct AxisRoute {
    source: &'static str,
    sign: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn orientation_info(config: &ServerConfig) -> OrientationInfo {
    let orientation = config.gesture.orientation();
    let sources = orientation.source_axes();
    let signs = orientation.accelerometer_signs();
    let route = |logical: usize| AxisRoute {
        source: AXIS_NAMES[sources[logical]],
        sign: signs[sources[logical]],
    };

    OrientationInfo {
        x: route(0),
        y: route(1),
        encoder_sign: orientation.sign_z,
    }
}

fn build_config_info(config: &ServerConfig, args: &InfoArgs) -> ConfigInfo {
    let gesture = &config.gesture;
    ConfigInfo {
        version: format!("{:?}", config.version),
        gesture: GestureInfo {
            queue_length: gesture.queue_length,
            encoder_queue_length: gesture.encoder_queue_length,
            sample_rate: gesture.sample_rate,
            tilt_threshold: gesture.tilt_threshold,
            test_harness: gesture.test_harness,
        },
        devices: DevicesInfo {
            accelerometer_serial: config.devices.accelerometer_serial,
            encoder_serial: config.devices.encoder_serial,
            attach_timeout_ms: config.devices.attach_timeout_ms,
            level_on_session_start: config.devices.level_on_session_start,
        },
        outbound: OutboundInfo {
            kind: format!("{:?}", config.outbound.kind),
        },
        orientation: args.orientation.then(|| orientation_info(config)),
    }
}

fn print_config_info(config: &ServerConfig, args: &InfoArgs) {
    let gesture = &config.gesture;
    println!("=== Tilty Configuration ===\n");
    println!("Version: {:?}", config.version);

    println!("\nGesture");
    println!("   ├─ Accelerometer window: {}", gesture.queue_length);
    println!("   ├─ Encoder window: {}", gesture.encoder_queue_length);
    println!("   ├─ Sample period: {}s", gesture.sample_rate);
    println!("   ├─ Tilt threshold: {}", gesture.tilt_threshold);
    println!(
        "   └─ Test harness: {}",
        if gesture.test_harness { "on" } else { "off" }
    );

    let devices = &config.devices;
    println!("\nDevices");
    match devices.accelerometer_serial {
        Some(serial) => println!("   ├─ Accelerometer: {}", serial),
        None => println!("   ├─ Accelerometer: (first to attach)"),
    }
    match devices.encoder_serial {
        Some(serial) => println!("   ├─ Encoder: {}", serial),
        None => println!("   ├─ Encoder: (first to attach)"),
    }
    println!("   ├─ Attach timeout: {}ms", devices.attach_timeout_ms);
    println!(
        "   └─ Level on session start: {}",
        devices.level_on_session_start
    );

    println!("\nOutbound");
    println!("   └─ Kind: {:?}", config.outbound.kind);

    if args.orientation {
        let orientation = orientation_info(config);
        println!("\nOrientation");
        println!(
            "   ├─ X <- raw {} (sign {:+})",
            orientation.x.source, orientation.x.sign
        );
        println!(
            "   ├─ Y <- raw {} (sign {:+})",
            orientation.y.source, orientation.y.sign
        );
        println!("   └─ Encoder sign: {:+}", orientation.encoder_sign);
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_follows_swapped_axes() {
        let mut config = ServerConfig::default();
        config.gesture.flip_x = 1;
        config.gesture.flip_y = -1;
        config.gesture.swap_xy = true;

        let orientation = orientation_info(&config);
        assert_eq!(orientation.x.source, "y");
        assert_eq!(orientation.x.sign, -1.0);
        assert_eq!(orientation.y.source, "x");
        assert_eq!(orientation.y.sign, 1.0);
        assert_eq!(orientation.encoder_sign, -1.0);
    }

    #[test]
    fn test_json_info_omits_unset_serials() {
        let config = ServerConfig::default();
        let args = InfoArgs {
            config: "tilty.toml".into(),
            json: true,
            orientation: false,
        };
        let json = serde_json::to_value(build_config_info(&config, &args)).unwrap();
        assert!(json["devices"].get("accelerometer_serial").is_none());
        assert!(json.get("orientation").is_none());
        assert_eq!(json["outbound"]["kind"], "Log");
    }
}
