//! Configuration validation
//!
//! Rules:
//! - queue lengths >= 1
//! - sample_rate finite and > 0
//! - tilt_threshold finite and >= 0
//! - flip_x / flip_y / flip_z in {-1, 1}
//! - attach_timeout_ms > 0

use contracts::{ContractError, ServerConfig};

/// Validate a ServerConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ServerConfig) -> Result<(), ContractError> {
    config.gesture.validate()?;
    validate_devices(config)?;
    Ok(())
}

fn validate_devices(config: &ServerConfig) -> Result<(), ContractError> {
    let devices = &config.devices;
    if devices.attach_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "devices.attach_timeout_ms",
            "attach_timeout_ms must be > 0",
        ));
    }
    if let (Some(accel), Some(encoder)) = (devices.accelerometer_serial, devices.encoder_serial) {
        if accel == encoder {
            return Err(ContractError::config_validation(
                "devices.encoder_serial",
                format!("encoder_serial duplicates accelerometer_serial ({accel})"),
            ));
        }
    }
    Ok(())
}
