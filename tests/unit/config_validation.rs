//! Unit tests for configuration validation.

use toolhead_planner::config::{validate_config, PrinterConfig};
use toolhead_planner::error::{ConfigError, Error};

const BASE: &str = r#"
[kinematics]
x = { position_min = 0.0, position_max = 200.0 }
y = { position_min = 0.0, position_max = 200.0 }
z = { position_min = 0.0, position_max = 180.0 }
"#;

fn config(toolhead: &str, extra: &str) -> PrinterConfig {
    let toml_str = format!("[toolhead]\n{}\n{}\n{}", toolhead, BASE, extra);
    toml::from_str(&toml_str).expect("Failed to parse TOML")
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = config(
        "max_velocity = 300.0\nmax_accel = 3000.0",
        "[extruder]\nnozzle_diameter = 0.4\nfilament_diameter = 1.75",
    );
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a non-positive velocity.
#[test]
fn test_zero_velocity_rejected() {
    let config = config("max_velocity = 0.0\nmax_accel = 3000.0", "");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidMaxVelocity(_)))
    ));
}

/// Test validation fails for a negative accel_to_decel.
#[test]
fn test_negative_accel_to_decel_rejected() {
    let config = config(
        "max_velocity = 300.0\nmax_accel = 3000.0\nmax_accel_to_decel = -1.0",
        "",
    );
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidMaxAcceleration(_)))
    ));
}

/// Test validation fails for inverted buffer watermarks.
#[test]
fn test_inverted_buffer_times_rejected() {
    let config = config(
        "max_velocity = 300.0\nmax_accel = 3000.0\nbuffer_time_low = 3.0\nbuffer_time_high = 2.0",
        "",
    );
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidBufferTimes { low, high })) if low == 3.0 && high == 2.0
    ));
}

/// Test validation fails for an axis whose minimum exceeds its maximum.
#[test]
fn test_inverted_axis_range_rejected() {
    let mut config = config("max_velocity = 300.0\nmax_accel = 3000.0", "");
    config.kinematics.y.min = 300.0;

    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidAxisRange { axis: 'y', .. }))
    ));
}

/// Test validation fails for a zero nozzle diameter.
#[test]
fn test_invalid_extruder_rejected() {
    let config = config(
        "max_velocity = 300.0\nmax_accel = 3000.0",
        "[extruder]\nnozzle_diameter = 0.0\nfilament_diameter = 1.75",
    );
    let result = validate_config(&config);
    assert!(matches!(result, Err(Error::Config(ConfigError::InvalidExtruder(_)))));
}
