//! Unit tests for TOML configuration parsing.

use toolhead_planner::config::{load_config, parse_config, PrinterConfig};
use toolhead_planner::error::{ConfigError, Error};

/// Test parsing a toolhead with every optional field set.
#[test]
fn test_parse_toolhead_config() {
    let toml_str = r#"
[toolhead]
max_velocity = 500.0
max_accel = 4000.0
max_accel_to_decel = 2000.0
square_corner_velocity = 8.0
buffer_time_low = 0.5
buffer_time_high = 1.5
buffer_time_start = 0.1
move_flush_time = 0.02

[kinematics]
x = { position_min = 0.0, position_max = 250.0 }
y = { position_min = 0.0, position_max = 210.0 }
z = { position_min = 0.0, position_max = 200.0 }
"#;

    let config: PrinterConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let toolhead = &config.toolhead;

    assert_eq!(toolhead.max_velocity, 500.0);
    assert_eq!(toolhead.max_accel, 4000.0);
    assert_eq!(toolhead.max_accel_to_decel(), 2000.0);
    assert_eq!(toolhead.square_corner_velocity, 8.0);
    assert_eq!(toolhead.buffer_time_low, 0.5);
    assert_eq!(toolhead.buffer_time_high, 1.5);
    assert_eq!(toolhead.buffer_time_start, 0.1);
    assert_eq!(toolhead.move_flush_time, 0.02);
    assert_eq!(config.kinematics.x.max, 250.0);
    assert!(!config.has_extruder());
}

/// Test that omitted fields fall back to their defaults.
#[test]
fn test_parse_defaults() {
    let toml_str = r#"
[toolhead]
max_velocity = 300.0
max_accel = 3000.0

[kinematics]
x = { position_max = 200.0 }
y = { position_max = 200.0 }
z = { position_max = 180.0 }
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");

    assert_eq!(config.toolhead.max_accel_to_decel(), 3000.0);
    assert_eq!(config.toolhead.square_corner_velocity, 5.0);
    assert_eq!(config.toolhead.buffer_time_low, 1.0);
    assert_eq!(config.toolhead.buffer_time_high, 2.0);
    assert_eq!(config.toolhead.buffer_time_start, 0.25);
    assert_eq!(config.toolhead.move_flush_time, 0.05);
    assert_eq!(config.kinematics.z.min, 0.0);
    assert_eq!(config.max_z_velocity(), 300.0);
    assert_eq!(config.max_z_accel(), 3000.0);
}

/// Test parsing an extruder section.
#[test]
fn test_parse_extruder_config() {
    let toml_str = r#"
[toolhead]
max_velocity = 300.0
max_accel = 3000.0

[kinematics]
x = { position_max = 200.0 }
y = { position_max = 200.0 }
z = { position_max = 180.0 }
max_z_velocity = 15.0

[extruder]
nozzle_diameter = 0.6
filament_diameter = 1.75
max_extrude_only_distance = 100.0
pressure_advance = 0.04
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let extruder = config.extruder.as_ref().expect("Extruder not found");

    assert_eq!(extruder.nozzle_diameter, 0.6);
    assert_eq!(extruder.max_extrude_only_distance, 100.0);
    assert_eq!(extruder.pressure_advance, 0.04);
    assert_eq!(extruder.pressure_advance_smooth_time, 0.040);
    assert!((extruder.max_cross_section() - 4.0 * 0.36).abs() < 1e-12);
    assert_eq!(config.max_z_velocity(), 15.0);
}

/// Test that a missing required field is reported as a parse error.
#[test]
fn test_missing_required_field() {
    let toml_str = r#"
[toolhead]
max_velocity = 300.0

[kinematics]
x = { position_max = 200.0 }
y = { position_max = 200.0 }
z = { position_max = 180.0 }
"#;

    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test loading configuration from a file on disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("toolhead_planner_config_parsing.toml");
    std::fs::write(
        &path,
        r#"
[toolhead]
max_velocity = 250.0
max_accel = 2500.0

[kinematics]
x = { position_max = 200.0 }
y = { position_max = 200.0 }
z = { position_max = 180.0 }
"#,
    )
    .expect("Failed to write config");

    let config = load_config(&path).expect("Failed to load config");
    assert_eq!(config.toolhead.max_velocity, 250.0);

    std::fs::remove_file(&path).ok();
}
