//! Configuration validation.

use crate::error::{truncated, ConfigError, Error, Result};

use super::{CartesianConfig, ExtruderConfig, PrinterConfig, ToolheadConfig};

/// Validate a printer configuration.
///
/// Checks:
/// - Velocities and accelerations are positive
/// - Buffer watermarks are ordered (0 < low < high)
/// - Axis ranges are valid (min <= max)
/// - Extruder geometry is positive
pub fn validate_config(config: &PrinterConfig) -> Result<()> {
    validate_toolhead(&config.toolhead)?;
    validate_kinematics(&config.kinematics)?;

    if let Some(ref extruder) = config.extruder {
        validate_extruder(extruder)?;
    }

    Ok(())
}

pub(crate) fn validate_toolhead(config: &ToolheadConfig) -> Result<()> {
    if config.max_velocity <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxVelocity(config.max_velocity)));
    }

    if config.max_accel <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration(config.max_accel)));
    }

    let accel_to_decel = config.max_accel_to_decel();
    if accel_to_decel <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration(accel_to_decel)));
    }

    if config.square_corner_velocity < 0.0 {
        return Err(Error::Config(ConfigError::InvalidCornerVelocity(
            config.square_corner_velocity,
        )));
    }

    let (low, high) = (config.buffer_time_low, config.buffer_time_high);
    if low <= 0.0 || low >= high || config.buffer_time_start < 0.0 {
        return Err(Error::Config(ConfigError::InvalidBufferTimes { low, high }));
    }

    if config.move_flush_time < 0.0 {
        return Err(Error::Config(ConfigError::InvalidFlushTime(config.move_flush_time)));
    }

    Ok(())
}

fn validate_kinematics(config: &CartesianConfig) -> Result<()> {
    for (axis, range) in ['x', 'y', 'z'].into_iter().zip(config.ranges()) {
        if !range.is_valid() {
            return Err(Error::Config(ConfigError::InvalidAxisRange {
                axis,
                min: range.min,
                max: range.max,
            }));
        }
    }

    if let Some(v) = config.max_z_velocity {
        if v <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidMaxVelocity(v)));
        }
    }

    if let Some(a) = config.max_z_accel {
        if a <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidMaxAcceleration(a)));
        }
    }

    Ok(())
}

fn validate_extruder(config: &ExtruderConfig) -> Result<()> {
    let invalid = |msg: &str| {
        Error::Config(ConfigError::InvalidExtruder(
            truncated(msg),
        ))
    };

    if config.nozzle_diameter <= 0.0 {
        return Err(invalid("nozzle_diameter must be > 0"));
    }

    if config.filament_diameter <= 0.0 {
        return Err(invalid("filament_diameter must be > 0"));
    }

    if config.max_cross_section() <= 0.0 {
        return Err(invalid("max_extrude_cross_section must be > 0"));
    }

    if config.pressure_advance < 0.0 || config.pressure_advance_smooth_time <= 0.0 {
        return Err(invalid("pressure advance settings out of range"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisRange;

    fn printer() -> PrinterConfig {
        PrinterConfig {
            toolhead: ToolheadConfig::new(300.0, 3000.0),
            kinematics: CartesianConfig::new(
                AxisRange::new(0.0, 200.0),
                AxisRange::new(0.0, 200.0),
                AxisRange::new(0.0, 180.0),
            ),
            extruder: Some(ExtruderConfig::new(0.4, 1.75)),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&printer()).is_ok());
    }

    #[test]
    fn test_invalid_buffer_times() {
        let mut config = printer();
        config.toolhead.buffer_time_low = 3.0;

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidBufferTimes { .. }))
        ));
    }

    #[test]
    fn test_invalid_axis_range() {
        let mut config = printer();
        config.kinematics.y = AxisRange::new(10.0, 5.0);

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidAxisRange { axis: 'y', .. }))
        ));
    }

    #[test]
    fn test_invalid_max_velocity() {
        let mut config = printer();
        config.toolhead.max_velocity = 0.0;

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidMaxVelocity(_)))
        ));
    }

    #[test]
    fn test_invalid_extruder() {
        let mut config = printer();
        if let Some(ref mut extruder) = config.extruder {
            extruder.filament_diameter = 0.0;
        }

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidExtruder(_)))
        ));
    }
}
