//! Cartesian kinematics: independent x, y and z rails.

use super::Kinematics;
use crate::config::{AxisRange, CartesianConfig, PrinterConfig};
use crate::error::{MoveError, Result};
use crate::motion::{Position, Segment};

const AXIS_NAMES: [char; 3] = ['x', 'y', 'z'];

/// Cartesian printer with per-axis travel limits.
///
/// Axes start unhomed; moving an unhomed axis is rejected until
/// [`Kinematics::set_position`] homes it.
#[derive(Debug, Clone)]
pub struct Cartesian {
    ranges: [AxisRange; 3],
    limits: [AxisRange; 3],
    max_z_velocity: f64,
    max_z_accel: f64,
}

impl Cartesian {
    /// Create kinematics from axis ranges and Z limits.
    pub fn new(config: &CartesianConfig, max_z_velocity: f64, max_z_accel: f64) -> Self {
        Self {
            ranges: config.ranges(),
            limits: [AxisRange::unhomed(); 3],
            max_z_velocity,
            max_z_accel,
        }
    }

    /// Create kinematics from a printer configuration.
    pub fn from_config(config: &PrinterConfig) -> Self {
        Self::new(&config.kinematics, config.max_z_velocity(), config.max_z_accel())
    }

    /// Forget the homing state of every axis.
    pub fn motor_off(&mut self) {
        self.limits = [AxisRange::unhomed(); 3];
    }

    /// Change the Z velocity and acceleration limits.
    pub fn set_z_limits(&mut self, max_z_velocity: f64, max_z_accel: f64) {
        self.max_z_velocity = max_z_velocity;
        self.max_z_accel = max_z_accel;
    }

    /// Check whether `axis` (0 = x, 1 = y, 2 = z) is homed.
    pub fn is_homed(&self, axis: usize) -> bool {
        self.limits.get(axis).map_or(false, AxisRange::is_valid)
    }

    fn check_endstops(&self, seg: &Segment) -> Result<()> {
        let end = seg.end_pos;
        for (i, limit) in self.limits.iter().enumerate() {
            if seg.axes_d[i] != 0.0 && !limit.contains(end[i]) {
                if !limit.is_valid() {
                    return Err(MoveError::NotHomed { position: end }.into());
                }
                return Err(MoveError::OutOfRange { position: end }.into());
            }
        }
        Ok(())
    }
}

impl Kinematics for Cartesian {
    fn check_move(&self, seg: &mut Segment) -> Result<()> {
        self.check_endstops(seg)?;

        let z_d = seg.axes_d[2];
        if z_d == 0.0 {
            return Ok(());
        }
        // Move with Z - update velocity and accel for slower Z axis
        let z_ratio = seg.move_d / z_d.abs();
        seg.limit_speed(self.max_z_velocity * z_ratio, self.max_z_accel * z_ratio);
        Ok(())
    }

    fn set_position(&mut self, _pos: Position, homing_axes: &[usize]) {
        for &axis in homing_axes {
            if let (Some(limit), Some(range)) = (self.limits.get_mut(axis), self.ranges.get(axis)) {
                *limit = *range;
            }
        }
    }

    fn homed_axes(&self) -> heapless::String<3> {
        let mut axes = heapless::String::new();
        for (i, name) in AXIS_NAMES.iter().enumerate() {
            if self.is_homed(i) {
                // Capacity matches the axis count.
                let _ = axes.push(*name);
            }
        }
        axes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::motion::MotionLimits;

    fn kinematics() -> Cartesian {
        let config = CartesianConfig::new(
            AxisRange::new(0.0, 200.0),
            AxisRange::new(0.0, 200.0),
            AxisRange::new(0.0, 100.0),
        );
        Cartesian::new(&config, 5.0, 100.0)
    }

    fn limits() -> MotionLimits {
        MotionLimits::new(300.0, 3000.0, 3000.0, 5.0)
    }

    #[test]
    fn test_unhomed_move_rejected() {
        let kin = kinematics();
        let mut seg = Segment::new([0.0; 4], [10.0, 0.0, 0.0, 0.0], 100.0, &limits());

        let result = kin.check_move(&mut seg);
        assert!(matches!(result, Err(Error::Move(MoveError::NotHomed { .. }))));
        assert_eq!(kin.homed_axes().as_str(), "");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut kin = kinematics();
        kin.set_position([0.0; 4], &[0, 1, 2]);
        assert_eq!(kin.homed_axes().as_str(), "xyz");

        let mut seg = Segment::new([0.0; 4], [250.0, 0.0, 0.0, 0.0], 100.0, &limits());
        let result = kin.check_move(&mut seg);
        assert!(matches!(result, Err(Error::Move(MoveError::OutOfRange { .. }))));
    }

    #[test]
    fn test_unmoved_axis_not_checked() {
        let mut kin = kinematics();
        kin.set_position([0.0; 4], &[0]);

        // Y and Z are unhomed but do not move.
        let mut seg = Segment::new([0.0, 500.0, 0.0, 0.0], [10.0, 500.0, 0.0, 0.0], 100.0, &limits());
        assert!(kin.check_move(&mut seg).is_ok());
        assert_eq!(kin.homed_axes().as_str(), "x");
    }

    #[test]
    fn test_z_move_slowed() {
        let mut kin = kinematics();
        kin.set_position([0.0; 4], &[0, 1, 2]);

        let mut seg = Segment::new([0.0; 4], [0.0, 0.0, 10.0, 0.0], 100.0, &limits());
        kin.check_move(&mut seg).unwrap();
        assert_eq!(seg.max_cruise_v2, 25.0);
        assert_eq!(seg.accel, 100.0);

        // Diagonal move: z_ratio = 2
        let mut seg = Segment::new([0.0; 4], [0.0, 17.320508075688775, 10.0, 0.0], 100.0, &limits());
        kin.check_move(&mut seg).unwrap();
        assert!((seg.max_cruise_v2 - 100.0).abs() < 1e-6);
        assert!((seg.accel - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_motor_off_unhomes() {
        let mut kin = kinematics();
        kin.set_position([0.0; 4], &[0, 1, 2]);
        kin.motor_off();
        assert_eq!(kin.homed_axes().as_str(), "");
    }
}
