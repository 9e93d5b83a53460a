//! Velocity and acceleration limits shared by every queued segment.

use libm::sqrt;

use crate::config::ToolheadConfig;

/// Active motion limits of the toolhead.
///
/// `junction_deviation` is derived from the square corner velocity and
/// `max_accel`; it is recomputed whenever either changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionLimits {
    /// Maximum cartesian velocity in mm/s.
    pub max_velocity: f64,
    /// Maximum acceleration in mm/s^2.
    pub max_accel: f64,
    /// Acceleration budget of the smoothed envelope (never above `max_accel`).
    pub max_accel_to_decel: f64,
    /// Velocity at which a 90 degree corner may be taken.
    pub square_corner_velocity: f64,
    /// Derived cornering constant in mm.
    pub junction_deviation: f64,
    requested_accel_to_decel: f64,
}

impl MotionLimits {
    /// Create limits and derive the junction deviation.
    pub fn new(
        max_velocity: f64,
        max_accel: f64,
        max_accel_to_decel: f64,
        square_corner_velocity: f64,
    ) -> Self {
        let mut limits = Self {
            max_velocity,
            max_accel,
            max_accel_to_decel,
            square_corner_velocity,
            junction_deviation: 0.0,
            requested_accel_to_decel: max_accel_to_decel,
        };
        limits.recalculate();
        limits
    }

    /// Limits configured for a toolhead.
    pub fn from_config(config: &ToolheadConfig) -> Self {
        Self::new(
            config.max_velocity,
            config.max_accel,
            config.max_accel_to_decel(),
            config.square_corner_velocity,
        )
    }

    /// Change the acceleration budget of the smoothed envelope.
    pub fn set_accel_to_decel(&mut self, max_accel_to_decel: f64) {
        self.requested_accel_to_decel = max_accel_to_decel;
        self.recalculate();
    }

    /// Acceleration budget last requested, before clamping to `max_accel`.
    #[inline]
    pub fn requested_accel_to_decel(&self) -> f64 {
        self.requested_accel_to_decel
    }

    /// Recompute derived values after a limit changed.
    pub fn recalculate(&mut self) {
        let scv2 = self.square_corner_velocity * self.square_corner_velocity;
        self.junction_deviation = scv2 * (sqrt(2.0) - 1.0) / self.max_accel;
        self.max_accel_to_decel = self.requested_accel_to_decel.min(self.max_accel);
    }

    /// Highest velocity at which any axis may be brought to a halt at a corner.
    pub fn max_axis_halt(&self) -> f64 {
        self.max_velocity
            .min(sqrt(8.0 * self.junction_deviation * self.max_accel))
    }
}
