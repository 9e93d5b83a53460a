//! Toolhead configuration from TOML.

use serde::Deserialize;

/// Velocity, acceleration and buffering limits of the toolhead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolheadConfig {
    /// Maximum velocity in mm/s.
    pub max_velocity: f64,

    /// Maximum acceleration in mm/s^2.
    pub max_accel: f64,

    /// Acceleration budget used for the smoothed velocity envelope.
    /// Defaults to `max_accel`.
    #[serde(default)]
    pub max_accel_to_decel: Option<f64>,

    /// Velocity at which a 90 degree corner may be taken, in mm/s.
    #[serde(default = "default_square_corner_velocity")]
    pub square_corner_velocity: f64,

    /// Buffer level below which the flush timer drains the device.
    #[serde(default = "default_buffer_time_low")]
    pub buffer_time_low: f64,

    /// Buffer level above which new moves stall the caller.
    #[serde(default = "default_buffer_time_high")]
    pub buffer_time_high: f64,

    /// Lead time added when printing resumes from an idle state.
    #[serde(default = "default_buffer_time_start")]
    pub buffer_time_start: f64,

    /// Margin kept between step generation and device flush.
    #[serde(default = "default_move_flush_time")]
    pub move_flush_time: f64,
}

fn default_square_corner_velocity() -> f64 {
    5.0
}

fn default_buffer_time_low() -> f64 {
    1.0
}

fn default_buffer_time_high() -> f64 {
    2.0
}

fn default_buffer_time_start() -> f64 {
    0.25
}

fn default_move_flush_time() -> f64 {
    0.05
}

impl ToolheadConfig {
    /// Create a configuration with default buffering for the given limits.
    pub fn new(max_velocity: f64, max_accel: f64) -> Self {
        Self {
            max_velocity,
            max_accel,
            max_accel_to_decel: None,
            square_corner_velocity: default_square_corner_velocity(),
            buffer_time_low: default_buffer_time_low(),
            buffer_time_high: default_buffer_time_high(),
            buffer_time_start: default_buffer_time_start(),
            move_flush_time: default_move_flush_time(),
        }
    }

    /// Effective accel-to-decel budget (defaults to `max_accel`).
    #[inline]
    pub fn max_accel_to_decel(&self) -> f64 {
        self.max_accel_to_decel.unwrap_or(self.max_accel)
    }
}
