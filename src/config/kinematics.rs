//! Cartesian kinematics configuration and axis ranges.

use serde::Deserialize;

/// Travel range of one axis (from configuration).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AxisRange {
    /// Minimum allowed position in mm.
    #[serde(rename = "position_min", default)]
    pub min: f64,

    /// Maximum allowed position in mm.
    #[serde(rename = "position_max")]
    pub max: f64,
}

impl AxisRange {
    /// Create a new axis range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range of an axis that has not been homed.
    ///
    /// `min > max`, so no position is ever contained.
    pub const fn unhomed() -> Self {
        Self { min: 1.0, max: -1.0 }
    }

    /// Check if the range is valid (min <= max).
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Check if a position is within the range.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.min && position <= self.max
    }
}

/// Cartesian printer kinematics (from configuration).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartesianConfig {
    /// X axis range.
    pub x: AxisRange,

    /// Y axis range.
    pub y: AxisRange,

    /// Z axis range.
    pub z: AxisRange,

    /// Maximum Z velocity in mm/s (defaults to toolhead max velocity).
    #[serde(default)]
    pub max_z_velocity: Option<f64>,

    /// Maximum Z acceleration in mm/s^2 (defaults to toolhead max accel).
    #[serde(default)]
    pub max_z_accel: Option<f64>,
}

impl CartesianConfig {
    /// Create a configuration from axis ranges with unlimited Z speed.
    pub fn new(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self {
            x,
            y,
            z,
            max_z_velocity: None,
            max_z_accel: None,
        }
    }

    /// Axis ranges in x, y, z order.
    pub fn ranges(&self) -> [AxisRange; 3] {
        [self.x, self.y, self.z]
    }
}
