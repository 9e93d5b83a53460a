//! Printer configuration - root configuration structure.

use serde::Deserialize;

use super::extruder::ExtruderConfig;
use super::kinematics::CartesianConfig;
use super::toolhead::ToolheadConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrinterConfig {
    /// Toolhead limits and buffering.
    pub toolhead: ToolheadConfig,

    /// Cartesian axis ranges.
    pub kinematics: CartesianConfig,

    /// Optional extruder; moves with extrusion are rejected without one.
    #[serde(default)]
    pub extruder: Option<ExtruderConfig>,
}

impl PrinterConfig {
    /// Maximum Z velocity, falling back to the toolhead limit.
    pub fn max_z_velocity(&self) -> f64 {
        self.kinematics
            .max_z_velocity
            .unwrap_or(self.toolhead.max_velocity)
    }

    /// Maximum Z acceleration, falling back to the toolhead limit.
    pub fn max_z_accel(&self) -> f64 {
        self.kinematics.max_z_accel.unwrap_or(self.toolhead.max_accel)
    }

    /// Check whether an extruder is configured.
    pub fn has_extruder(&self) -> bool {
        self.extruder.is_some()
    }
}
