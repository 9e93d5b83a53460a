//! Extruder configuration from TOML.

use core::f64::consts::PI;

use serde::Deserialize;

/// Filament geometry and extrusion limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtruderConfig {
    /// Nozzle diameter in mm.
    pub nozzle_diameter: f64,

    /// Filament diameter in mm.
    pub filament_diameter: f64,

    /// Maximum extrusion cross section in mm^2.
    /// Defaults to `4 * nozzle_diameter^2`.
    #[serde(default)]
    pub max_extrude_cross_section: Option<f64>,

    /// Longest allowed extrude-only move in mm of filament.
    #[serde(default = "default_max_extrude_only_distance")]
    pub max_extrude_only_distance: f64,

    /// Extrude-only velocity limit in mm/s of filament.
    #[serde(default)]
    pub max_extrude_only_velocity: Option<f64>,

    /// Extrude-only acceleration limit in mm/s^2 of filament.
    #[serde(default)]
    pub max_extrude_only_accel: Option<f64>,

    /// Maximum instantaneous velocity change of the filament at a junction.
    #[serde(default = "default_instantaneous_corner_velocity")]
    pub instantaneous_corner_velocity: f64,

    /// Pressure advance coefficient (0 disables it).
    #[serde(default)]
    pub pressure_advance: f64,

    /// Smoothing window of pressure advance in seconds.
    #[serde(default = "default_pressure_advance_smooth_time")]
    pub pressure_advance_smooth_time: f64,
}

fn default_max_extrude_only_distance() -> f64 {
    50.0
}

fn default_instantaneous_corner_velocity() -> f64 {
    1.0
}

fn default_pressure_advance_smooth_time() -> f64 {
    0.040
}

impl ExtruderConfig {
    /// Create a configuration for a nozzle and filament with default limits.
    pub fn new(nozzle_diameter: f64, filament_diameter: f64) -> Self {
        Self {
            nozzle_diameter,
            filament_diameter,
            max_extrude_cross_section: None,
            max_extrude_only_distance: default_max_extrude_only_distance(),
            max_extrude_only_velocity: None,
            max_extrude_only_accel: None,
            instantaneous_corner_velocity: default_instantaneous_corner_velocity(),
            pressure_advance: 0.0,
            pressure_advance_smooth_time: default_pressure_advance_smooth_time(),
        }
    }

    /// Filament cross-section area in mm^2.
    pub fn filament_area(&self) -> f64 {
        let radius = self.filament_diameter * 0.5;
        PI * radius * radius
    }

    /// Effective maximum extrusion cross section in mm^2.
    pub fn max_cross_section(&self) -> f64 {
        self.max_extrude_cross_section
            .unwrap_or(4.0 * self.nozzle_diameter * self.nozzle_diameter)
    }

    /// Ratio of filament length to toolhead travel at the maximum cross section.
    pub fn max_extrude_ratio(&self) -> f64 {
        self.max_cross_section() / self.filament_area()
    }
}
