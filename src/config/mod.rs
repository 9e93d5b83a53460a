//! Configuration module for toolhead-planner.
//!
//! Provides types for loading and validating toolhead, kinematics and
//! extruder configuration from TOML files (with `std` feature) or
//! pre-built values.

mod extruder;
mod kinematics;
mod system;
mod toolhead;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use extruder::ExtruderConfig;
pub use kinematics::{AxisRange, CartesianConfig};
pub use system::PrinterConfig;
pub use toolhead::ToolheadConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
