//! Error types for toolhead-planner.
//!
//! Provides unified error handling across configuration, move validation,
//! and device scheduling.

use core::fmt;

use crate::motion::Position;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all planner operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Requested move violates a kinematic or extrusion limit
    Move(MoveError),
    /// Device desynchronized or reported a fault
    Device(DeviceError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid max velocity (must be > 0)
    InvalidMaxVelocity(f64),
    /// Invalid max acceleration (must be > 0)
    InvalidMaxAcceleration(f64),
    /// Invalid square corner velocity (must be >= 0)
    InvalidCornerVelocity(f64),
    /// Buffer watermarks out of order or negative
    InvalidBufferTimes {
        /// Low-water mark in seconds
        low: f64,
        /// High-water mark in seconds
        high: f64,
    },
    /// Invalid flush margin (must be >= 0)
    InvalidFlushTime(f64),
    /// Invalid axis range (min must be <= max)
    InvalidAxisRange {
        /// Axis letter
        axis: char,
        /// Minimum position
        min: f64,
        /// Maximum position
        max: f64,
    },
    /// Invalid extruder geometry (diameters must be > 0)
    InvalidExtruder(heapless::String<64>),
    /// Too many step generation scan windows registered
    ScanWindowsFull,
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Move validation errors, raised before a segment is queued.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveError {
    /// Endpoint lies outside the configured axis range
    OutOfRange {
        /// Requested end position
        position: Position,
    },
    /// Axis must be homed before it can be moved
    NotHomed {
        /// Requested end position
        position: Position,
    },
    /// Extrusion requested but no extruder is configured
    NoExtruder,
    /// Extrude-only move longer than allowed
    ExtrudeOnlyTooLong {
        /// Requested extrusion distance
        distance: f64,
        /// Configured maximum
        max: f64,
    },
    /// Extrusion cross section exceeds the nozzle limit
    ExtrudeCrossSection {
        /// Requested cross section in mm^2
        area: f64,
        /// Configured maximum in mm^2
        max: f64,
    },
    /// Requested speed is zero, negative or not finite
    InvalidSpeed(f64),
}

/// Device scheduling errors.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// Step flush requested for a time the device has already passed
    TimerTooClose {
        /// Schedule time of the rejected flush
        print_time: f64,
    },
    /// Device reported an internal fault
    Fault(heapless::String<64>),
}

/// Copy `text` into a fixed-capacity string, cutting it at the last
/// character that fits.
pub(crate) fn truncated<const N: usize>(text: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Move(e) => write!(f, "Move error: {}", e),
            Error::Device(e) => write!(f, "Device error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMaxVelocity(v) => write!(f, "Invalid max velocity: {}. Must be > 0", v),
            ConfigError::InvalidMaxAcceleration(v) => {
                write!(f, "Invalid max acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidCornerVelocity(v) => {
                write!(f, "Invalid square corner velocity: {}. Must be >= 0", v)
            }
            ConfigError::InvalidBufferTimes { low, high } => {
                write!(f, "Invalid buffer times: low ({}) must be > 0 and < high ({})", low, high)
            }
            ConfigError::InvalidFlushTime(v) => write!(f, "Invalid flush time: {}. Must be >= 0", v),
            ConfigError::InvalidAxisRange { axis, min, max } => {
                write!(f, "Invalid {} range: min ({}) must be <= max ({})", axis, min, max)
            }
            ConfigError::InvalidExtruder(msg) => write!(f, "Invalid extruder: {}", msg),
            ConfigError::ScanWindowsFull => write!(f, "Too many step generation scan windows"),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfRange { position: p } => write!(
                f,
                "Move out of range: {:.3} {:.3} {:.3} [{:.3}]",
                p[0], p[1], p[2], p[3]
            ),
            MoveError::NotHomed { position: p } => write!(
                f,
                "Must home axis first: {:.3} {:.3} {:.3} [{:.3}]",
                p[0], p[1], p[2], p[3]
            ),
            MoveError::NoExtruder => write!(f, "Extrude when no extruder present"),
            MoveError::ExtrudeOnlyTooLong { distance, max } => write!(
                f,
                "Extrude only move too long ({:.3}mm vs {:.3}mm)",
                distance, max
            ),
            MoveError::ExtrudeCrossSection { area, max } => write!(
                f,
                "Move exceeds maximum extrusion ({:.3}mm^2 vs {:.3}mm^2)",
                area, max
            ),
            MoveError::InvalidSpeed(v) => write!(f, "Invalid speed: {}. Must be > 0", v),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::TimerTooClose { print_time } => {
                write!(f, "Timer too close at print time {:.6}", print_time)
            }
            DeviceError::Fault(msg) => write!(f, "Device fault: {}", msg),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MoveError> for Error {
    fn from(e: MoveError) -> Self {
        Error::Move(e)
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Error::Device(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MoveError {}

#[cfg(feature = "std")]
impl std::error::Error for DeviceError {}
