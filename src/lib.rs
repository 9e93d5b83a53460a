//! # toolhead-planner
//!
//! Look-ahead trapezoidal motion planning and device-clock scheduling for
//! 3D printer hosts.
//!
//! ## Features
//!
//! - **Look-ahead planning**: Junction velocities resolved across queued moves
//! - **Junction deviation cornering**: Corner speed derived from the square corner velocity
//! - **Buffered scheduling**: Device buffer kept between low and high watermarks
//! - **Drip moves**: Homing and probing moves that stop as soon as an endstop triggers
//! - **Configuration-driven**: Toolhead, kinematics and extruder limits from TOML files
//! - **no_std compatible**: Core library only needs an allocator
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use toolhead_planner::{Cartesian, Toolhead, TrapQ};
//!
//! // Load configuration from TOML
//! let config = toolhead_planner::load_config("printer.toml")?;
//!
//! // Wire the scheduler to the device and the host event loop
//! let kin = Cartesian::from_config(&config);
//! let mut toolhead = Toolhead::new(&config.toolhead, mcu, reactor, TrapQ::new(), kin);
//!
//! toolhead.set_position([0.0; 4], &[0, 1, 2])?;
//! toolhead.move_to([100.0, 50.0, 0.0, 0.0], 150.0)?;
//! toolhead.wait_moves()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and the simulated device
//! - `alloc`: Core library for no_std targets with an allocator
//! - `defmt`: Enables defmt formatting of plain types for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

extern crate alloc;

// Core modules
pub mod clock;
pub mod config;
pub mod error;
pub mod kinematics;
pub mod motion;
pub mod toolhead;
pub mod trapq;

// Simulated device and event loop (std only)
#[cfg(feature = "std")]
pub mod sim;

// Re-exports for ergonomic API
pub use clock::{Mcu, Reactor, TimeBase, NEVER, NOW};
pub use config::{validate_config, CartesianConfig, ExtruderConfig, PrinterConfig, ToolheadConfig};
pub use error::{Error, Result};
pub use kinematics::{Cartesian, ExtraAxis, Extruder, Kinematics, NullExtruder};
pub use motion::{LookaheadQueue, MotionLimits, MotionPhase, Position, Segment};
pub use toolhead::{DripCompletion, DripOutcome, DripSignal, EndstopTrigger, QueuingState, Toolhead, ToolheadStatus};
pub use trapq::{TrapQ, TrapQueue, Trapezoid};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
