//! Kinematic collaborators of the scheduler.
//!
//! [`Kinematics`] validates toolhead moves against axis limits before they
//! are queued; [`ExtraAxis`] does the same for the extrude axis and owns
//! its step generation queue.

mod cartesian;
mod extruder;

pub use cartesian::Cartesian;
pub use extruder::{Extruder, NullExtruder};

use crate::error::Result;
use crate::motion::{Position, Segment};

/// Toolhead kinematics.
pub trait Kinematics {
    /// Validate a move and tighten its limits; rejects out-of-range moves.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`](crate::error::MoveError) if the move is not allowed.
    fn check_move(&self, seg: &mut Segment) -> Result<()>;

    /// Set the current position; axes listed in `homing_axes` become homed.
    fn set_position(&mut self, pos: Position, homing_axes: &[usize]);

    /// Letters of the homed axes (e.g. `"xyz"`).
    fn homed_axes(&self) -> heapless::String<3>;
}

/// An additional axis moving alongside the toolhead (the extruder).
pub trait ExtraAxis {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Validate the extrude part of a move and tighten its limits.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`](crate::error::MoveError) if the extrusion is not allowed.
    fn check_move(&self, seg: &mut Segment) -> Result<()>;

    /// Maximum junction velocity squared between `prev` and `seg`.
    fn calc_junction(&self, prev: &Segment, seg: &Segment) -> f64;

    /// Commit the extrude part of a resolved segment starting at `print_time`.
    fn process_move(&mut self, print_time: f64, seg: &Segment);

    /// Release queued motion that ended before `flush_time`.
    fn update_move_time(&mut self, flush_time: f64);

    /// Look-back required by this axis' step generation.
    fn scan_time(&self) -> f64 {
        0.0
    }

    /// Change pressure advance settings.
    fn set_pressure_advance(&mut self, _pressure_advance: f64, _smooth_time: f64) {}
}
