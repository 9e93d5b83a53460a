//! Status snapshot reported to the command layer.

use serde::Serialize;

use super::QueuingState;
use crate::motion::Position;

/// Whether the toolhead is busy from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrintState {
    /// Moves are queued or executing (or finished less than a second ago).
    Printing,
    /// Idle.
    Ready,
}

/// Snapshot of the scheduler at a host time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolheadStatus {
    /// Busy or idle.
    pub status: PrintState,
    /// Schedule time committed so far.
    pub print_time: f64,
    /// Schedule time the device has reached.
    pub estimated_print_time: f64,
    /// Committed work not yet executed by the device (may be negative).
    pub buffer_time: f64,
    /// Schedule time elapsed since the last resynchronization.
    pub printing_time: f64,
    /// Commanded position.
    pub position: Position,
    /// Name of the active extrude axis.
    pub extruder: heapless::String<16>,
    /// Active velocity limit.
    pub max_velocity: f64,
    /// Active acceleration limit.
    pub max_accel: f64,
    /// Active acceleration budget of the smoothed envelope.
    pub max_accel_to_decel: f64,
    /// Active square corner velocity.
    pub square_corner_velocity: f64,
    /// Letters of the homed axes.
    pub homed_axes: heapless::String<3>,
    /// Queuing state.
    pub state: QueuingState,
    /// Number of stalls detected after an idle flush.
    pub print_stall: u32,
}
