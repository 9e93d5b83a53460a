//! Toolhead scheduling.
//!
//! [`Toolhead`] owns the look-ahead queue and commits resolved segments to
//! the trapezoid queues on the device's schedule. It keeps the device
//! buffer between the configured watermarks, batches step generation and
//! runs interruptible drip moves for homing and probing.

mod drip;
mod scheduler;
mod state;
mod status;

pub use drip::{DripCompletion, DripOutcome, DripSignal, EndstopTrigger};
pub use scheduler::{
    ShutdownCallback, StepGenerator, Toolhead, DRIP_SEGMENT_TIME, DRIP_TIME, MAX_SCAN_WINDOWS,
    MIN_KIN_TIME, MOVE_BATCH_TIME, STALL_PAUSE_MAX, STALL_RECHECK_TIME, WAIT_MOVES_PAUSE,
};
pub use state::QueuingState;
pub use status::{PrintState, ToolheadStatus};
