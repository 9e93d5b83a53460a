//! Motion planning for toolhead-planner.
//!
//! Provides segment planning, motion limits and the look-ahead queue.

mod limits;
mod lookahead;
mod segment;

pub use limits::MotionLimits;
pub use lookahead::{LookaheadQueue, LOOKAHEAD_FLUSH_TIME};
pub use segment::{MotionPhase, Position, Segment, TimingCallback, EXTRUDE_ONLY_ACCEL};
