//! Time base bridging host time, schedule time and device clock ticks.
//!
//! The scheduler never talks to a device directly; it consumes the
//! [`Mcu`] and [`Reactor`] traits, which a host integration implements on
//! top of its clock synchronizer and event loop.

mod device;
mod timebase;

pub use device::{Mcu, Reactor, NEVER, NOW};
pub use timebase::{ClockEstimate, TimeBase};
