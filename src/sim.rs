//! Simulated collaborators for dry runs and tests.
//!
//! [`ManualReactor`] is an event loop whose clock only moves when told to
//! (or when the scheduler pauses), and [`SimMcu`] is a device that executes
//! at exactly its nominal frequency and records every flush.

use std::cell::Cell;
use std::rc::Rc;

use crate::clock::{ClockEstimate, Mcu, Reactor, TimeBase};
use crate::error::{truncated, DeviceError};

/// Host event loop with a manually driven clock.
///
/// Clones share the same clock, so a test can hand one to the scheduler
/// and keep another to move time forward.
#[derive(Debug, Clone, Default)]
pub struct ManualReactor {
    now: Rc<Cell<f64>>,
    pauses: Rc<Cell<u32>>,
}

impl ManualReactor {
    /// Reactor whose clock reads zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }

    /// Set the clock; it never moves backward.
    pub fn set_time(&self, eventtime: f64) {
        self.now.set(self.now.get().max(eventtime));
    }

    /// Number of pauses taken so far.
    pub fn pauses(&self) -> u32 {
        self.pauses.get()
    }
}

impl Reactor for ManualReactor {
    fn monotonic(&self) -> f64 {
        self.now.get()
    }

    fn pause(&mut self, waketime: f64) -> f64 {
        self.pauses.set(self.pauses.get() + 1);
        self.set_time(waketime);
        self.now.get()
    }
}

/// Device running exactly at its nominal frequency.
#[derive(Debug, Clone)]
pub struct SimMcu {
    timebase: TimeBase,
    fileoutput: bool,
    flushes: Vec<f64>,
    fault: Option<heapless::String<64>>,
}

impl SimMcu {
    /// Live device at `mcu_freq` ticks per second, started at host time zero.
    pub fn new(mcu_freq: f64) -> Self {
        Self {
            timebase: TimeBase::new(mcu_freq),
            fileoutput: false,
            flushes: Vec::new(),
            fault: None,
        }
    }

    /// Device writing to a file: the scheduler can never wait on it.
    pub fn fileoutput(mcu_freq: f64) -> Self {
        Self {
            fileoutput: true,
            ..Self::new(mcu_freq)
        }
    }

    /// Install a clock estimate, e.g. to model a device started later.
    pub fn set_estimate(&mut self, estimate: ClockEstimate) {
        self.timebase.update_estimate(estimate);
    }

    /// Time base of the device.
    pub fn timebase(&self) -> &TimeBase {
        &self.timebase
    }

    /// Every flush time received, in order.
    pub fn flushes(&self) -> &[f64] {
        &self.flushes
    }

    /// Most recent flush time.
    pub fn last_flush(&self) -> Option<f64> {
        self.flushes.last().copied()
    }

    /// Make every following flush fail with `message`.
    pub fn inject_fault(&mut self, message: &str) {
        self.fault = Some(truncated(message));
    }

    /// Recover from an injected fault.
    pub fn clear_fault(&mut self) {
        self.fault = None;
    }
}

impl Mcu for SimMcu {
    fn estimated_print_time(&self, eventtime: f64) -> f64 {
        self.timebase.estimated_print_time(eventtime)
    }

    fn print_time_to_clock(&self, print_time: f64) -> i64 {
        self.timebase.print_time_to_clock(print_time)
    }

    fn flush_moves(&mut self, print_time: f64) -> Result<(), DeviceError> {
        if let Some(message) = &self.fault {
            return Err(DeviceError::Fault(message.clone()));
        }
        // Steps already handed over cannot be taken back.
        if let Some(last) = self.last_flush() {
            if print_time < last - 1e-9 {
                return Err(DeviceError::TimerTooClose { print_time });
            }
        }
        log::trace!("flush_moves: {:.6} (clock {})", print_time, self.print_time_to_clock(print_time));
        self.flushes.push(print_time);
        Ok(())
    }

    fn is_fileoutput(&self) -> bool {
        self.fileoutput
    }
}
