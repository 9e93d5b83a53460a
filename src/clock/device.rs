//! Collaborator traits for the device and the host event loop.

use crate::error::DeviceError;

/// Wake-up time meaning "as soon as possible".
pub const NOW: f64 = 0.0;

/// Wake-up time meaning "never".
pub const NEVER: f64 = f64::INFINITY;

/// The remote device executing steps.
pub trait Mcu {
    /// Schedule time the device has reached at host time `eventtime`.
    fn estimated_print_time(&self, eventtime: f64) -> f64;

    /// Convert schedule time to device clock ticks.
    fn print_time_to_clock(&self, print_time: f64) -> i64;

    /// Transmit all generated steps up to `print_time`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejected the flush or reported a fault.
    fn flush_moves(&mut self, print_time: f64) -> Result<(), DeviceError>;

    /// Whether output goes to a file instead of a live device.
    ///
    /// A file sink cannot be waited on, so the scheduler never pauses.
    fn is_fileoutput(&self) -> bool {
        false
    }
}

/// The host event loop driving the scheduler.
pub trait Reactor {
    /// Current host time in seconds.
    fn monotonic(&self) -> f64;

    /// Yield to the event loop until `waketime`; returns the host time on wake.
    fn pause(&mut self, waketime: f64) -> f64;
}
