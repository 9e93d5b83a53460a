//! Queuing state of the scheduler.

use serde::Serialize;

/// How newly flushed segments are scheduled against the device.
///
/// Every state but [`QueuingState::Main`] is "special": the next committed
/// segment resynchronizes schedule time against the device's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueuingState {
    /// Steady-state printing; schedule time runs ahead of the device.
    Main,
    /// Nothing pending; the device buffer was intentionally drained.
    Flushed,
    /// A stall was detected while leaving `Flushed`; batching resumes soon.
    Priming,
    /// Single interruptible segment (homing and probing).
    Drip,
}

impl QueuingState {
    /// Check whether schedule time must be resynchronized on the next move.
    #[inline]
    pub fn is_special(self) -> bool {
        self != QueuingState::Main
    }

    /// State name for logs and status reports.
    pub fn name(self) -> &'static str {
        match self {
            QueuingState::Main => "Main",
            QueuingState::Flushed => "Flushed",
            QueuingState::Priming => "Priming",
            QueuingState::Drip => "Drip",
        }
    }
}

impl Default for QueuingState {
    fn default() -> Self {
        QueuingState::Flushed
    }
}
