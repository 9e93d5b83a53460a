//! Early termination of drip moves.
//!
//! A drip move is sent to the device in short micro-batches. Before each
//! batch the scheduler asks a [`DripCompletion`] whether the move should
//! stop (an endstop or probe triggered); when it does, the rest of the move
//! is discarded and [`DripOutcome::Triggered`] is returned.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;

/// How a drip move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DripOutcome {
    /// The whole move was transmitted.
    Completed,
    /// The completion fired; unsent motion was discarded.
    Triggered,
}

impl DripOutcome {
    /// Check whether the move was cut short.
    #[inline]
    pub fn is_triggered(self) -> bool {
        self == DripOutcome::Triggered
    }
}

/// Condition ending a drip move early.
pub trait DripCompletion {
    /// Returns `true` once the move must stop.
    fn test(&mut self) -> bool;
}

impl<F: FnMut() -> bool> DripCompletion for F {
    fn test(&mut self) -> bool {
        self()
    }
}

/// Completion flag shared between the scheduler and whoever detects the trigger.
///
/// Clones refer to the same flag.
#[derive(Debug, Clone, Default)]
pub struct DripSignal {
    triggered: Arc<AtomicBool>,
}

impl DripSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the drip move stops.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
    }

    /// Check whether the signal fired.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Re-arm for the next move.
    pub fn reset(&self) {
        self.triggered.store(false, Ordering::Release);
    }
}

impl DripCompletion for DripSignal {
    fn test(&mut self) -> bool {
        self.is_triggered()
    }
}

/// Completion driven by an endstop input pin.
///
/// Once the pin reads its active level the trigger latches until
/// [`EndstopTrigger::rearm`]. A pin read error counts as triggered.
#[derive(Debug)]
pub struct EndstopTrigger<P: InputPin> {
    pin: P,
    active_high: bool,
    triggered: bool,
}

impl<P: InputPin> EndstopTrigger<P> {
    /// Watch `pin`; `active_high` selects the level that means "hit".
    pub fn new(pin: P, active_high: bool) -> Self {
        Self {
            pin,
            active_high,
            triggered: false,
        }
    }

    /// Check whether the endstop has latched.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Clear the latch.
    pub fn rearm(&mut self) {
        self.triggered = false;
    }

    /// Release the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> DripCompletion for EndstopTrigger<P> {
    fn test(&mut self) -> bool {
        if self.triggered {
            return true;
        }
        let hit = if self.active_high {
            self.pin.is_high()
        } else {
            self.pin.is_low()
        };
        self.triggered = match hit {
            Ok(level) => level,
            Err(_) => {
                log::warn!("endstop read failed; stopping drip move");
                true
            }
        };
        self.triggered
    }
}
