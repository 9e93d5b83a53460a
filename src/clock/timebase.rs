//! Conversion between schedule time and device clock ticks.

/// Linear estimate of the device clock relative to host time.
///
/// Produced by an external clock synchronizer; `clock_avg` ticks were
/// observed at host time `time_avg`, advancing at `freq` ticks per second.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockEstimate {
    /// Host time of the reference sample.
    pub time_avg: f64,
    /// Device clock at the reference sample.
    pub clock_avg: f64,
    /// Estimated device frequency in ticks per second.
    pub freq: f64,
}

/// Maps schedule time to device clock ticks and back.
///
/// Schedule time is device ticks divided by the nominal device frequency, so
/// the mapping itself never drifts; only the estimate of where the device
/// currently is (relative to host time) is updated.
#[derive(Debug, Clone)]
pub struct TimeBase {
    mcu_freq: f64,
    last_clock: u64,
    clock_est: ClockEstimate,
}

impl TimeBase {
    /// Time base for a device running at `mcu_freq` ticks per second,
    /// whose clock started at host time zero.
    pub fn new(mcu_freq: f64) -> Self {
        Self {
            mcu_freq,
            last_clock: 0,
            clock_est: ClockEstimate {
                time_avg: 0.0,
                clock_avg: 0.0,
                freq: mcu_freq,
            },
        }
    }

    /// Nominal device frequency.
    #[inline]
    pub fn mcu_freq(&self) -> f64 {
        self.mcu_freq
    }

    /// Current clock estimate.
    #[inline]
    pub fn estimate(&self) -> ClockEstimate {
        self.clock_est
    }

    /// Install a new clock estimate from the synchronizer.
    pub fn update_estimate(&mut self, estimate: ClockEstimate) {
        log::debug!(
            "clock estimate: time={:.6} clock={:.0} freq={:.3}",
            estimate.time_avg,
            estimate.clock_avg,
            estimate.freq
        );
        self.clock_est = estimate;
    }

    /// Schedule time to device ticks.
    #[inline]
    pub fn print_time_to_clock(&self, print_time: f64) -> i64 {
        (print_time * self.mcu_freq) as i64
    }

    /// Device ticks to schedule time.
    #[inline]
    pub fn clock_to_print_time(&self, clock: u64) -> f64 {
        clock as f64 / self.mcu_freq
    }

    /// Estimated device clock at host time `eventtime`.
    pub fn get_clock(&self, eventtime: f64) -> u64 {
        let est = &self.clock_est;
        let clock = est.clock_avg + (eventtime - est.time_avg) * est.freq;
        clock.max(0.0) as u64
    }

    /// Host time at which the device clock reaches `reqclock`.
    pub fn estimate_clock_systime(&self, reqclock: u64) -> f64 {
        let est = &self.clock_est;
        if est.freq == 0.0 {
            return est.time_avg;
        }
        (reqclock as f64 - est.clock_avg) / est.freq + est.time_avg
    }

    /// Schedule time the device has reached at host time `eventtime`.
    pub fn estimated_print_time(&self, eventtime: f64) -> f64 {
        self.clock_to_print_time(self.get_clock(eventtime))
    }

    /// Record the latest full clock value reported by the device.
    pub fn note_clock(&mut self, clock: u64) {
        self.last_clock = clock;
    }

    /// Extend a 32-bit clock reading to 64 bits using the last known clock.
    pub fn clock32_to_clock64(&self, clock32: u32) -> u64 {
        let diff = clock32.wrapping_sub(self.last_clock as u32) as i32 as i64;
        (self.last_clock as i64 + diff) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversions() {
        let tb = TimeBase::new(16_000_000.0);

        assert_eq!(tb.print_time_to_clock(1.5), 24_000_000);
        assert!((tb.clock_to_print_time(8_000_000) - 0.5).abs() < 1e-12);
        assert_eq!(tb.get_clock(2.0), 32_000_000);
        assert!((tb.estimated_print_time(2.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_offsets_device() {
        let mut tb = TimeBase::new(1_000_000.0);
        tb.update_estimate(ClockEstimate {
            time_avg: 10.0,
            clock_avg: 2_000_000.0,
            freq: 1_000_000.0,
        });

        // Device clock started 8s after host time zero.
        assert!((tb.estimated_print_time(10.0) - 2.0).abs() < 1e-9);
        assert!((tb.estimated_print_time(11.0) - 3.0).abs() < 1e-9);
        assert!((tb.estimate_clock_systime(3_000_000) - 11.0).abs() < 1e-9);
        assert_eq!(tb.get_clock(0.0), 0);
    }

    #[test]
    fn test_clock32_wraparound() {
        let mut tb = TimeBase::new(1_000_000.0);
        tb.note_clock(0x1_ffff_fff0);

        assert_eq!(tb.clock32_to_clock64(0xffff_fff8), 0x1_ffff_fff8);
        assert_eq!(tb.clock32_to_clock64(0x0000_0010), 0x2_0000_0010);
        assert_eq!(tb.clock32_to_clock64(0xffff_ff00), 0x1_ffff_ff00);
    }
}
