//! Look-ahead queue resolving junction velocities across pending segments.

use alloc::vec::Vec;

use super::Segment;
use crate::kinematics::ExtraAxis;

/// Accumulated minimum move time that triggers a lazy flush.
pub const LOOKAHEAD_FLUSH_TIME: f64 = 0.25;

/// Queue of segments awaiting junction resolution.
///
/// Segments are kept in insertion order. A flush resolves a contiguous
/// prefix, removes it and hands it back to the caller; flushed segments are
/// never revisited.
#[derive(Debug)]
pub struct LookaheadQueue {
    queue: Vec<Segment>,
    junction_flush: f64,
}

impl Default for LookaheadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LookaheadQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            junction_flush: LOOKAHEAD_FLUSH_TIME,
        }
    }

    /// Drop all pending segments without resolving them.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.junction_flush = LOOKAHEAD_FLUSH_TIME;
    }

    /// Set the countdown until the next lazy flush.
    pub fn set_flush_time(&mut self, flush_time: f64) {
        self.junction_flush = flush_time;
    }

    /// Remaining countdown until the next lazy flush.
    #[inline]
    pub fn flush_time(&self) -> f64 {
        self.junction_flush
    }

    /// Number of pending segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check whether no segments are pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Most recently queued segment.
    pub fn get_last(&self) -> Option<&Segment> {
        self.queue.last()
    }

    /// Most recently queued segment, mutably.
    pub fn last_mut(&mut self) -> Option<&mut Segment> {
        self.queue.last_mut()
    }

    /// Queue a segment.
    ///
    /// Returns the segments finalized by a lazy flush, if the accumulated
    /// minimum move time reached the flush horizon.
    pub fn add_move(&mut self, mut segment: Segment, extruder: &dyn ExtraAxis) -> Vec<Segment> {
        if let Some(prev) = self.queue.last() {
            segment.calc_junction(prev, extruder);
            self.junction_flush -= segment.min_move_t;
            self.queue.push(segment);
            if self.junction_flush <= 0.0 {
                return self.flush(true);
            }
        } else {
            self.queue.push(segment);
        }
        Vec::new()
    }

    /// Resolve junction velocities and return the finalized prefix.
    ///
    /// The pass walks the queue backward assuming a full stop after the last
    /// segment. A lazy flush stops at the first unresolved velocity peak and
    /// may return nothing; a full flush always resolves every segment.
    pub fn flush(&mut self, lazy: bool) -> Vec<Segment> {
        self.junction_flush = LOOKAHEAD_FLUSH_TIME;

        let mut update_flush_count = lazy;
        let mut flush_count = self.queue.len();
        // (index, start_v2, next_end_v2) of segments still able to accelerate
        let mut delayed: Vec<(usize, f64, f64)> = Vec::new();
        let mut next_end_v2 = 0.0;
        let mut next_smoothed_v2 = 0.0;
        let mut peak_cruise_v2: f64 = 0.0;

        for i in (0..self.queue.len()).rev() {
            let seg = &self.queue[i];
            let reachable_start_v2 = next_end_v2 + seg.delta_v2;
            let start_v2 = seg.max_start_v2.min(reachable_start_v2);
            let reachable_smoothed_v2 = next_smoothed_v2 + seg.smooth_delta_v2;
            let smoothed_v2 = seg.max_smoothed_v2.min(reachable_smoothed_v2);

            if smoothed_v2 < reachable_smoothed_v2 {
                // It's possible for this segment to accelerate
                if smoothed_v2 + seg.smooth_delta_v2 > next_smoothed_v2 || !delayed.is_empty() {
                    // This segment can decelerate or is a full accel segment
                    if update_flush_count && peak_cruise_v2 != 0.0 {
                        flush_count = i;
                        update_flush_count = false;
                    }
                    peak_cruise_v2 = seg
                        .max_cruise_v2
                        .min((smoothed_v2 + reachable_smoothed_v2) * 0.5);

                    if !update_flush_count && i < flush_count {
                        let mut mc_v2 = peak_cruise_v2;
                        for &(idx, ms_v2, me_v2) in delayed.iter().rev() {
                            mc_v2 = mc_v2.min(ms_v2);
                            self.queue[idx].set_junction(ms_v2.min(mc_v2), mc_v2, me_v2.min(mc_v2));
                        }
                    }
                    delayed.clear();
                }

                if !update_flush_count && i < flush_count {
                    let seg = &mut self.queue[i];
                    let cruise_v2 = ((start_v2 + reachable_start_v2) * 0.5)
                        .min(seg.max_cruise_v2)
                        .min(peak_cruise_v2);
                    seg.set_junction(start_v2.min(cruise_v2), cruise_v2, next_end_v2.min(cruise_v2));
                }
            } else {
                // Delay calculating this segment until peak_cruise_v2 is known
                delayed.push((i, start_v2, next_end_v2));
            }

            next_end_v2 = start_v2;
            next_smoothed_v2 = smoothed_v2;
        }

        if update_flush_count || flush_count == 0 {
            return Vec::new();
        }

        log::trace!(
            "lookahead flush: {} of {} segments (lazy={})",
            flush_count,
            self.queue.len(),
            lazy
        );
        self.queue.drain(..flush_count).collect()
    }
}
