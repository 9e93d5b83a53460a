//! Planned linear moves with trapezoidal velocity profiles.
//!
//! A [`Segment`] is created for every requested displacement. Its
//! kinematic bounds are computed up front; the junction velocities are the
//! only deferred fields and are filled in by the look-ahead queue through
//! [`Segment::set_junction`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use libm::sqrt;

use super::MotionLimits;
use crate::kinematics::ExtraAxis;

/// Toolhead coordinates: x, y, z and the extrude axis.
pub type Position = [f64; 4];

/// Acceleration assigned to extrude-only moves (effectively uncapped).
pub const EXTRUDE_ONLY_ACCEL: f64 = 99_999_999.9;

/// Moves shorter than this on x/y/z are treated as extrude-only.
const MIN_KINEMATIC_DISTANCE: f64 = 0.000_000_001;

/// Cosine beyond which a junction is treated as a full reversal.
const JUNCTION_COS_LIMIT: f64 = 0.999_999;

/// Phase of a segment at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Accelerating from the start velocity toward cruise velocity.
    Accelerating,
    /// Moving at constant cruise velocity.
    Cruising,
    /// Decelerating from cruise velocity to the end velocity.
    Decelerating,
    /// Motion complete.
    Complete,
}

/// Callback run with the print time at which a segment completes.
pub type TimingCallback = Box<dyn FnOnce(f64)>;

/// One planned linear displacement.
pub struct Segment {
    /// Start position.
    pub start_pos: Position,
    /// End position.
    pub end_pos: Position,
    /// Per-axis displacement.
    pub axes_d: Position,
    /// Per-axis unit direction ratios (displacement / `move_d`).
    pub axes_r: Position,
    /// Distance travelled (x/y/z, or the extrude axis for extrude-only moves).
    pub move_d: f64,
    /// `false` for extrude-only moves.
    pub is_kinematic: bool,
    /// Acceleration limit in mm/s^2.
    pub accel: f64,
    /// Cornering constant the segment was planned with.
    pub junction_deviation: f64,
    /// Shortest possible duration (`move_d` at cruise velocity).
    pub min_move_t: f64,
    /// Highest allowed entry velocity squared.
    pub max_start_v2: f64,
    /// Highest allowed cruise velocity squared.
    pub max_cruise_v2: f64,
    /// Velocity squared change achievable over the segment.
    pub delta_v2: f64,
    /// Highest entry velocity squared of the smoothed envelope.
    pub max_smoothed_v2: f64,
    /// Velocity squared change of the smoothed envelope.
    pub smooth_delta_v2: f64,
    /// Resolved entry velocity.
    pub start_v: f64,
    /// Resolved cruise velocity.
    pub cruise_v: f64,
    /// Resolved exit velocity.
    pub end_v: f64,
    /// Time spent accelerating.
    pub accel_t: f64,
    /// Time spent cruising.
    pub cruise_t: f64,
    /// Time spent decelerating.
    pub decel_t: f64,
    timing_callbacks: Vec<TimingCallback>,
}

impl Segment {
    /// Plan a move from `start` to `end` at the requested `speed`.
    ///
    /// Moves without x/y/z displacement become extrude-only: their distance
    /// is the extrude displacement, their acceleration is uncapped and their
    /// velocity is the requested speed, unclamped by `max_velocity`.
    pub fn new(start: Position, end: Position, speed: f64, limits: &MotionLimits) -> Self {
        let mut end_pos = end;
        let mut velocity = speed.min(limits.max_velocity);
        let mut accel = limits.max_accel;
        let mut is_kinematic = true;

        let mut axes_d = [0.0; 4];
        for (d, (e, s)) in axes_d.iter_mut().zip(end.iter().zip(start.iter())) {
            *d = e - s;
        }
        let mut move_d = sqrt(axes_d[0] * axes_d[0] + axes_d[1] * axes_d[1] + axes_d[2] * axes_d[2]);

        if move_d < MIN_KINEMATIC_DISTANCE {
            end_pos = [start[0], start[1], start[2], end[3]];
            axes_d[0] = 0.0;
            axes_d[1] = 0.0;
            axes_d[2] = 0.0;
            move_d = axes_d[3].abs();
            accel = EXTRUDE_ONLY_ACCEL;
            velocity = speed;
            is_kinematic = false;
        }

        let mut axes_r = [0.0; 4];
        if move_d > 0.0 {
            let inv_move_d = 1.0 / move_d;
            for (r, d) in axes_r.iter_mut().zip(axes_d.iter()) {
                *r = d * inv_move_d;
            }
        }

        Self {
            start_pos: start,
            end_pos,
            axes_d,
            axes_r,
            move_d,
            is_kinematic,
            accel,
            junction_deviation: limits.junction_deviation,
            min_move_t: move_d / velocity,
            max_start_v2: 0.0,
            max_cruise_v2: velocity * velocity,
            delta_v2: 2.0 * move_d * accel,
            max_smoothed_v2: 0.0,
            smooth_delta_v2: 2.0 * move_d * limits.max_accel_to_decel,
            start_v: 0.0,
            cruise_v: 0.0,
            end_v: 0.0,
            accel_t: 0.0,
            cruise_t: 0.0,
            decel_t: 0.0,
            timing_callbacks: Vec::new(),
        }
    }

    /// Tighten the cruise velocity and acceleration of this segment.
    ///
    /// Limits only ever decrease.
    pub fn limit_speed(&mut self, speed: f64, accel: f64) {
        let speed2 = speed * speed;
        if speed2 < self.max_cruise_v2 {
            self.max_cruise_v2 = speed2;
            self.min_move_t = self.move_d / speed;
        }
        self.accel = self.accel.min(accel);
        self.delta_v2 = 2.0 * self.move_d * self.accel;
        self.smooth_delta_v2 = self.smooth_delta_v2.min(self.delta_v2);
    }

    /// Bound the entry velocity of this segment by the junction with `prev`.
    pub fn calc_junction(&mut self, prev: &Segment, extruder: &dyn ExtraAxis) {
        if !self.is_kinematic || !prev.is_kinematic {
            return;
        }

        let extruder_v2 = extruder.calc_junction(prev, self);

        let junction_cos_theta = -(self.axes_r[0] * prev.axes_r[0]
            + self.axes_r[1] * prev.axes_r[1]
            + self.axes_r[2] * prev.axes_r[2]);
        if junction_cos_theta > JUNCTION_COS_LIMIT {
            // Reversal: come to a full stop.
            return;
        }
        let junction_cos_theta = junction_cos_theta.max(-JUNCTION_COS_LIMIT);

        let sin_theta_d2 = sqrt(0.5 * (1.0 - junction_cos_theta));
        let r_jd = sin_theta_d2 / (1.0 - sin_theta_d2);
        let tan_theta_d2 = sin_theta_d2 / sqrt(0.5 * (1.0 + junction_cos_theta));
        let move_centripetal_v2 = 0.5 * self.move_d * tan_theta_d2 * self.accel;
        let prev_move_centripetal_v2 = 0.5 * prev.move_d * tan_theta_d2 * prev.accel;

        self.max_start_v2 = (r_jd * self.junction_deviation * self.accel)
            .min(r_jd * prev.junction_deviation * prev.accel)
            .min(move_centripetal_v2)
            .min(prev_move_centripetal_v2)
            .min(extruder_v2)
            .min(self.max_cruise_v2)
            .min(prev.max_cruise_v2)
            .min(prev.max_start_v2 + prev.delta_v2);
        self.max_smoothed_v2 = self
            .max_start_v2
            .min(prev.max_smoothed_v2 + prev.smooth_delta_v2);
    }

    /// Resolve the trapezoid from velocity squared endpoints.
    pub fn set_junction(&mut self, start_v2: f64, cruise_v2: f64, end_v2: f64) {
        let half_inv_accel = 0.5 / self.accel;
        let accel_d = (cruise_v2 - start_v2) * half_inv_accel;
        let decel_d = (cruise_v2 - end_v2) * half_inv_accel;
        let cruise_d = self.move_d - accel_d - decel_d;

        self.start_v = sqrt(start_v2);
        self.cruise_v = sqrt(cruise_v2);
        self.end_v = sqrt(end_v2);

        self.accel_t = span(accel_d, (self.start_v + self.cruise_v) * 0.5);
        self.cruise_t = span(cruise_d, self.cruise_v);
        self.decel_t = span(decel_d, (self.end_v + self.cruise_v) * 0.5);
    }

    /// Total duration of the resolved trapezoid.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.accel_t + self.cruise_t + self.decel_t
    }

    /// Check whether the segment moves the extrude axis.
    #[inline]
    pub fn is_extruding(&self) -> bool {
        self.axes_d[3] != 0.0
    }

    /// Phase at `t` seconds into the segment.
    pub fn phase_at(&self, t: f64) -> MotionPhase {
        if t >= self.duration() {
            MotionPhase::Complete
        } else if t < self.accel_t {
            MotionPhase::Accelerating
        } else if t < self.accel_t + self.cruise_t {
            MotionPhase::Cruising
        } else {
            MotionPhase::Decelerating
        }
    }

    /// Velocity at `t` seconds into the segment.
    pub fn velocity_at(&self, t: f64) -> f64 {
        match self.phase_at(t.max(0.0)) {
            MotionPhase::Accelerating => self.start_v + self.accel * t.max(0.0),
            MotionPhase::Cruising => self.cruise_v,
            MotionPhase::Decelerating => {
                let dt = t - self.accel_t - self.cruise_t;
                self.cruise_v - self.accel * dt
            }
            MotionPhase::Complete => self.end_v,
        }
    }

    /// Distance covered `t` seconds into the segment.
    pub fn distance_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, self.duration());
        let half_accel = 0.5 * self.accel;

        let at = t.min(self.accel_t);
        let mut distance = (self.start_v + half_accel * at) * at;

        let ct = (t - self.accel_t).clamp(0.0, self.cruise_t);
        distance += self.cruise_v * ct;

        let dt = (t - self.accel_t - self.cruise_t).clamp(0.0, self.decel_t);
        distance += (self.cruise_v - half_accel * dt) * dt;

        distance
    }

    /// Run `callback` with the print time at which this segment completes.
    pub fn register_timing_callback(&mut self, callback: TimingCallback) {
        self.timing_callbacks.push(callback);
    }

    /// Take the registered timing callbacks.
    pub(crate) fn take_timing_callbacks(&mut self) -> Vec<TimingCallback> {
        core::mem::take(&mut self.timing_callbacks)
    }
}

#[inline]
fn span(distance: f64, velocity: f64) -> f64 {
    if velocity > 0.0 {
        distance / velocity
    } else {
        0.0
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("start_pos", &self.start_pos)
            .field("end_pos", &self.end_pos)
            .field("move_d", &self.move_d)
            .field("is_kinematic", &self.is_kinematic)
            .field("accel", &self.accel)
            .field("max_start_v2", &self.max_start_v2)
            .field("max_cruise_v2", &self.max_cruise_v2)
            .field("start_v", &self.start_v)
            .field("cruise_v", &self.cruise_v)
            .field("end_v", &self.end_v)
            .field("accel_t", &self.accel_t)
            .field("cruise_t", &self.cruise_t)
            .field("decel_t", &self.decel_t)
            .field("timing_callbacks", &self.timing_callbacks.len())
            .finish()
    }
}
