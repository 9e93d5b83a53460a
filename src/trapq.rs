//! Trapezoid queue consumed by step generation.
//!
//! The scheduler appends every committed segment as up to three constant
//! acceleration pieces and frees pieces once step generation no longer
//! needs them. [`TrapQueue`] is the seam to a host's step compression
//! backend; [`TrapQ`] is the in-memory implementation.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::motion::Segment;

/// Velocity profile of one segment (or its extrude-axis projection).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    /// Time spent accelerating.
    pub accel_t: f64,
    /// Time spent cruising.
    pub cruise_t: f64,
    /// Time spent decelerating.
    pub decel_t: f64,
    /// Entry velocity.
    pub start_v: f64,
    /// Cruise velocity.
    pub cruise_v: f64,
    /// Acceleration magnitude.
    pub accel: f64,
}

impl Trapezoid {
    /// Profile of a resolved segment along its direction of travel.
    pub fn from_segment(seg: &Segment) -> Self {
        Self {
            accel_t: seg.accel_t,
            cruise_t: seg.cruise_t,
            decel_t: seg.decel_t,
            start_v: seg.start_v,
            cruise_v: seg.cruise_v,
            accel: seg.accel,
        }
    }

    /// Same timing with velocities and acceleration scaled by `ratio`.
    pub fn scaled(self, ratio: f64) -> Self {
        Self {
            start_v: self.start_v * ratio,
            cruise_v: self.cruise_v * ratio,
            accel: self.accel * ratio,
            ..self
        }
    }

    /// Total duration.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.accel_t + self.cruise_t + self.decel_t
    }
}

/// One constant-acceleration piece of a trapezoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapMove {
    /// Schedule time at which the piece starts.
    pub print_time: f64,
    /// Duration of the piece.
    pub move_t: f64,
    /// Velocity at the start of the piece.
    pub start_v: f64,
    /// Half of the (signed) acceleration.
    pub half_accel: f64,
    /// Coordinates at the start of the piece.
    pub start_pos: [f64; 3],
    /// Direction ratios.
    pub axes_r: [f64; 3],
}

impl TrapMove {
    /// Schedule time at which the piece ends.
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.print_time + self.move_t
    }

    /// Distance covered `move_time` seconds into the piece.
    #[inline]
    pub fn distance_at(&self, move_time: f64) -> f64 {
        (self.start_v + self.half_accel * move_time) * move_time
    }

    /// Coordinates `move_time` seconds into the piece.
    pub fn coord_at(&self, move_time: f64) -> [f64; 3] {
        let d = self.distance_at(move_time);
        [
            self.start_pos[0] + self.axes_r[0] * d,
            self.start_pos[1] + self.axes_r[1] * d,
            self.start_pos[2] + self.axes_r[2] * d,
        ]
    }
}

/// Queue of trapezoid pieces read by step generators.
pub trait TrapQueue {
    /// Append a trapezoid starting at `print_time`.
    fn append(&mut self, print_time: f64, trapezoid: &Trapezoid, start_pos: [f64; 3], axes_r: [f64; 3]);

    /// Free every piece that ends at or before `print_time`.
    fn finalize_moves(&mut self, print_time: f64);
}

/// In-memory trapezoid queue.
#[derive(Debug, Default, Clone)]
pub struct TrapQ {
    moves: VecDeque<TrapMove>,
}

impl TrapQ {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pieces held.
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Check whether the queue holds no pieces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Pieces held, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = &TrapMove> {
        self.moves.iter()
    }

    /// End time of the newest piece.
    pub fn last_end_time(&self) -> Option<f64> {
        self.moves.back().map(TrapMove::end_time)
    }

    /// Coordinates at schedule time `print_time`, if a held piece covers it.
    pub fn position_at(&self, print_time: f64) -> Option<[f64; 3]> {
        self.moves
            .iter()
            .find(|m| print_time >= m.print_time && print_time <= m.end_time())
            .map(|m| m.coord_at(print_time - m.print_time))
    }

    fn push(&mut self, print_time: f64, move_t: f64, start_v: f64, accel: f64, start_pos: [f64; 3], axes_r: [f64; 3]) -> [f64; 3] {
        let piece = TrapMove {
            print_time,
            move_t,
            start_v,
            half_accel: 0.5 * accel,
            start_pos,
            axes_r,
        };
        let end = piece.coord_at(move_t);
        self.moves.push_back(piece);
        end
    }
}

impl TrapQueue for TrapQ {
    fn append(&mut self, print_time: f64, trapezoid: &Trapezoid, start_pos: [f64; 3], axes_r: [f64; 3]) {
        let mut print_time = print_time;
        let mut pos = start_pos;

        if trapezoid.accel_t > 0.0 {
            pos = self.push(print_time, trapezoid.accel_t, trapezoid.start_v, trapezoid.accel, pos, axes_r);
            print_time += trapezoid.accel_t;
        }
        if trapezoid.cruise_t > 0.0 {
            pos = self.push(print_time, trapezoid.cruise_t, trapezoid.cruise_v, 0.0, pos, axes_r);
            print_time += trapezoid.cruise_t;
        }
        if trapezoid.decel_t > 0.0 {
            self.push(print_time, trapezoid.decel_t, trapezoid.cruise_v, -trapezoid.accel, pos, axes_r);
        }
    }

    fn finalize_moves(&mut self, print_time: f64) {
        while let Some(front) = self.moves.front() {
            if front.end_time() > print_time {
                break;
            }
            self.moves.pop_front();
        }
    }
}

/// Shared queue, for collaborators that must be inspected while owned elsewhere.
impl<T: TrapQueue> TrapQueue for Rc<RefCell<T>> {
    fn append(&mut self, print_time: f64, trapezoid: &Trapezoid, start_pos: [f64; 3], axes_r: [f64; 3]) {
        self.borrow_mut().append(print_time, trapezoid, start_pos, axes_r);
    }

    fn finalize_moves(&mut self, print_time: f64) {
        self.borrow_mut().finalize_moves(print_time);
    }
}
