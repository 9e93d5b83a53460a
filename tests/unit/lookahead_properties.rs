//! Property tests for look-ahead junction resolution.

use proptest::prelude::*;
use toolhead_planner::kinematics::NullExtruder;
use toolhead_planner::motion::{LookaheadQueue, MotionLimits, Segment};

const EPSILON: f64 = 1e-6;

fn limits(accel_to_decel: f64) -> MotionLimits {
    MotionLimits::new(300.0, 3000.0, accel_to_decel, 5.0)
}

/// Result of planning one path.
struct Plan {
    /// Every segment, in order, once resolved.
    segments: Vec<Segment>,
    /// Number of segments resolved by lazy flushes.
    lazily_resolved: usize,
    /// Queue length left behind by each lazy flush.
    tails: Vec<usize>,
    /// Number of segments queued.
    queued: usize,
}

/// Queue a path through `points`, then drain the queue.
///
/// With `lazy` unset the flush horizon is never reached, so every segment
/// is resolved by the final full flush.
fn plan_with(points: &[(f64, f64, f64)], limits: &MotionLimits, lazy: bool) -> Plan {
    let extruder = NullExtruder;
    let mut queue = LookaheadQueue::new();
    if !lazy {
        queue.set_flush_time(f64::INFINITY);
    }
    let mut plan = Plan {
        segments: Vec::new(),
        lazily_resolved: 0,
        tails: Vec::new(),
        queued: 0,
    };
    let mut pos = [0.0; 4];

    for &(x, y, speed) in points {
        let end = [x, y, 0.0, 0.0];
        let seg = Segment::new(pos, end, speed, limits);
        if seg.move_d < 0.01 {
            continue;
        }
        pos = end;
        plan.queued += 1;
        let flushed = queue.add_move(seg, &extruder);
        if !flushed.is_empty() {
            plan.lazily_resolved += flushed.len();
            plan.tails.push(queue.len());
        }
        plan.segments.extend(flushed);
    }
    plan.segments.extend(queue.flush(false));
    assert!(queue.is_empty());
    plan
}

fn plan(points: &[(f64, f64, f64)], limits: &MotionLimits) -> (Vec<Segment>, usize) {
    let plan = plan_with(points, limits, true);
    (plan.segments, plan.queued)
}

fn path() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((0.0..200.0f64, 0.0..200.0f64, 5.0..400.0f64), 1..40)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn prop_velocity_is_continuous(points in path(), atd in 500.0..3000.0f64) {
        let (segments, queued) = plan(&points, &limits(atd));
        prop_assert_eq!(segments.len(), queued);

        if let Some(first) = segments.first() {
            prop_assert!(first.start_v.abs() < EPSILON);
        }
        for pair in segments.windows(2) {
            prop_assert!(close(pair[0].end_v, pair[1].start_v),
                "end_v {} != start_v {}", pair[0].end_v, pair[1].start_v);
            prop_assert_eq!(pair[0].end_pos, pair[1].start_pos);
        }
        if let Some(last) = segments.last() {
            prop_assert!(last.end_v.abs() < EPSILON);
        }
    }

    #[test]
    fn prop_profile_reproduces_distance(points in path(), atd in 500.0..3000.0f64) {
        let (segments, _) = plan(&points, &limits(atd));

        for seg in &segments {
            prop_assert!(seg.accel_t >= -EPSILON);
            prop_assert!(seg.cruise_t >= -EPSILON);
            prop_assert!(seg.decel_t >= -EPSILON);

            let distance = seg.accel_t * (seg.start_v + seg.cruise_v) * 0.5
                + seg.cruise_t * seg.cruise_v
                + seg.decel_t * (seg.cruise_v + seg.end_v) * 0.5;
            prop_assert!(close(distance, seg.move_d),
                "profile covers {} of {}", distance, seg.move_d);
        }
    }

    #[test]
    fn prop_cruise_within_limits(points in path()) {
        let limits = limits(1500.0);
        let (segments, _) = plan(&points, &limits);

        for seg in &segments {
            prop_assert!(seg.cruise_v * seg.cruise_v <= seg.max_cruise_v2 * (1.0 + EPSILON) + EPSILON);
            prop_assert!(seg.cruise_v <= limits.max_velocity + EPSILON);
            prop_assert!(seg.start_v <= seg.cruise_v + EPSILON);
            prop_assert!(seg.end_v <= seg.cruise_v + EPSILON);
        }
    }

    #[test]
    fn prop_lazy_flush_is_final(points in path(), atd in 500.0..3000.0f64) {
        let limits = limits(atd);
        let lazy = plan_with(&points, &limits, true);
        let full = plan_with(&points, &limits, false);
        prop_assert_eq!(lazy.segments.len(), lazy.queued);
        prop_assert_eq!(full.lazily_resolved, 0);

        // A lazy flush keeps at least the velocity peak and its successor.
        for &tail in &lazy.tails {
            prop_assert!(tail >= 2, "lazy flush left {} segments", tail);
        }

        // Later moves never change what a lazy flush resolved.
        for (early, late) in lazy.segments.iter().zip(&full.segments).take(lazy.lazily_resolved) {
            prop_assert!(close(early.start_v, late.start_v),
                "start_v {} != {}", early.start_v, late.start_v);
            prop_assert!(close(early.cruise_v, late.cruise_v),
                "cruise_v {} != {}", early.cruise_v, late.cruise_v);
            prop_assert!(close(early.end_v, late.end_v),
                "end_v {} != {}", early.end_v, late.end_v);
        }
    }
}

#[test]
fn test_reset_then_flush_is_empty() {
    let extruder = NullExtruder;
    let limits = limits(3000.0);
    let mut queue = LookaheadQueue::new();
    queue.add_move(Segment::new([0.0; 4], [10.0, 0.0, 0.0, 0.0], 100.0, &limits), &extruder);
    queue.add_move(Segment::new([10.0, 0.0, 0.0, 0.0], [10.0, 10.0, 0.0, 0.0], 100.0, &limits), &extruder);

    queue.reset();
    assert!(queue.flush(false).is_empty());
    assert!(queue.flush(true).is_empty());
}
