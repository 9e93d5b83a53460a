//! Unit tests for single segments and simple junctions.

use toolhead_planner::kinematics::NullExtruder;
use toolhead_planner::motion::{LookaheadQueue, MotionLimits, MotionPhase, Segment, EXTRUDE_ONLY_ACCEL};

fn flush_all(segments: Vec<Segment>) -> Vec<Segment> {
    let extruder = NullExtruder;
    let mut queue = LookaheadQueue::new();
    let mut resolved = Vec::new();
    for seg in segments {
        resolved.extend(queue.add_move(seg, &extruder));
    }
    resolved.extend(queue.flush(false));
    resolved
}

/// Single 10mm move at 50mm/s with 500mm/s^2 reaches cruise and stops.
#[test]
fn test_single_move_from_rest() {
    let limits = MotionLimits::new(300.0, 500.0, 500.0, 5.0);
    let seg = Segment::new([0.0; 4], [10.0, 0.0, 0.0, 0.0], 50.0, &limits);
    let resolved = flush_all(vec![seg]);
    let seg = &resolved[0];

    assert_eq!(seg.start_v, 0.0);
    assert_eq!(seg.end_v, 0.0);
    assert!((seg.cruise_v - 50.0f64.min((10.0f64 * 500.0).sqrt())).abs() < 1e-9);
    assert!(seg.cruise_t > 0.0);
    assert!((seg.accel_t - 0.1).abs() < 1e-9);
    assert!((seg.decel_t - 0.1).abs() < 1e-9);
    assert!((seg.duration() - 0.3).abs() < 1e-9);

    assert_eq!(seg.phase_at(0.05), MotionPhase::Accelerating);
    assert_eq!(seg.phase_at(0.15), MotionPhase::Cruising);
    assert_eq!(seg.phase_at(0.25), MotionPhase::Decelerating);
    assert_eq!(seg.phase_at(0.35), MotionPhase::Complete);
    assert!((seg.distance_at(seg.duration()) - 10.0).abs() < 1e-9);
}

/// Two collinear moves at equal speed do not slow down at the joint.
#[test]
fn test_collinear_moves_keep_speed() {
    let limits = MotionLimits::new(300.0, 3000.0, 3000.0, 5.0);
    let first = Segment::new([0.0; 4], [20.0, 0.0, 0.0, 0.0], 50.0, &limits);
    let second = Segment::new([20.0, 0.0, 0.0, 0.0], [40.0, 0.0, 0.0, 0.0], 50.0, &limits);
    let resolved = flush_all(vec![first, second]);

    assert_eq!(resolved.len(), 2);
    assert!((resolved[0].end_v - 50.0).abs() < 1e-9);
    assert!((resolved[1].start_v - 50.0).abs() < 1e-9);
}

/// A square corner is taken at the square corner velocity.
#[test]
fn test_perpendicular_moves_slow_down() {
    let limits = MotionLimits::new(300.0, 3000.0, 3000.0, 5.0);
    let first = Segment::new([0.0; 4], [20.0, 0.0, 0.0, 0.0], 50.0, &limits);
    let second = Segment::new([20.0, 0.0, 0.0, 0.0], [20.0, 20.0, 0.0, 0.0], 50.0, &limits);
    let resolved = flush_all(vec![first, second]);

    let junction = resolved[0].end_v;
    assert!(junction < resolved[0].cruise_v);
    assert!(junction < resolved[1].cruise_v);
    assert!((junction - 5.0).abs() < 1e-6);
    assert!((resolved[1].start_v - junction).abs() < 1e-9);
}

/// A move without x/y/z displacement is an uncapped extrude-only move.
#[test]
fn test_extrude_only_move() {
    let limits = MotionLimits::new(300.0, 3000.0, 3000.0, 5.0);
    let seg = Segment::new([10.0, 10.0, 0.0, 0.0], [10.0, 10.0, 0.0, -5.0], 500.0, &limits);

    assert!(!seg.is_kinematic);
    assert_eq!(seg.move_d, 5.0);
    assert_eq!(seg.accel, EXTRUDE_ONLY_ACCEL);
    assert_eq!(seg.max_cruise_v2, 500.0 * 500.0);
    assert_eq!(seg.axes_r[3], -1.0);
    assert!(seg.is_extruding());
}

/// Reversing direction forces a full stop at the junction.
#[test]
fn test_reversal_stops() {
    let limits = MotionLimits::new(300.0, 3000.0, 3000.0, 5.0);
    let first = Segment::new([0.0; 4], [20.0, 0.0, 0.0, 0.0], 100.0, &limits);
    let second = Segment::new([20.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0], 100.0, &limits);
    let resolved = flush_all(vec![first, second]);

    assert_eq!(resolved[0].end_v, 0.0);
    assert_eq!(resolved[1].start_v, 0.0);
}
