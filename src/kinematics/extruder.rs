//! Extrude axis: extrusion limits, junction limits and step queue.

use super::ExtraAxis;
use crate::config::{ExtruderConfig, ToolheadConfig};
use crate::error::{truncated, MoveError, Result};
use crate::motion::Segment;
use crate::trapq::{TrapQueue, Trapezoid};

/// Placeholder axis used when no extruder is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExtruder;

impl ExtraAxis for NullExtruder {
    fn name(&self) -> &str {
        "none"
    }

    fn check_move(&self, _seg: &mut Segment) -> Result<()> {
        Err(MoveError::NoExtruder.into())
    }

    fn calc_junction(&self, _prev: &Segment, seg: &Segment) -> f64 {
        seg.max_cruise_v2
    }

    fn process_move(&mut self, _print_time: f64, _seg: &Segment) {}

    fn update_move_time(&mut self, _flush_time: f64) {}
}

/// Filament extruder feeding its own trapezoid queue.
#[derive(Debug)]
pub struct Extruder<Q: TrapQueue> {
    name: heapless::String<16>,
    trapq: Q,
    nozzle_diameter: f64,
    filament_area: f64,
    max_extrude_ratio: f64,
    max_e_velocity: f64,
    max_e_accel: f64,
    max_e_dist: f64,
    instant_corner_v: f64,
    pressure_advance: f64,
    pressure_advance_smooth_time: f64,
}

impl<Q: TrapQueue> Extruder<Q> {
    /// Create an extruder; extrude-only limits default to the toolhead
    /// limits scaled by the maximum extrude ratio.
    pub fn new(name: &str, config: &ExtruderConfig, toolhead: &ToolheadConfig, trapq: Q) -> Self {
        let max_extrude_ratio = config.max_extrude_ratio();
        Self {
            name: truncated(name),
            trapq,
            nozzle_diameter: config.nozzle_diameter,
            filament_area: config.filament_area(),
            max_extrude_ratio,
            max_e_velocity: config
                .max_extrude_only_velocity
                .unwrap_or(toolhead.max_velocity * max_extrude_ratio),
            max_e_accel: config
                .max_extrude_only_accel
                .unwrap_or(toolhead.max_accel * max_extrude_ratio),
            max_e_dist: config.max_extrude_only_distance,
            instant_corner_v: config.instantaneous_corner_velocity,
            pressure_advance: config.pressure_advance,
            pressure_advance_smooth_time: config.pressure_advance_smooth_time,
        }
    }

    /// Step queue of the extrude axis.
    pub fn trapq(&self) -> &Q {
        &self.trapq
    }

    /// Current pressure advance coefficient.
    pub fn pressure_advance(&self) -> f64 {
        self.pressure_advance
    }
}

impl<Q: TrapQueue> ExtraAxis for Extruder<Q> {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn check_move(&self, seg: &mut Segment) -> Result<()> {
        let axis_r = seg.axes_r[3];

        if (seg.axes_d[0] == 0.0 && seg.axes_d[1] == 0.0) || axis_r < 0.0 {
            // Extrude only move (or retraction move) - limit accel and velocity
            let distance = seg.axes_d[3].abs();
            if distance > self.max_e_dist {
                return Err(MoveError::ExtrudeOnlyTooLong {
                    distance,
                    max: self.max_e_dist,
                }
                .into());
            }
            let inv_extrude_r = 1.0 / axis_r.abs();
            seg.limit_speed(self.max_e_velocity * inv_extrude_r, self.max_e_accel * inv_extrude_r);
        } else if axis_r > self.max_extrude_ratio {
            if seg.axes_d[3] <= self.nozzle_diameter * self.max_extrude_ratio {
                // Permit extrusion if amount extruded is tiny
                return Ok(());
            }
            let area = axis_r * self.filament_area;
            log::debug!(
                "{}: overextrude ratio={:.3} max={:.3} area={:.3} move_d={:.3}",
                self.name,
                axis_r,
                self.max_extrude_ratio,
                area,
                seg.move_d
            );
            return Err(MoveError::ExtrudeCrossSection {
                area,
                max: self.max_extrude_ratio * self.filament_area,
            }
            .into());
        }
        Ok(())
    }

    fn calc_junction(&self, prev: &Segment, seg: &Segment) -> f64 {
        let diff_r = seg.axes_r[3] - prev.axes_r[3];
        if diff_r != 0.0 {
            let v = self.instant_corner_v / diff_r.abs();
            return v * v;
        }
        seg.max_cruise_v2
    }

    fn process_move(&mut self, print_time: f64, seg: &Segment) {
        let axis_r = seg.axes_r[3];
        let can_pressure_advance =
            axis_r > 0.0 && (seg.axes_d[0] != 0.0 || seg.axes_d[1] != 0.0);
        let pressure_advance = if can_pressure_advance { self.pressure_advance } else { 0.0 };

        self.trapq.append(
            print_time,
            &Trapezoid::from_segment(seg).scaled(axis_r),
            [seg.start_pos[3], 0.0, 0.0],
            [1.0, pressure_advance, 0.0],
        );
    }

    fn update_move_time(&mut self, flush_time: f64) {
        self.trapq.finalize_moves(flush_time);
    }

    fn scan_time(&self) -> f64 {
        if self.pressure_advance > 0.0 {
            self.pressure_advance_smooth_time * 0.5
        } else {
            0.0
        }
    }

    fn set_pressure_advance(&mut self, pressure_advance: f64, smooth_time: f64) {
        log::info!(
            "{}: pressure_advance={:.6} smooth_time={:.6}",
            self.name,
            pressure_advance,
            smooth_time
        );
        self.pressure_advance = pressure_advance;
        self.pressure_advance_smooth_time = smooth_time;
    }
}
