//! The toolhead scheduler.
//!
//! Turns requested moves into trapezoid pieces timed on the device's
//! schedule, keeps the device buffer between its watermarks and drives step
//! generation and device flushing.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use super::drip::{DripCompletion, DripOutcome};
use super::status::{PrintState, ToolheadStatus};
use super::QueuingState;
use crate::clock::{Mcu, Reactor, NEVER, NOW};
use crate::config::ToolheadConfig;
use crate::error::{truncated, ConfigError, Error, MoveError, Result};
use crate::kinematics::{ExtraAxis, Kinematics, NullExtruder};
use crate::motion::{LookaheadQueue, MotionLimits, Position, Segment, TimingCallback};
use crate::trapq::{TrapQueue, Trapezoid};

/// Minimum lead of schedule time over the device when resynchronizing.
pub const MIN_KIN_TIME: f64 = 0.100;
/// Longest stretch of schedule time handed to step generation at once.
pub const MOVE_BATCH_TIME: f64 = 0.500;
/// Micro-batch length of drip moves.
pub const DRIP_SEGMENT_TIME: f64 = 0.050;
/// Device lead kept during drip moves.
pub const DRIP_TIME: f64 = 0.100;
/// Upper bound of a single stall wait.
pub const STALL_PAUSE_MAX: f64 = 1.0;
/// Poll interval of [`Toolhead::wait_moves`].
pub const WAIT_MOVES_PAUSE: f64 = 0.100;
/// Slack added to deferred stall checks and priming rechecks.
pub const STALL_RECHECK_TIME: f64 = 0.100;
/// Maximum number of registered step generation scan windows.
pub const MAX_SCAN_WINDOWS: usize = 8;

/// Step generator invoked with the schedule time up to which steps must exist.
pub type StepGenerator = Box<dyn FnMut(f64)>;

/// Callback notified once with the reason of a shutdown.
pub type ShutdownCallback = Box<dyn FnMut(&str)>;

/// Schedules queued motion against a remote device.
///
/// Collaborators are injected: `D` is the device clock and step sink, `H`
/// the host event loop, `Q` the toolhead trapezoid queue and `K` the
/// kinematics. The extrude axis is swappable at runtime.
pub struct Toolhead<D: Mcu, H: Reactor, Q: TrapQueue, K: Kinematics> {
    mcu: D,
    reactor: H,
    trapq: Q,
    kin: K,
    extruder: Box<dyn ExtraAxis>,
    lookahead: LookaheadQueue,
    config: ToolheadConfig,
    limits: MotionLimits,
    commanded_pos: Position,
    can_pause: bool,

    // Print time tracking
    print_time: f64,
    state: QueuingState,
    need_check_stall: f64,
    flush_timer: f64,
    last_print_start_time: f64,
    idle_flush_print_time: f64,
    print_stall: u32,

    // Step generation scan windows
    kin_flush_delay: f64,
    kin_flush_times: heapless::Vec<f64, MAX_SCAN_WINDOWS>,
    last_kin_flush_time: f64,
    last_kin_move_time: f64,
    step_generators: Vec<StepGenerator>,

    shutdown_callback: Option<ShutdownCallback>,
}

impl<D: Mcu, H: Reactor, Q: TrapQueue, K: Kinematics> Toolhead<D, H, Q, K> {
    /// Create a scheduler in the `Flushed` state with no extruder.
    ///
    /// `config` must already be validated; its limits are the ceiling for
    /// [`Toolhead::set_velocity_limit`].
    pub fn new(config: &ToolheadConfig, mcu: D, reactor: H, trapq: Q, kin: K) -> Self {
        let can_pause = !mcu.is_fileoutput();
        let mut lookahead = LookaheadQueue::new();
        lookahead.set_flush_time(config.buffer_time_high);

        Self {
            mcu,
            reactor,
            trapq,
            kin,
            extruder: Box::new(NullExtruder),
            lookahead,
            config: config.clone(),
            limits: MotionLimits::from_config(config),
            commanded_pos: [0.0; 4],
            can_pause,
            print_time: 0.0,
            state: QueuingState::Flushed,
            need_check_stall: -1.0,
            flush_timer: NEVER,
            last_print_start_time: 0.0,
            idle_flush_print_time: 0.0,
            print_stall: 0,
            kin_flush_delay: 0.0,
            kin_flush_times: heapless::Vec::new(),
            last_kin_flush_time: 0.0,
            last_kin_move_time: 0.0,
            step_generators: Vec::new(),
            shutdown_callback: None,
        }
    }

    // Print time tracking

    fn update_move_time(&mut self, next_print_time: f64) -> Result<()> {
        let kin_flush_delay = self.kin_flush_delay;
        let lkft = self.last_kin_flush_time;
        loop {
            self.print_time = (self.print_time + MOVE_BATCH_TIME)
                .min(next_print_time)
                .max(self.print_time);
            let sg_flush_time = lkft.max(self.print_time - kin_flush_delay);
            for generate in self.step_generators.iter_mut() {
                generate(sg_flush_time);
            }
            let free_time = lkft.max(sg_flush_time - kin_flush_delay);
            self.trapq.finalize_moves(free_time);
            self.extruder.update_move_time(free_time);

            let mcu_flush_time = lkft.max(sg_flush_time - self.config.move_flush_time);
            if let Err(e) = self.mcu.flush_moves(mcu_flush_time) {
                log::error!("device flush at {:.6} failed: {}", mcu_flush_time, e);
                self.handle_shutdown("device flush failed");
                return Err(e.into());
            }
            if self.print_time >= next_print_time {
                return Ok(());
            }
        }
    }

    fn calc_print_time(&mut self) {
        let curtime = self.reactor.monotonic();
        let est_print_time = self.mcu.estimated_print_time(curtime);
        let kin_time = (est_print_time + MIN_KIN_TIME).max(self.last_kin_flush_time) + self.kin_flush_delay;
        let min_print_time = (est_print_time + self.config.buffer_time_start).max(kin_time);
        if min_print_time > self.print_time {
            self.print_time = min_print_time;
            self.last_print_start_time = min_print_time;
            log::debug!(
                "sync print time: curtime={:.3} est={:.6} print_time={:.6}",
                curtime,
                est_print_time,
                min_print_time
            );
        }
    }

    fn process_moves(
        &mut self,
        segments: Vec<Segment>,
        drip: Option<&mut dyn DripCompletion>,
    ) -> Result<DripOutcome> {
        if segments.is_empty() {
            return Ok(DripOutcome::Completed);
        }
        // Resync print_time if necessary
        if self.state.is_special() {
            if self.state != QueuingState::Drip {
                self.state = QueuingState::Main;
                self.need_check_stall = -1.0;
                self.flush_timer = NOW;
            }
            self.calc_print_time();
        }

        let mut next_move_time = self.print_time;
        for mut seg in segments {
            if seg.is_kinematic {
                let [x, y, z, _] = seg.start_pos;
                let [rx, ry, rz, _] = seg.axes_r;
                self.trapq
                    .append(next_move_time, &Trapezoid::from_segment(&seg), [x, y, z], [rx, ry, rz]);
            }
            if seg.axes_d[3] != 0.0 {
                self.extruder.process_move(next_move_time, &seg);
            }
            next_move_time += seg.duration();
            for callback in seg.take_timing_callbacks() {
                callback(next_move_time);
            }
        }

        if self.state.is_special() {
            if let Some(completion) = drip {
                if self.update_drip_move_time(next_move_time, completion)?.is_triggered() {
                    return Ok(DripOutcome::Triggered);
                }
            }
        }
        self.update_move_time(next_move_time)?;
        self.last_kin_move_time = next_move_time;
        Ok(DripOutcome::Completed)
    }

    /// Flush all queued motion and enter the `Flushed` state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device rejected a flush.
    pub fn flush_step_generation(&mut self) -> Result<()> {
        let segments = self.lookahead.flush(false);
        self.process_moves(segments, None)?;

        self.state = QueuingState::Flushed;
        self.need_check_stall = -1.0;
        self.flush_timer = NEVER;
        self.lookahead.set_flush_time(self.config.buffer_time_high);
        self.idle_flush_print_time = 0.0;
        let flush_time = self.last_kin_move_time + self.kin_flush_delay;
        self.last_kin_flush_time = self.last_kin_flush_time.max(flush_time);
        self.update_move_time(self.print_time.max(self.last_kin_flush_time))
    }

    fn flush_lookahead(&mut self) -> Result<()> {
        if self.state.is_special() {
            return self.flush_step_generation();
        }
        let segments = self.lookahead.flush(false);
        self.process_moves(segments, None).map(|_| ())
    }

    /// Flush the look-ahead queue and return the schedule time at which
    /// new motion would start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device rejected a flush.
    pub fn get_last_move_time(&mut self) -> Result<f64> {
        self.flush_lookahead()?;
        if self.state.is_special() {
            self.calc_print_time();
        }
        Ok(self.print_time)
    }

    fn check_stall(&mut self) -> Result<()> {
        let mut eventtime = self.reactor.monotonic();
        if self.state.is_special() {
            if self.idle_flush_print_time != 0.0 {
                // Was in "Flushed" state and got there from idle input
                let est_print_time = self.mcu.estimated_print_time(eventtime);
                if est_print_time < self.idle_flush_print_time {
                    self.print_stall += 1;
                    log::info!("print stall #{} at print_time={:.3}", self.print_stall, self.print_time);
                }
                self.idle_flush_print_time = 0.0;
            }
            self.state = QueuingState::Priming;
            self.need_check_stall = -1.0;
            self.flush_timer = eventtime + STALL_RECHECK_TIME;
        }

        // Check if there are lots of queued moves and stall if so
        let mut est_print_time;
        loop {
            est_print_time = self.mcu.estimated_print_time(eventtime);
            let buffer_time = self.print_time - est_print_time;
            let stall_time = buffer_time - self.config.buffer_time_high;
            if stall_time <= 0.0 {
                break;
            }
            if !self.can_pause {
                self.need_check_stall = NEVER;
                return Ok(());
            }
            eventtime = self.pause(eventtime + stall_time.min(STALL_PAUSE_MAX))?;
        }
        if !self.state.is_special() {
            // In main state - defer stall checking until needed
            self.need_check_stall = est_print_time + self.config.buffer_time_high + STALL_RECHECK_TIME;
        }
        Ok(())
    }

    /// Background flush check, run when the flush timer is due.
    ///
    /// Returns the next wake time: later while the device buffer is above
    /// the low-water mark, [`NEVER`] once motion has been flushed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device rejected a flush.
    pub fn flush_handler(&mut self, eventtime: f64) -> Result<f64> {
        let print_time = self.print_time;
        let buffer_time = print_time - self.mcu.estimated_print_time(eventtime);
        if buffer_time > self.config.buffer_time_low {
            // Running normally - reschedule check
            return Ok(eventtime + buffer_time - self.config.buffer_time_low);
        }
        // Under ran low buffer mark - flush lookahead queue
        self.flush_step_generation()?;
        if print_time != self.print_time {
            self.idle_flush_print_time = self.print_time;
        }
        Ok(NEVER)
    }

    /// Run the flush timer if it is due at host time `eventtime`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device rejected a flush; the timer
    /// is disarmed.
    pub fn poll_flush_timer(&mut self, eventtime: f64) -> Result<()> {
        if eventtime < self.flush_timer {
            return Ok(());
        }
        match self.flush_handler(eventtime) {
            Ok(waketime) => {
                self.flush_timer = waketime;
                Ok(())
            }
            Err(e) => {
                self.flush_timer = NEVER;
                Err(e)
            }
        }
    }

    /// Host time at which the flush timer is next due.
    #[inline]
    pub fn flush_timer(&self) -> f64 {
        self.flush_timer
    }

    fn pause(&mut self, waketime: f64) -> Result<f64> {
        let eventtime = self.reactor.pause(waketime);
        self.poll_flush_timer(eventtime)?;
        Ok(eventtime)
    }

    // Movement commands

    /// Commanded position.
    #[inline]
    pub fn get_position(&self) -> Position {
        self.commanded_pos
    }

    /// Flush all motion and redefine the current position.
    ///
    /// Axes listed in `homing_axes` (0 = x, 1 = y, 2 = z) become homed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device rejected a flush.
    pub fn set_position(&mut self, pos: Position, homing_axes: &[usize]) -> Result<()> {
        self.flush_step_generation()?;
        self.trapq.finalize_moves(NEVER);
        self.commanded_pos = pos;
        self.kin.set_position(pos, homing_axes);
        Ok(())
    }

    /// Queue a linear move to `end_pos` at `speed` mm/s.
    ///
    /// A move to the current position is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Move`] if kinematics or the extruder reject the
    /// move (nothing is queued), or [`Error::Device`] if committing
    /// flushed motion failed.
    pub fn move_to(&mut self, end_pos: Position, speed: f64) -> Result<()> {
        self.queue_move(end_pos, speed, None).map(|_| ())
    }

    fn queue_move(
        &mut self,
        end_pos: Position,
        speed: f64,
        drip: Option<&mut dyn DripCompletion>,
    ) -> Result<DripOutcome> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(MoveError::InvalidSpeed(speed).into());
        }
        let mut seg = Segment::new(self.commanded_pos, end_pos, speed, &self.limits);
        if seg.move_d == 0.0 {
            return Ok(DripOutcome::Completed);
        }
        if seg.is_kinematic {
            self.kin.check_move(&mut seg)?;
        }
        if seg.axes_d[3] != 0.0 {
            self.extruder.check_move(&mut seg)?;
        }
        self.commanded_pos = seg.end_pos;

        let flushed = self.lookahead.add_move(seg, self.extruder.as_ref());
        let outcome = self.process_moves(flushed, drip)?;
        if self.print_time > self.need_check_stall {
            self.check_stall()?;
        }
        Ok(outcome)
    }

    /// Pause motion for `delay` seconds of schedule time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device rejected a flush.
    pub fn dwell(&mut self, delay: f64) -> Result<()> {
        let next_print_time = self.get_last_move_time()? + delay.max(0.0);
        self.update_move_time(next_print_time)?;
        self.check_stall()
    }

    /// Block until the device has executed all queued motion.
    ///
    /// Returns at once when the scheduler cannot pause.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the device rejected a flush.
    pub fn wait_moves(&mut self) -> Result<()> {
        self.flush_lookahead()?;
        let mut eventtime = self.reactor.monotonic();
        while !self.state.is_special() || self.print_time >= self.mcu.estimated_print_time(eventtime) {
            if !self.can_pause {
                break;
            }
            eventtime = self.pause(eventtime + WAIT_MOVES_PAUSE)?;
        }
        Ok(())
    }

    /// Install a new extrude axis positioned at `extrude_pos`.
    ///
    /// Returns the previous extrude axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan window of the new axis cannot be
    /// registered or flushing failed.
    pub fn set_extruder(&mut self, extruder: Box<dyn ExtraAxis>, extrude_pos: f64) -> Result<Box<dyn ExtraAxis>> {
        let old_scan = self.extruder.scan_time();
        let new_scan = extruder.scan_time();
        let previous = core::mem::replace(&mut self.extruder, extruder);
        self.commanded_pos[3] = extrude_pos;
        if old_scan != new_scan {
            self.note_step_generation_scan_time(new_scan, old_scan)?;
        }
        log::debug!("active extruder: {}", self.extruder.name());
        Ok(previous)
    }

    /// Name of the active extrude axis.
    pub fn extruder_name(&self) -> &str {
        self.extruder.name()
    }

    /// Change pressure advance of the active extrude axis.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing failed or the new scan window cannot
    /// be registered.
    pub fn set_pressure_advance(&mut self, pressure_advance: f64, smooth_time: f64) -> Result<()> {
        self.flush_step_generation()?;
        let old_scan = self.extruder.scan_time();
        self.extruder.set_pressure_advance(pressure_advance, smooth_time);
        let new_scan = self.extruder.scan_time();
        if old_scan != new_scan {
            self.note_step_generation_scan_time(new_scan, old_scan)?;
        }
        Ok(())
    }

    // Homing "drip move" handling

    fn update_drip_move_time(&mut self, next_print_time: f64, completion: &mut dyn DripCompletion) -> Result<DripOutcome> {
        let flush_delay = DRIP_TIME + self.config.move_flush_time + self.kin_flush_delay;
        while self.print_time < next_print_time {
            if completion.test() {
                return Ok(DripOutcome::Triggered);
            }
            let curtime = self.reactor.monotonic();
            let est_print_time = self.mcu.estimated_print_time(curtime);
            let wait_time = self.print_time - est_print_time - flush_delay;
            if wait_time > 0.0 && self.can_pause {
                // Pause before sending more steps
                self.pause(curtime + wait_time)?;
                continue;
            }
            let npt = (self.print_time + DRIP_SEGMENT_TIME).min(next_print_time);
            self.update_move_time(npt)?;
        }
        Ok(DripOutcome::Completed)
    }

    /// Move to `end_pos` in drip mode, stopping early once `completion` fires.
    ///
    /// Motion is sent in short batches so an endstop or probe trigger can
    /// cut the move short; unsent motion is then discarded. The scheduler is
    /// left `Flushed` in every case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Move`] if the move is rejected, or [`Error::Device`]
    /// if the device rejected a flush.
    pub fn drip_move(
        &mut self,
        end_pos: Position,
        speed: f64,
        completion: &mut dyn DripCompletion,
    ) -> Result<DripOutcome> {
        let segments = self.lookahead.flush(false);
        self.process_moves(segments, None)?;

        self.state = QueuingState::Drip;
        self.need_check_stall = NEVER;
        self.flush_timer = NEVER;
        self.lookahead.set_flush_time(self.config.buffer_time_high);
        self.idle_flush_print_time = 0.0;

        let mut outcome = match self.queue_move(end_pos, speed, Some(&mut *completion)) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.flush_step_generation()?;
                return Err(e);
            }
        };
        if !outcome.is_triggered() {
            let segments = self.lookahead.flush(false);
            outcome = match self.process_moves(segments, Some(completion)) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.flush_step_generation()?;
                    return Err(e);
                }
            };
        }
        if outcome.is_triggered() {
            log::debug!("drip move triggered at print_time={:.6}", self.print_time);
            self.lookahead.reset();
            self.trapq.finalize_moves(NEVER);
        }

        // Exit "Drip" state
        self.flush_step_generation()?;
        Ok(outcome)
    }

    // Misc commands

    /// Activity flag and a one-line summary for periodic statistics.
    pub fn stats(&self, eventtime: f64) -> (bool, heapless::String<96>) {
        let mut buffer_time = self.print_time - self.mcu.estimated_print_time(eventtime);
        let is_active = buffer_time > -60.0 || !self.state.is_special();
        if self.state == QueuingState::Drip {
            buffer_time = 0.0;
        }
        let mut line = heapless::String::new();
        // Truncated on overflow.
        let _ = write!(
            line,
            "print_time={:.3} buffer_time={:.3} print_stall={}",
            self.print_time,
            buffer_time.max(0.0),
            self.print_stall
        );
        (is_active, line)
    }

    /// `(print_time, estimated_print_time, lookahead_empty)` at `eventtime`.
    pub fn check_busy(&self, eventtime: f64) -> (f64, f64, bool) {
        let est_print_time = self.mcu.estimated_print_time(eventtime);
        (self.print_time, est_print_time, self.lookahead.is_empty())
    }

    /// Status snapshot at host time `eventtime`.
    pub fn get_status(&self, eventtime: f64) -> ToolheadStatus {
        let print_time = self.print_time;
        let estimated_print_time = self.mcu.estimated_print_time(eventtime);
        let buffer_time = print_time - estimated_print_time;
        let status = if buffer_time > -1.0 || !self.state.is_special() {
            PrintState::Printing
        } else {
            PrintState::Ready
        };
        ToolheadStatus {
            status,
            print_time,
            estimated_print_time,
            buffer_time,
            printing_time: print_time - self.last_print_start_time,
            position: self.commanded_pos,
            extruder: truncated(self.extruder.name()),
            max_velocity: self.limits.max_velocity,
            max_accel: self.limits.max_accel,
            max_accel_to_decel: self.limits.max_accel_to_decel,
            square_corner_velocity: self.limits.square_corner_velocity,
            homed_axes: self.kin.homed_axes(),
            state: self.state,
            print_stall: self.print_stall,
        }
    }

    /// Stop scheduling after a fatal error.
    ///
    /// Pausing is disabled for good, pending moves are dropped, the
    /// scheduler returns to [`QueuingState::Flushed`] with the flush timer
    /// and stall checks disarmed, and the shutdown callback (if any) is
    /// notified with `reason`.
    pub fn handle_shutdown(&mut self, reason: &str) {
        log::error!("toolhead shutdown: {}", reason);
        self.can_pause = false;
        self.lookahead.reset();
        self.state = QueuingState::Flushed;
        self.need_check_stall = NEVER;
        self.flush_timer = NEVER;
        if let Some(callback) = self.shutdown_callback.as_mut() {
            callback(reason);
        }
    }

    /// Install the callback notified by [`Toolhead::handle_shutdown`].
    pub fn set_shutdown_callback(&mut self, callback: ShutdownCallback) {
        self.shutdown_callback = Some(callback);
    }

    /// Register a step generator run on every flush.
    pub fn register_step_generator(&mut self, generator: StepGenerator) {
        self.step_generators.push(generator);
    }

    /// Replace a step generation scan window of `old_delay` seconds by one
    /// of `delay` seconds (zero means none).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ScanWindowsFull`] if too many windows are
    /// registered, or [`Error::Device`] if flushing failed.
    pub fn note_step_generation_scan_time(&mut self, delay: f64, old_delay: f64) -> Result<()> {
        self.flush_step_generation()?;
        if old_delay != 0.0 {
            if let Some(idx) = self.kin_flush_times.iter().position(|&t| t == old_delay) {
                self.kin_flush_times.swap_remove(idx);
            }
        }
        if delay != 0.0 {
            self.kin_flush_times
                .push(delay)
                .map_err(|_| Error::Config(ConfigError::ScanWindowsFull))?;
        }
        self.kin_flush_delay = self.kin_flush_times.iter().copied().fold(0.0, f64::max);
        log::debug!("kinematic flush delay: {:.6}", self.kin_flush_delay);
        Ok(())
    }

    /// Run `callback` with the schedule time at which the last queued move
    /// completes (or the current last move time if nothing is queued).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if flushing for an empty queue failed.
    pub fn register_lookahead_callback(&mut self, callback: TimingCallback) -> Result<()> {
        if let Some(last) = self.lookahead.last_mut() {
            last.register_timing_callback(callback);
            return Ok(());
        }
        let print_time = self.get_last_move_time()?;
        callback(print_time);
        Ok(())
    }

    /// Note step activity queued outside the scheduler up to `kin_time`.
    pub fn note_kinematic_activity(&mut self, kin_time: f64) {
        self.last_kin_move_time = self.last_kin_move_time.max(kin_time);
    }

    /// `(max_velocity, max_accel)` currently in force.
    pub fn get_max_velocity(&self) -> (f64, f64) {
        (self.limits.max_velocity, self.limits.max_accel)
    }

    /// Highest velocity at which an axis may be halted at a corner.
    pub fn get_max_axis_halt(&self) -> f64 {
        self.limits.max_axis_halt()
    }

    /// Active motion limits.
    #[inline]
    pub fn limits(&self) -> &MotionLimits {
        &self.limits
    }

    /// Change motion limits at runtime; `None` keeps the current value.
    ///
    /// Velocity, acceleration and corner velocity are capped at their
    /// configured values. Queued motion is flushed first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a non-positive velocity or
    /// acceleration or a negative corner velocity, or [`Error::Device`] if
    /// flushing failed.
    pub fn set_velocity_limit(
        &mut self,
        max_velocity: Option<f64>,
        max_accel: Option<f64>,
        square_corner_velocity: Option<f64>,
        accel_to_decel: Option<f64>,
    ) -> Result<MotionLimits> {
        let max_velocity = max_velocity.unwrap_or(self.limits.max_velocity);
        let max_accel = max_accel.unwrap_or(self.limits.max_accel);
        let square_corner_velocity = square_corner_velocity.unwrap_or(self.limits.square_corner_velocity);
        let accel_to_decel = accel_to_decel.unwrap_or(self.limits.requested_accel_to_decel());
        if max_velocity <= 0.0 {
            return Err(ConfigError::InvalidMaxVelocity(max_velocity).into());
        }
        if max_accel <= 0.0 {
            return Err(ConfigError::InvalidMaxAcceleration(max_accel).into());
        }
        if accel_to_decel <= 0.0 {
            return Err(ConfigError::InvalidMaxAcceleration(accel_to_decel).into());
        }
        if square_corner_velocity < 0.0 {
            return Err(ConfigError::InvalidCornerVelocity(square_corner_velocity).into());
        }

        self.get_last_move_time()?;
        self.limits.max_velocity = max_velocity.min(self.config.max_velocity);
        self.limits.max_accel = max_accel.min(self.config.max_accel);
        self.limits.square_corner_velocity = square_corner_velocity.min(self.config.square_corner_velocity);
        self.limits.set_accel_to_decel(accel_to_decel);
        log::info!(
            "max_velocity: {:.6} max_accel: {:.6} max_accel_to_decel: {:.6} square_corner_velocity: {:.6}",
            max_velocity,
            max_accel,
            accel_to_decel,
            square_corner_velocity
        );
        Ok(self.limits)
    }

    /// Current queuing state.
    #[inline]
    pub fn state(&self) -> QueuingState {
        self.state
    }

    /// Schedule time committed so far.
    #[inline]
    pub fn print_time(&self) -> f64 {
        self.print_time
    }

    /// Lag required by the slowest registered step generation window.
    #[inline]
    pub fn kin_flush_delay(&self) -> f64 {
        self.kin_flush_delay
    }

    /// Whether stall waits are allowed.
    #[inline]
    pub fn can_pause(&self) -> bool {
        self.can_pause
    }

    /// Number of pending look-ahead segments.
    #[inline]
    pub fn queued_moves(&self) -> usize {
        self.lookahead.len()
    }

    /// Toolhead trapezoid queue.
    pub fn trapq(&self) -> &Q {
        &self.trapq
    }

    /// Kinematics.
    pub fn kinematics(&self) -> &K {
        &self.kin
    }

    /// Kinematics, mutably.
    pub fn kinematics_mut(&mut self) -> &mut K {
        &mut self.kin
    }

    /// Device.
    pub fn mcu(&self) -> &D {
        &self.mcu
    }

    /// Device, mutably.
    pub fn mcu_mut(&mut self) -> &mut D {
        &mut self.mcu
    }

    /// Host event loop.
    pub fn reactor(&self) -> &H {
        &self.reactor
    }
}

impl<D: Mcu, H: Reactor, Q: TrapQueue, K: Kinematics> fmt::Debug for Toolhead<D, H, Q, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolhead")
            .field("state", &self.state)
            .field("print_time", &self.print_time)
            .field("commanded_pos", &self.commanded_pos)
            .field("queued_moves", &self.lookahead.len())
            .field("kin_flush_delay", &self.kin_flush_delay)
            .field("extruder", &self.extruder.name())
            .finish_non_exhaustive()
    }
}
