//! The motion model: target/animated position pairs advanced once per frame.
//!
//! `buffer` is where the user has asked to be; `current` is where the
//! animation is. `update` moves the target on each wheel event, `step` moves
//! the animation one display frame via exponential approach. The friction
//! formula is deliberately a per-frame decay toward the target, not a
//! physical spring; the settle bound below depends on it.

use crate::config::{ScrollConfig, SPEED_REFERENCE};
use crate::engine::classifier::AxisSample;
use crate::engine::curve::lerp;

/// Summed remaining distance below which motion is considered settled.
pub const STOP_THRESHOLD: f64 = 0.05;

/// Per-axis frame deltas smaller than this are suppressed as noise.
pub const EMIT_THRESHOLD: f64 = 0.01;

/// Inter-event gap (seconds) treated as fully leisurely scrolling.
const SLOW_ARRIVAL_SECS: f64 = 0.1;
/// Normalization span down to ~0.016 s (one 60 Hz frame) between events.
const ARRIVAL_SPAN_SECS: f64 = 0.084;

/// Outcome of advancing the animation by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Post this frame's deltas.
    Emit { dx: f64, dy: f64 },
    /// Within the stop threshold; the caller should disarm the frame driver.
    /// `current` has been snapped exactly onto `buffer`.
    Settled,
    /// Still converging, but this frame's movement is below the noise floor.
    Quiet,
}

/// Target/animated position pair per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    pub buffer_x: f64,
    pub buffer_y: f64,
    pub current_x: f64,
    pub current_y: f64,
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one classified wheel event into the target position.
    ///
    /// `elapsed_secs` is the time since the previous wheel event; tighter
    /// gaps mean faster spinning and a larger acceleration multiplier.
    pub fn update(
        &mut self,
        x: AxisSample,
        y: AxisSample,
        elapsed_secs: f64,
        config: &ScrollConfig,
    ) {
        let t = ((SLOW_ARRIVAL_SECS - elapsed_secs) / ARRIVAL_SPAN_SECS).clamp(0.0, 1.0);
        let curved = config.accel_curve.apply(t);
        let multiplier = 1.0 + curved * 1.5 * config.accel_factor;

        let dx = Self::scale_axis(x, config) * multiplier;
        let dy = Self::scale_axis(y, config) * multiplier;

        // A reversal mid-glide would otherwise have to burn through the
        // remaining distance first, flicking the view the wrong way.
        let remaining_x = self.buffer_x - self.current_x;
        let remaining_y = self.buffer_y - self.current_y;
        if dx * remaining_x < 0.0 {
            self.buffer_x = self.current_x;
        }
        if dy * remaining_y < 0.0 {
            self.buffer_y = self.current_y;
        }

        self.buffer_x += dx;
        self.buffer_y += dy;
    }

    /// Line-count deltas get the full speed multiplier; precision deltas are
    /// already in points and only scale relative to the reference default.
    fn scale_axis(sample: AxisSample, config: &ScrollConfig) -> f64 {
        if !sample.valid {
            return 0.0;
        }
        if sample.from_lines {
            sample.value * config.speed_multi
        } else {
            sample.value * (config.speed_multi / SPEED_REFERENCE)
        }
    }

    /// Advance the animated position one frame toward the target.
    pub fn step(&mut self, friction: f64) -> StepOutcome {
        let new_x = lerp(self.current_x, self.buffer_x, friction);
        let new_y = lerp(self.current_y, self.buffer_y, friction);

        let diff_x = new_x - self.current_x;
        let diff_y = new_y - self.current_y;

        self.current_x = new_x;
        self.current_y = new_y;

        let remaining =
            (self.buffer_x - self.current_x).abs() + (self.buffer_y - self.current_y).abs();
        if remaining < STOP_THRESHOLD {
            // Snap exactly onto the target so no sub-threshold residue is
            // carried into the next gesture.
            self.current_x = self.buffer_x;
            self.current_y = self.buffer_y;
            return StepOutcome::Settled;
        }

        if diff_x.abs() > EMIT_THRESHOLD || diff_y.abs() > EMIT_THRESHOLD {
            StepOutcome::Emit { dx: diff_x, dy: diff_y }
        } else {
            StepOutcome::Quiet
        }
    }

    /// Summed per-axis distance still to travel.
    pub fn remaining(&self) -> f64 {
        (self.buffer_x - self.current_x).abs() + (self.buffer_y - self.current_y).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::curve::AccelCurve;

    fn lines(value: f64) -> AxisSample {
        AxisSample { valid: true, value, from_lines: true }
    }

    fn points(value: f64) -> AxisSample {
        AxisSample { valid: true, value, from_lines: false }
    }

    fn none() -> AxisSample {
        AxisSample::default()
    }

    /// Config with acceleration and speed scaling neutralized, so tests can
    /// reason about raw deltas.
    fn unit_config() -> ScrollConfig {
        ScrollConfig {
            speed_multi: 1.0,
            accel_factor: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_update_accumulates_into_buffer() {
        let mut state = MotionState::new();
        state.update(none(), lines(2.0), 1.0, &unit_config());
        state.update(none(), lines(3.0), 1.0, &unit_config());
        assert_eq!(state.buffer_y, 5.0);
        assert_eq!(state.current_y, 0.0);
    }

    #[test]
    fn test_line_deltas_scale_by_speed_multi() {
        let config = ScrollConfig { accel_factor: 0.0, ..Default::default() };
        let mut state = MotionState::new();
        state.update(none(), lines(1.0), 1.0, &config);
        assert_eq!(state.buffer_y, 80.0);
    }

    #[test]
    fn test_point_deltas_scale_relative_to_reference() {
        // At the default speed the precision path is an identity scale.
        let config = ScrollConfig { accel_factor: 0.0, ..Default::default() };
        let mut state = MotionState::new();
        state.update(points(12.0), none(), 1.0, &config);
        assert_eq!(state.buffer_x, 12.0);

        let half = ScrollConfig { speed_multi: 40.0, accel_factor: 0.0, ..Default::default() };
        let mut state = MotionState::new();
        state.update(points(12.0), none(), 1.0, &half);
        assert_eq!(state.buffer_x, 6.0);
    }

    #[test]
    fn test_fast_arrival_amplifies_slow_arrival_does_not() {
        let config = ScrollConfig {
            speed_multi: 1.0,
            accel_factor: 1.0,
            accel_curve: AccelCurve::Linear,
            ..Default::default()
        };

        // 16 ms between events: t = 1, multiplier = 1 + 1.5.
        let mut fast = MotionState::new();
        fast.update(none(), lines(1.0), 0.016, &config);
        assert!((fast.buffer_y - 2.5).abs() < 1e-9);

        // 100 ms or more: no acceleration at all.
        let mut slow = MotionState::new();
        slow.update(none(), lines(1.0), 0.25, &config);
        assert_eq!(slow.buffer_y, 1.0);
    }

    #[test]
    fn test_direction_change_resets_remaining_glide() {
        let mut state = MotionState {
            buffer_y: 10.0,
            current_y: 4.0,
            ..Default::default()
        };
        state.update(none(), lines(-2.0), 1.0, &unit_config());
        // Remaining glide (6) is discarded: buffer snaps to 4, then takes -2.
        assert_eq!(state.buffer_y, 2.0);
        assert_eq!(state.current_y, 4.0);
    }

    #[test]
    fn test_same_direction_keeps_remaining_glide() {
        let mut state = MotionState {
            buffer_y: 10.0,
            current_y: 4.0,
            ..Default::default()
        };
        state.update(none(), lines(2.0), 1.0, &unit_config());
        assert_eq!(state.buffer_y, 12.0);
    }

    #[test]
    fn test_direction_guard_is_per_axis() {
        let mut state = MotionState {
            buffer_x: 10.0,
            current_x: 4.0,
            buffer_y: -10.0,
            current_y: -4.0,
            ..Default::default()
        };
        // X reverses, Y continues.
        state.update(lines(-2.0), lines(-2.0), 1.0, &unit_config());
        assert_eq!(state.buffer_x, 2.0);
        assert_eq!(state.buffer_y, -12.0);
    }

    #[test]
    fn test_step_converges_within_derived_bound() {
        let friction: f64 = 0.08;
        let mut state = MotionState { buffer_y: 100.0, ..Default::default() };

        let expected = ((STOP_THRESHOLD / 100.0_f64).ln() / (1.0 - friction).ln()).ceil() as usize;

        let mut steps = 0;
        loop {
            steps += 1;
            if state.step(friction) == StepOutcome::Settled {
                break;
            }
            assert!(steps <= expected, "did not settle within {expected} steps");
        }
        assert_eq!(steps, expected);
    }

    #[test]
    fn test_step_never_overshoots() {
        let mut state = MotionState { buffer_y: 100.0, ..Default::default() };
        let mut prev = 0.0;
        for _ in 0..200 {
            state.step(0.08);
            assert!(state.current_y <= 100.0 + 1e-9);
            assert!(state.current_y + 1e-9 >= prev, "motion reversed");
            prev = state.current_y;
        }
    }

    #[test]
    fn test_remaining_is_non_increasing_without_input() {
        let mut state = MotionState { buffer_x: 40.0, buffer_y: -60.0, ..Default::default() };
        let mut prev = state.remaining();
        for _ in 0..200 {
            state.step(0.08);
            let now = state.remaining();
            assert!(now <= prev + 1e-9);
            prev = now;
        }
    }

    #[test]
    fn test_settle_snaps_current_exactly_onto_buffer() {
        let mut state = MotionState { buffer_y: 1.0, ..Default::default() };
        loop {
            if state.step(0.3) == StepOutcome::Settled {
                break;
            }
        }
        assert_eq!(state.current_y, state.buffer_y);
        assert_eq!(state.current_x, state.buffer_x);
        // Once settled, further frames stay settled and emit nothing.
        assert_eq!(state.step(0.3), StepOutcome::Settled);
    }

    #[test]
    fn test_step_emits_frame_deltas() {
        let mut state = MotionState { buffer_y: 100.0, ..Default::default() };
        match state.step(0.08) {
            StepOutcome::Emit { dx, dy } => {
                assert_eq!(dx, 0.0);
                assert!((dy - 8.0).abs() < 1e-9);
            }
            other => panic!("expected emit, got {other:?}"),
        }
        assert!((state.current_y - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_sub_noise_motion_is_quiet_not_emitted() {
        // Remaining distance above the stop threshold but per-frame movement
        // below the emit threshold.
        let mut state = MotionState { buffer_y: 0.06, ..Default::default() };
        assert_eq!(state.step(0.08), StepOutcome::Quiet);
    }

    #[test]
    fn test_invalid_axis_contributes_nothing() {
        let mut state = MotionState::new();
        state.update(none(), none(), 1.0, &unit_config());
        assert_eq!(state, MotionState::new());
    }
}
