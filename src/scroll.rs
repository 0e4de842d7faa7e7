//! Smoothed scroll offset and the rotation angles derived from it

use crate::config::ScrollParams;
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Rotation about the two torus axes, each in [0, 2π)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub a: f32,
    pub b: f32,
}

impl Rotation {
    pub fn from_scroll(offset: f64, params: &ScrollParams) -> Self {
        Self {
            a: wrap_angle(offset / params.sensitivity_a as f64),
            b: wrap_angle(offset / params.sensitivity_b as f64),
        }
    }
}

fn wrap_angle(radians: f64) -> f32 {
    let wrapped = radians.rem_euclid(std::f64::consts::TAU) as f32;
    // rem_euclid can round up to exactly TAU after the f32 cast
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Raw scroll target and the eased value chasing it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    pub target: f64,
    pub current: f64,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A state already at rest on `offset`
    pub fn settled_at(offset: f64) -> Self {
        let mut state = Self::new();
        state.set_target(offset);
        state.current = state.target;
        state
    }

    /// Record the latest scroll position. Offsets are clamped at zero and
    /// non-finite values are dropped.
    pub fn set_target(&mut self, offset: f64) {
        if offset.is_finite() {
            self.target = offset.max(0.0);
        }
    }

    /// Ease `current` toward `target` by one step and derive the rotation
    pub fn tick(self, params: &ScrollParams) -> (Self, Rotation) {
        let smoothing = params.smoothing as f64;
        let current = if smoothing >= 1.0 {
            self.target
        } else {
            self.current + (self.target - self.current) * smoothing
        };
        let next = Self { target: self.target, current };
        (next, Rotation::from_scroll(current, params))
    }

    pub fn rotation(&self, params: &ScrollParams) -> Rotation {
        Rotation::from_scroll(self.current, params)
    }

    pub fn is_settled(&self, epsilon: f64) -> bool {
        (self.target - self.current).abs() <= epsilon
    }
}

/// Shared slot an input source writes scroll targets into.
///
/// Writers store the newest offset; the frame driver reads it once at the
/// start of each tick. Last write wins.
#[derive(Debug, Clone, Default)]
pub struct ScrollInput {
    bits: Arc<AtomicU64>,
}

impl ScrollInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, offset: f64) {
        if offset.is_finite() {
            self.bits.store(offset.max(0.0).to_bits(), Ordering::Relaxed);
        }
    }

    /// Move the target by `delta`, never below zero
    pub fn scroll_by(&self, delta: f64) {
        self.set(self.get() + delta);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_at_rest() {
        let params = ScrollParams::default();
        let (state, rotation) = ScrollState::new().tick(&params);
        assert_eq!(state.current, 0.0);
        assert_eq!(rotation, Rotation::default());
    }

    #[test]
    fn single_tick_moves_a_tenth() {
        let params = ScrollParams::default();
        let mut state = ScrollState::new();
        state.set_target(1000.0);
        let (state, _) = state.tick(&params);
        assert!((state.current - 100.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_uses_independent_divisors() {
        let params = ScrollParams::default();
        let rotation = Rotation::from_scroll(600.0, &params);
        assert!((rotation.a - 3.0).abs() < 1e-6);
        assert!((rotation.b - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rotation_wraps_into_full_turn() {
        let params = ScrollParams::default();
        let rotation = Rotation::from_scroll(200.0 * 7.0, &params);
        assert!(rotation.a >= 0.0 && rotation.a < TAU);
        assert!((rotation.a - (7.0 - TAU)).abs() < 1e-5);
    }

    #[test]
    fn negative_and_nan_targets() {
        let mut state = ScrollState::new();
        state.set_target(-50.0);
        assert_eq!(state.target, 0.0);
        state.set_target(30.0);
        state.set_target(f64::NAN);
        assert_eq!(state.target, 30.0);
    }

    #[test]
    fn settled_state_does_not_move() {
        let params = ScrollParams::default();
        let (state, _) = ScrollState::settled_at(420.0).tick(&params);
        assert_eq!(state.current, 420.0);
        assert!(state.is_settled(0.0));
    }

    #[test]
    fn full_smoothing_jumps_to_target() {
        let params = ScrollParams { smoothing: 1.0, ..ScrollParams::default() };
        let mut state = ScrollState::new();
        state.set_target(123.456);
        let (state, _) = state.tick(&params);
        assert_eq!(state.current, 123.456);
    }

    #[test]
    fn input_slot_clamps_and_accumulates() {
        let input = ScrollInput::new();
        let writer = input.clone();
        writer.scroll_by(40.0);
        writer.scroll_by(40.0);
        assert_eq!(input.get(), 80.0);
        writer.scroll_by(-500.0);
        assert_eq!(input.get(), 0.0);
    }

    proptest! {
        #[test]
        fn converges_without_overshoot(
            start in 0.0f64..50_000.0,
            target in 0.0f64..50_000.0,
            smoothing in 0.01f32..=1.0,
        ) {
            let params = ScrollParams { smoothing, ..ScrollParams::default() };
            let mut state = ScrollState { target, current: start };
            let mut prev_gap = (target - start).abs();
            for _ in 0..5_000 {
                let (next, rotation) = state.tick(&params);
                let gap = (target - next.current).abs();
                prop_assert!(gap <= prev_gap + 1e-9);
                // never crosses the target
                prop_assert!((next.current - target) * (start - target) >= -1e-9);
                prop_assert!(rotation.a >= 0.0 && rotation.a < TAU);
                prop_assert!(rotation.b >= 0.0 && rotation.b < TAU);
                prev_gap = gap;
                state = next;
            }
            prop_assert!(state.is_settled(1e-3));
        }
    }
}
