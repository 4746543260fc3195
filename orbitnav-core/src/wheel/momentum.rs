//! Velocity accumulation and per-frame glide for the momentum strategy.

use std::time::Duration;

use crate::config::WheelConfig;

#[derive(Debug, Clone, Default)]
pub struct MomentumState {
    velocity: f32,
    pending: f32,
    animating: bool,
}

impl MomentumState {
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn pending(&self) -> f32 {
        self.pending
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Fold a new scroll delta into the accumulated velocity and return the
    /// resulting speed multiplier, clamped to `[1, max_velocity_multiplier]`.
    ///
    /// `elapsed` is the time since the previous wheel event; `None` for the
    /// first event, which starts from rest.
    pub fn accumulate(&mut self, config: &WheelConfig, elapsed: Option<Duration>, delta: f32) -> f32 {
        match elapsed {
            Some(gap) if gap <= config.velocity_reset() => self.velocity *= config.velocity_decay,
            _ => self.velocity = 0.0,
        }
        self.velocity += delta.abs();
        velocity_multiplier(config, self.velocity)
    }

    /// Blend a fresh signed step into the pending distance.
    pub fn blend(&mut self, config: &WheelConfig, step: f32) {
        self.pending = self.pending * config.carry_over + step;
    }

    /// Mark the cycle running. Returns false if it already was.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.animating, true)
    }

    /// Take one smoothing fraction of the pending distance. Returns the
    /// distance to move this frame and whether another frame is needed.
    pub fn frame_step(&mut self, config: &WheelConfig) -> (f32, bool) {
        let amount = self.pending * config.smoothing;
        self.pending -= amount;
        if self.pending.abs() < config.stop_epsilon {
            self.stop();
            (amount, false)
        } else {
            (amount, true)
        }
    }

    pub fn stop(&mut self) {
        self.pending = 0.0;
        self.animating = false;
    }
}

/// `min(1 + velocity / divisor, max)`, never below 1.
pub fn velocity_multiplier(config: &WheelConfig, velocity: f32) -> f32 {
    (1.0 + velocity.max(0.0) / config.velocity_divisor).min(config.max_velocity_multiplier)
}
