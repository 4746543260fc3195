//! State for the instant strategy: one step per event, scaled by proximity.

use std::time::Instant;

use crate::config::WheelConfig;
use crate::proximity::speed_factor;
use crate::types::Hit;

#[derive(Debug, Clone)]
pub struct InstantState {
    factor: f32,
    scrolling: bool,
    last_raycast: Option<Instant>,
    applied_ticket: u64,
}

impl Default for InstantState {
    fn default() -> Self {
        Self {
            factor: 1.0,
            scrolling: false,
            last_raycast: None,
            applied_ticket: 0,
        }
    }
}

impl InstantState {
    /// Cached proximity factor.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Whether a scroll burst is moving the camera right now.
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Factor to apply to the next step.
    pub fn step_factor(&self, config: &WheelConfig) -> f32 {
        if config.proximity.enabled { self.factor } else { 1.0 }
    }

    /// Whether a wheel event at `now` may refresh the factor. Raycasts are
    /// skipped mid-burst and throttled otherwise.
    pub fn wants_raycast(&self, config: &WheelConfig, now: Instant) -> bool {
        if !config.proximity.enabled || self.scrolling {
            return false;
        }
        match self.last_raycast {
            Some(last) => now.saturating_duration_since(last) >= config.raycast_throttle(),
            None => true,
        }
    }

    pub fn begin_burst(&mut self) {
        self.scrolling = true;
    }

    pub fn settle(&mut self) {
        self.scrolling = false;
    }

    pub fn mark_raycast(&mut self, now: Instant) {
        self.last_raycast = Some(now);
    }

    /// Fold a raycast result into the cached factor. Returns false when a
    /// newer result was already applied.
    pub fn apply_hit(&mut self, config: &WheelConfig, ticket: u64, hit: Option<Hit>) -> bool {
        if ticket < self.applied_ticket {
            return false;
        }
        self.applied_ticket = ticket;
        self.factor = speed_factor(&config.proximity, hit.map(|h| h.distance));
        true
    }
}
