//! Controller tuning, loadable from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NavError;

/// How wheel input is turned into camera motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionStrategy {
    /// Accumulate velocity and glide over several animation frames.
    Momentum,
    /// Apply one proximity-scaled step per event.
    #[default]
    Instant,
}

/// Distance-to-speed mapping for the instant strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub enabled: bool,
    /// Below this distance the speed ramps down towards `min_speed`.
    pub slow_distance: f32,
    /// Start of the ramp up towards `max_speed`.
    pub normal_distance: f32,
    /// At and beyond this distance the speed is `max_speed`.
    pub fast_distance: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slow_distance: 5.0,
            normal_distance: 20.0,
            fast_distance: 100.0,
            min_speed: 0.1,
            max_speed: 3.0,
        }
    }
}

impl ProximityConfig {
    pub fn validate(&self) -> Result<(), NavError> {
        let distances = [self.slow_distance, self.normal_distance, self.fast_distance];
        if distances.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(invalid("proximity distances must be finite and positive"));
        }
        if !(self.slow_distance <= self.normal_distance && self.normal_distance < self.fast_distance)
        {
            return Err(invalid(
                "proximity distances must satisfy slow <= normal < fast",
            ));
        }
        if !(self.min_speed > 0.0 && self.min_speed <= 1.0) {
            return Err(invalid("proximity min_speed must be in (0, 1]"));
        }
        if !(self.max_speed >= 1.0 && self.max_speed.is_finite()) {
            return Err(invalid("proximity max_speed must be finite and >= 1"));
        }
        Ok(())
    }
}

/// Wheel motion tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub strategy: MotionStrategy,
    /// Per-event multiplier applied to the accumulated velocity.
    pub velocity_decay: f32,
    /// Gap after which accumulated velocity starts from zero again.
    pub velocity_reset_ms: u64,
    pub velocity_divisor: f32,
    pub max_velocity_multiplier: f32,
    /// Fraction of the pending step applied per animation frame.
    pub smoothing: f32,
    /// Fraction of the previous pending step kept when a new event arrives.
    pub carry_over: f32,
    pub shift_boost: f32,
    /// Multiplier while ctrl, alt or meta is held.
    pub fine_modifier: f32,
    /// Idle time before the deferred scene refresh fires.
    pub refresh_delay_ms: u64,
    /// Lifetime of the cached container rectangle.
    pub rect_cache_ms: u64,
    /// Minimum time between proximity raycasts.
    pub raycast_throttle_ms: u64,
    /// Idle time after which a scroll burst counts as settled.
    pub settle_delay_ms: u64,
    pub frame_interval_ms: u64,
    /// Pending step magnitude below which an animation cycle stops.
    pub stop_epsilon: f32,
    pub proximity: ProximityConfig,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            strategy: MotionStrategy::default(),
            velocity_decay: 0.9,
            velocity_reset_ms: 150,
            velocity_divisor: 200.0,
            max_velocity_multiplier: 5.0,
            smoothing: 0.15,
            carry_over: 0.3,
            shift_boost: 3.0,
            fine_modifier: 0.1,
            refresh_delay_ms: 300,
            rect_cache_ms: 100,
            raycast_throttle_ms: 100,
            settle_delay_ms: 50,
            frame_interval_ms: 16,
            stop_epsilon: 0.001,
            proximity: ProximityConfig::default(),
        }
    }
}

impl WheelConfig {
    pub fn momentum() -> Self {
        Self {
            strategy: MotionStrategy::Momentum,
            ..Self::default()
        }
    }

    pub fn instant() -> Self {
        Self {
            strategy: MotionStrategy::Instant,
            ..Self::default()
        }
    }

    pub fn velocity_reset(&self) -> Duration {
        Duration::from_millis(self.velocity_reset_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn rect_cache(&self) -> Duration {
        Duration::from_millis(self.rect_cache_ms)
    }

    pub fn raycast_throttle(&self) -> Duration {
        Duration::from_millis(self.raycast_throttle_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> Result<(), NavError> {
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(invalid("velocity_decay must be in [0, 1]"));
        }
        if !(self.velocity_divisor > 0.0 && self.velocity_divisor.is_finite()) {
            return Err(invalid("velocity_divisor must be finite and positive"));
        }
        if !(self.max_velocity_multiplier >= 1.0 && self.max_velocity_multiplier.is_finite()) {
            return Err(invalid("max_velocity_multiplier must be finite and >= 1"));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(invalid("smoothing must be in (0, 1]"));
        }
        if !(0.0..1.0).contains(&self.carry_over) {
            return Err(invalid("carry_over must be in [0, 1)"));
        }
        if !(self.shift_boost > 0.0 && self.fine_modifier > 0.0) {
            return Err(invalid("modifier multipliers must be positive"));
        }
        if self.frame_interval_ms == 0 {
            return Err(invalid("frame_interval_ms must be non-zero"));
        }
        if !(self.stop_epsilon > 0.0) {
            return Err(invalid("stop_epsilon must be positive"));
        }
        if self.proximity.enabled {
            self.proximity.validate()?;
        }
        Ok(())
    }
}

/// Pivot selection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    /// Pixel distance separating a drag from a click.
    pub drag_threshold: f32,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 10.0,
        }
    }
}

impl PivotConfig {
    pub fn validate(&self) -> Result<(), NavError> {
        if !(self.drag_threshold >= 0.0 && self.drag_threshold.is_finite()) {
            return Err(invalid("drag_threshold must be finite and non-negative"));
        }
        Ok(())
    }
}

/// Complete navigation configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub wheel: WheelConfig,
    pub pivot: PivotConfig,
}

impl NavConfig {
    pub fn from_json_str(json: &str) -> Result<Self, NavError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NavError> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        debug!("Loaded navigation config: {:?}", config.wheel.strategy);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NavError> {
        self.wheel.validate()?;
        self.pivot.validate()
    }
}

fn invalid(message: &str) -> NavError {
    NavError::InvalidConfig(message.to_string())
}
