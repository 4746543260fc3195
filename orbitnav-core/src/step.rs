//! Base dolly step size and scene-scale calibration.

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{info, warn};

use crate::error::NavError;
use crate::types::SceneBounds;

/// Step size used until a scene has been calibrated.
pub const DEFAULT_BASE_STEP: f32 = 0.5;

/// Lower bound applied by calibration.
pub const MIN_CALIBRATED_STEP: f32 = 0.5;

/// Fraction of the scene diagonal used as the calibrated step.
pub const DIAGONAL_STEP_RATIO: f32 = 0.02;

/// Shared handle to the base step size.
///
/// Clones observe the same value. Writes reject non-finite and non-positive
/// values, so readers always see a usable step.
#[derive(Debug, Clone)]
pub struct BaseStep {
    bits: Arc<AtomicU32>,
}

impl BaseStep {
    pub fn new(initial: f32) -> Result<Self, NavError> {
        if !is_valid_step(initial) {
            return Err(NavError::InvalidStep(initial));
        }
        Ok(Self {
            bits: Arc::new(AtomicU32::new(initial.to_bits())),
        })
    }

    /// The process-wide instance, initialised to [`DEFAULT_BASE_STEP`].
    pub fn global() -> Self {
        static GLOBAL: OnceLock<BaseStep> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Self {
                bits: Arc::new(AtomicU32::new(DEFAULT_BASE_STEP.to_bits())),
            })
            .clone()
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f32) -> Result<(), NavError> {
        if !is_valid_step(value) {
            warn!("Ignoring invalid base step {value}, keeping {}", self.get());
            return Err(NavError::InvalidStep(value));
        }
        self.bits.store(value.to_bits(), Ordering::Relaxed);
        Ok(())
    }
}

impl Default for BaseStep {
    fn default() -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(DEFAULT_BASE_STEP.to_bits())),
        }
    }
}

fn is_valid_step(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Recalibrate from a scene diagonal: `max(diagonal * 0.02, 0.5)`.
///
/// Non-finite or non-positive diagonals leave the current value untouched.
#[tracing::instrument(skip(step))]
pub fn calibrate_from_diagonal(step: &BaseStep, diagonal: f32) -> Result<f32, NavError> {
    if !diagonal.is_finite() || diagonal <= 0.0 {
        warn!("Scene diagonal {diagonal} rejected, base step stays {}", step.get());
        return Err(NavError::InvalidCalibration { diagonal });
    }

    let value = (diagonal * DIAGONAL_STEP_RATIO).max(MIN_CALIBRATED_STEP);
    step.set(value)?;
    info!("Base step calibrated to {value} (diagonal {diagonal})");
    Ok(value)
}

/// Recalibrate from the bounds of a freshly loaded scene.
pub fn calibrate_base_step(step: &BaseStep, bounds: &SceneBounds) -> Result<f32, NavError> {
    calibrate_from_diagonal(step, bounds.diagonal())
}
