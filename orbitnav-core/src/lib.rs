//! Orbitnav Core
//!
//! Input-to-camera controllers for interactive 3D viewers: distance-aware
//! wheel dolly and automatic pivot selection. This crate is windowing- and
//! GPU-agnostic; the scene, the camera rig and the container element are
//! reached through the traits in [`capability`].

pub mod capability;
pub mod config;
pub mod error;
pub mod pivot;
pub mod proximity;
pub mod query;
pub mod schedule;
pub mod step;
pub mod types;
pub mod wheel;

#[cfg(test)]
pub(crate) mod testing;

pub use capability::{
    CameraRig, NavContext, NoRefresh, RayFuture, RayResult, SceneQuery, SceneRefresh, Viewport,
};
pub use config::{MotionStrategy, NavConfig, PivotConfig, ProximityConfig, WheelConfig};
pub use error::{NavError, QueryError};
pub use pivot::{GesturePhase, PivotController, PointerButton, set_pivot_at};
pub use proximity::speed_factor;
pub use step::{BaseStep, calibrate_base_step, calibrate_from_diagonal};
pub use types::{Hit, Modifiers, Ray, SceneBounds, ScreenRect};
pub use wheel::{WheelController, WheelInput};
