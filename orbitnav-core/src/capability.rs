//! Narrow interfaces onto the host viewer.
//!
//! The controllers never own the scene, the camera rig or the container
//! element. They borrow them through these traits for the duration of a
//! single handler call, bundled in a [`NavContext`].

use futures::future::LocalBoxFuture;
use glam::{Vec2, Vec3};

use crate::error::QueryError;
use crate::types::{Hit, Ray, ScreenRect};

/// Outcome of a scene intersection query.
pub type RayResult = Result<Option<Hit>, QueryError>;

/// Pending scene intersection query.
pub type RayFuture = LocalBoxFuture<'static, RayResult>;

/// Ray intersection against the currently visible scene geometry.
pub trait SceneQuery {
    /// Start an intersection query. The returned future must not borrow the
    /// scene; it resolves to the nearest hit, if any.
    fn cast_ray(&mut self, ray: Ray) -> RayFuture;
}

/// Look-at style camera commands exposed by the host's camera rig.
pub trait CameraRig {
    /// Current camera position.
    fn position(&self) -> Vec3;

    /// Current look-at target.
    fn target(&self) -> Vec3;

    /// Move the camera. With `animate` the rig may interpolate towards the
    /// new pose instead of jumping.
    fn set_look_at(&mut self, position: Vec3, target: Vec3, animate: bool);

    /// Set the point the rig rotates around.
    fn set_pivot(&mut self, pivot: Vec3);

    /// World-space view ray through a point in normalized device coordinates.
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray>;
}

/// The element hosting the viewer.
pub trait Viewport {
    /// Screen-space bounds in pixels. `None` while unmounted.
    fn bounding_rect(&self) -> Option<ScreenRect>;
}

impl Viewport for ScreenRect {
    fn bounding_rect(&self) -> Option<ScreenRect> {
        Some(*self)
    }
}

/// Hook telling the host to apply deferred incremental scene updates.
pub trait SceneRefresh {
    fn refresh(&mut self);
}

impl<F: FnMut()> SceneRefresh for F {
    fn refresh(&mut self) {
        self()
    }
}

/// Refresh hook for hosts that have nothing to defer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRefresh;

impl SceneRefresh for NoRefresh {
    fn refresh(&mut self) {}
}

/// Borrowed host capabilities handed to every controller call.
pub struct NavContext<'a> {
    pub rig: Option<&'a mut dyn CameraRig>,
    pub scene: &'a mut dyn SceneQuery,
    pub viewport: Option<&'a dyn Viewport>,
    pub refresh: &'a mut dyn SceneRefresh,
}

impl<'a> NavContext<'a> {
    pub fn new(
        rig: &'a mut dyn CameraRig,
        scene: &'a mut dyn SceneQuery,
        viewport: &'a dyn Viewport,
        refresh: &'a mut dyn SceneRefresh,
    ) -> Self {
        Self {
            rig: Some(rig),
            scene,
            viewport: Some(viewport),
            refresh,
        }
    }

    /// View ray through a pixel position, if the rig and viewport are ready.
    pub fn ray_at(&self, screen: Vec2) -> Option<Ray> {
        let rect = self.viewport?.bounding_rect()?;
        let ndc = rect.to_ndc(screen)?;
        self.rig.as_deref()?.ray_from_ndc(ndc)
    }
}
