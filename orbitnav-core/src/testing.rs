//! Test doubles for the host capabilities.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::channel::oneshot;
use glam::{Vec2, Vec3};

use crate::capability::{CameraRig, NavContext, RayFuture, RayResult, SceneQuery, SceneRefresh};
use crate::error::QueryError;
use crate::types::{Hit, Ray, ScreenRect};

/// Camera that records every command it receives.
///
/// Looks down -Z from `position`; NDC x/y tilt the view ray along +X/+Y.
#[derive(Debug)]
pub struct RecordingRig {
    pub position: Vec3,
    pub target: Vec3,
    pub pivots: Vec<Vec3>,
    pub look_ats: Vec<(Vec3, Vec3, bool)>,
}

impl Default for RecordingRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            pivots: Vec::new(),
            look_ats: Vec::new(),
        }
    }
}

impl CameraRig for RecordingRig {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_look_at(&mut self, position: Vec3, target: Vec3, animate: bool) {
        self.position = position;
        self.target = target;
        self.look_ats.push((position, target, animate));
    }

    fn set_pivot(&mut self, pivot: Vec3) {
        self.pivots.push(pivot);
    }

    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        Ray::new(self.position, Vec3::new(ndc.x, ndc.y, -1.0))
    }
}

enum Scripted {
    Ready(RayResult),
    Deferred(oneshot::Receiver<RayResult>),
}

/// Scene that answers queries from a script, falling back to "no hit".
#[derive(Default)]
pub struct ScriptedScene {
    script: VecDeque<Scripted>,
    pub rays: Vec<Ray>,
}

impl ScriptedScene {
    pub fn push_hit(&mut self, point: Vec3, distance: f32) {
        self.script
            .push_back(Scripted::Ready(Ok(Some(Hit::new(point, distance)))));
    }

    pub fn push_miss(&mut self) {
        self.script.push_back(Scripted::Ready(Ok(None)));
    }

    pub fn push_error(&mut self) {
        self.script
            .push_back(Scripted::Ready(Err(QueryError::Failed("backend lost".into()))));
    }

    /// Next query stays pending until the returned sender fires.
    pub fn push_deferred(&mut self) -> oneshot::Sender<RayResult> {
        let (tx, rx) = oneshot::channel();
        self.script.push_back(Scripted::Deferred(rx));
        tx
    }
}

impl SceneQuery for ScriptedScene {
    fn cast_ray(&mut self, ray: Ray) -> RayFuture {
        self.rays.push(ray);
        match self.script.pop_front() {
            Some(Scripted::Ready(result)) => futures::future::ready(result).boxed_local(),
            Some(Scripted::Deferred(rx)) => rx
                .map(|received| received.unwrap_or(Err(QueryError::Cancelled)))
                .boxed_local(),
            None => futures::future::ready(Ok(None)).boxed_local(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RefreshCounter(pub usize);

impl SceneRefresh for RefreshCounter {
    fn refresh(&mut self) {
        self.0 += 1;
    }
}

/// Rig, scene, container and refresh hook in one place.
pub struct Harness {
    pub rig: RecordingRig,
    pub scene: ScriptedScene,
    pub rect: ScreenRect,
    pub refresh: RefreshCounter,
    pub start: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            rig: RecordingRig::default(),
            scene: ScriptedScene::default(),
            rect: ScreenRect::new(0.0, 0.0, 800.0, 600.0),
            refresh: RefreshCounter::default(),
            start: Instant::now(),
        }
    }

    pub fn at(&self, millis: u64) -> Instant {
        self.start + Duration::from_millis(millis)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(400.0, 300.0)
    }

    pub fn ctx(&mut self) -> NavContext<'_> {
        NavContext {
            rig: Some(&mut self.rig),
            scene: &mut self.scene,
            viewport: Some(&self.rect),
            refresh: &mut self.refresh,
        }
    }

    pub fn ctx_without_rig(&mut self) -> NavContext<'_> {
        NavContext {
            rig: None,
            scene: &mut self.scene,
            viewport: Some(&self.rect),
            refresh: &mut self.refresh,
        }
    }
}
