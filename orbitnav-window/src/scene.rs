use futures::FutureExt;
use futures::future::ready;
use glam::Vec3;
use orbitnav_core::{Hit, Ray, RayFuture, SceneBounds, SceneQuery};
use tracing::trace;

const EPSILON: f32 = 1e-7;

/// A triangle primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex position.
    pub v0: Vec3,
    /// Second vertex position.
    pub v1: Vec3,
    /// Third vertex position.
    pub v2: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the center (centroid) of the triangle.
    pub fn center(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Compute the normal of the triangle (not normalized).
    pub fn normal(&self) -> Vec3 {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(e2)
    }

    /// Möller–Trumbore intersection. Both faces count; returns the distance
    /// along the ray.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        let p = ray.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(e1);
        let v = ray.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

/// Ray-pickable triangle soup used by the viewer.
///
/// Queries resolve synchronously, so the returned futures are ready on the
/// first poll.
#[derive(Debug, Clone, Default)]
pub struct TriangleScene {
    triangles: Vec<Triangle>,
    bounds: Option<SceneBounds>,
}

impl TriangleScene {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let mut scene = Self {
            triangles,
            bounds: None,
        };
        scene.update_bounds();
        scene
    }

    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
        self.update_bounds();
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounds of every vertex, `None` for an empty scene.
    pub fn bounds(&self) -> Option<&SceneBounds> {
        self.bounds.as_ref()
    }

    /// Nearest hit along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        let bounds = self.bounds.as_ref()?;
        bounds.intersect_ray(ray)?;

        self.triangles
            .iter()
            .filter_map(|tri| tri.intersect(ray))
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| Hit::new(ray.at(t), t))
    }

    fn update_bounds(&mut self) {
        self.bounds = if self.triangles.is_empty() {
            None
        } else {
            Some(SceneBounds::from_positions(
                self.triangles.iter().flat_map(|t| [t.v0, t.v1, t.v2]),
            ))
        };
    }
}

impl SceneQuery for TriangleScene {
    fn cast_ray(&mut self, ray: Ray) -> RayFuture {
        let hit = self.intersect(&ray);
        trace!("Scene query {:?} -> {:?}", ray, hit);
        ready(Ok(hit)).boxed_local()
    }
}
