//! Core value types shared by the controllers and their capabilities.
//!
//! These are plain CPU-side values; nothing here knows about a window system
//! or a renderer.

use glam::{Vec2, Vec3};

/// A world-space ray with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin in world space.
    pub origin: Vec3,
    /// Normalized direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest intersection reported by a scene query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Intersection point in world space.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

impl Hit {
    pub fn new(point: Vec3, distance: f32) -> Self {
        Self { point, distance }
    }
}

/// Screen-space bounding rectangle of the viewer container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the rectangle can be used for coordinate conversion.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Convert a pixel position to normalized device coordinates.
    ///
    /// X grows to the right and Y grows upwards, both in `[-1, 1]` inside the
    /// rectangle. Returns `None` for an empty rectangle.
    pub fn to_ndc(&self, screen: Vec2) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        let x = (screen.x - self.left) / self.width * 2.0 - 1.0;
        let y = -((screen.y - self.top) / self.height * 2.0 - 1.0);
        Some(Vec2::new(x, y))
    }
}

/// Keyboard modifiers held while an input event was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Any of the fine-control modifiers (ctrl, alt or meta).
    pub fn fine(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Scene bounds computed from primitive positions.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius: f32,
}

impl SceneBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            center: (min + max) * 0.5,
            radius: (max - min).length().max(1.0),
        }
    }

    pub fn from_positions(positions: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut count = 0;

        for pos in positions {
            min = min.min(pos);
            max = max.max(pos);
            count += 1;
        }

        if count == 0 {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
                center: Vec3::ZERO,
                radius: 1.0,
            };
        }

        Self::new(min, max)
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }

    /// Slab test against the box. Returns the entry distance, or the exit
    /// distance when the origin is inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv = Vec3::new(
            if ray.direction.x != 0.0 { 1.0 / ray.direction.x } else { f32::INFINITY },
            if ray.direction.y != 0.0 { 1.0 / ray.direction.y } else { f32::INFINITY },
            if ray.direction.z != 0.0 { 1.0 / ray.direction.z } else { f32::INFINITY },
        );

        let t1 = (self.min - ray.origin) * inv;
        let t2 = (self.max - ray.origin) * inv;
        let tmin = t1.min(t2).max_element();
        let tmax = t1.max(t2).min_element();

        if tmax < 0.0 || tmin > tmax {
            return None;
        }
        Some(if tmin >= 0.0 { tmin } else { tmax })
    }
}
