use glam::{Mat4, Quat, Vec2, Vec3};
use orbitnav_core::{CameraRig, Ray};
use tracing::trace;

/// Camera pose: eye position and look-at target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// View matrix with +Y as the world up axis.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        let mut right = forward.cross(Vec3::Y).normalize_or_zero();
        if right == Vec3::ZERO {
            right = forward.cross(Vec3::Z).normalize_or_zero();
        }
        let up = right.cross(forward).normalize_or_zero();
        Mat4::look_to_rh(self.position, forward, up)
    }

    fn lerp(&self, goal: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(goal.position, t),
            target: self.target.lerp(goal.target, t),
        }
    }
}

/// Projection matrix configuration.
#[derive(Debug, Clone)]
pub struct Projection {
    width: u32,
    height: u32,
    fov: f32,
    near: f32,
    far: f32,
}

impl Projection {
    /// Create a new projection. `fov` is the vertical field of view in radians.
    pub fn new(width: u32, height: u32, fov: f32, near: f32, far: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            fov,
            near,
            far,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Get the projection matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect(), self.near, self.far)
    }

    /// Update the projection size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Set the far plane distance.
    pub fn set_far(&mut self, far: f32) {
        self.far = far;
    }

    pub fn far(&self) -> f32 {
        self.far
    }
}

/// Orbit camera rig used by the viewer.
///
/// Commands issued with `animate` set a goal pose that [`OrbitRig::update`]
/// eases towards. [`CameraRig::position`] and [`CameraRig::target`] report
/// the goal, so consecutive animated steps accumulate instead of being
/// measured from a half-finished transition.
#[derive(Debug, Clone)]
pub struct OrbitRig {
    pose: CameraPose,
    goal: Option<CameraPose>,
    pivot: Vec3,
    projection: Projection,
    /// Transition rate per second.
    ease_rate: f32,
}

const SNAP_DISTANCE: f32 = 1e-4;
const PITCH_LIMIT: f32 = 0.99;

impl OrbitRig {
    pub fn new(position: Vec3, target: Vec3, projection: Projection) -> Self {
        Self {
            pose: CameraPose::new(position, target),
            goal: None,
            pivot: target,
            projection,
            ease_rate: 12.0,
        }
    }

    pub fn with_ease_rate(mut self, rate: f32) -> Self {
        self.ease_rate = rate.max(0.0);
        self
    }

    /// Pose currently shown.
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Pose the rig is heading to.
    pub fn goal(&self) -> CameraPose {
        self.goal.unwrap_or(self.pose)
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    pub fn is_animating(&self) -> bool {
        self.goal.is_some()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection.matrix() * self.pose.view_matrix()
    }

    /// Ease the shown pose towards the goal.
    pub fn update(&mut self, dt: f32) {
        let Some(goal) = self.goal else {
            return;
        };
        let t = 1.0 - (-self.ease_rate * dt.max(0.0)).exp();
        self.pose = self.pose.lerp(&goal, t);

        let done = self.pose.position.distance(goal.position) < SNAP_DISTANCE
            && self.pose.target.distance(goal.target) < SNAP_DISTANCE;
        if done {
            self.pose = goal;
            self.goal = None;
            trace!("Camera transition finished");
        }
    }

    /// Rotate the camera around the pivot. `delta` is a pointer movement in
    /// pixels.
    pub fn orbit(&mut self, delta: Vec2, sensitivity: f32) {
        let pose = self.goal();
        let yaw = Quat::from_axis_angle(Vec3::Y, -delta.x * sensitivity);
        let right = pose.forward().cross(Vec3::Y).normalize_or_zero();
        let pitch = if right == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(right, -delta.y * sensitivity)
        };

        let mut rotation = yaw * pitch;
        let forward = rotation * pose.forward();
        if forward.y.abs() > PITCH_LIMIT {
            rotation = yaw;
        }

        let pivot = self.pivot;
        let orbited = CameraPose::new(
            pivot + rotation * (pose.position - pivot),
            pivot + rotation * (pose.target - pivot),
        );
        self.pose = orbited;
        self.goal = None;
    }
}

impl CameraRig for OrbitRig {
    fn position(&self) -> Vec3 {
        self.goal().position
    }

    fn target(&self) -> Vec3 {
        self.goal().target
    }

    fn set_look_at(&mut self, position: Vec3, target: Vec3, animate: bool) {
        let pose = CameraPose::new(position, target);
        if animate && self.ease_rate > 0.0 {
            self.goal = Some(pose);
        } else {
            self.pose = pose;
            self.goal = None;
        }
    }

    fn set_pivot(&mut self, pivot: Vec3) {
        self.pivot = pivot;
    }

    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let inverse = self.view_proj().inverse();
        if !inverse.is_finite() {
            return None;
        }
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(self.pose.position, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> OrbitRig {
        OrbitRig::new(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Projection::new(800, 600, std::f32::consts::FRAC_PI_3, 0.1, 1000.0),
        )
    }

    #[test]
    fn test_center_ray_looks_at_target() {
        let ray = rig().ray_from_ndc(Vec2::ZERO).unwrap();
        assert!((ray.origin - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_edge_rays_tilt_towards_ndc() {
        let rig = rig();
        let right = rig.ray_from_ndc(Vec2::new(1.0, 0.0)).unwrap();
        let up = rig.ray_from_ndc(Vec2::new(0.0, 1.0)).unwrap();
        assert!(right.direction.x > 0.1);
        assert!(up.direction.y > 0.1);
        // half the vertical field of view
        let angle = up.direction.angle_between(Vec3::NEG_Z);
        assert!((angle - std::f32::consts::FRAC_PI_6).abs() < 1e-3);
    }

    #[test]
    fn test_animated_look_at_eases_to_goal() {
        let mut rig = rig();
        let goal = Vec3::new(0.0, 0.0, 5.0);
        rig.set_look_at(goal, Vec3::new(0.0, 0.0, -5.0), true);

        assert!(rig.is_animating());
        assert_eq!(rig.position(), goal);
        assert_eq!(rig.pose().position, Vec3::new(0.0, 0.0, 10.0));

        rig.update(1.0 / 60.0);
        let z = rig.pose().position.z;
        assert!(z < 10.0 && z > 5.0);

        for _ in 0..600 {
            rig.update(1.0 / 60.0);
        }
        assert!(!rig.is_animating());
        assert_eq!(rig.pose().position, goal);
    }

    #[test]
    fn test_immediate_look_at_jumps() {
        let mut rig = rig();
        rig.set_look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, false);
        assert!(!rig.is_animating());
        assert_eq!(rig.pose().position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_orbit_keeps_distance_to_pivot() {
        let mut rig = rig();
        let pivot = Vec3::new(2.0, 0.0, 0.0);
        rig.set_pivot(pivot);
        let before = rig.pose().position.distance(pivot);

        rig.orbit(Vec2::new(120.0, -40.0), 0.005);
        let after = rig.pose().position.distance(pivot);
        assert!((before - after).abs() < 1e-4);
        assert_ne!(rig.pose().position, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_orbit_does_not_flip_over_pole() {
        let mut rig = rig();
        for _ in 0..50 {
            rig.orbit(Vec2::new(0.0, 200.0), 0.01);
        }
        assert!(rig.pose().forward().y.abs() <= PITCH_LIMIT + 1e-4);
    }
}
