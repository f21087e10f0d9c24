/// Raycaster: a ray plus the parameters every hit test shares.

use glam::{Vec2, Vec3};
use crate::camera::Camera;
use super::ray::Ray;

/// World-space ray with a valid distance window and the point-sprite
/// pick radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raycaster {
    pub ray: Ray,
    /// Hits closer than this are discarded
    pub near: f32,
    /// Hits farther than this are discarded
    pub far: f32,
    /// Pick radius of a point sprite, in world units
    pub point_threshold: f32,
}

impl Raycaster {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            ray: Ray::new(origin, direction),
            near: 0.0,
            far: f32::INFINITY,
            point_threshold: 1.0,
        }
    }

    pub fn with_near_far(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_point_threshold(mut self, threshold: f32) -> Self {
        self.point_threshold = threshold;
        self
    }

    /// Point the ray through a pointer position.
    ///
    /// `ndc` is in normalized device coordinates (x, y in [-1, 1], +y up).
    /// Depth is assumed to be in [0, 1] (glam `*_rh` projections), so the
    /// ray starts on the near plane and heads toward the far plane.
    pub fn set_from_camera(&mut self, ndc: Vec2, camera: &Camera) {
        let inverse = camera.view_projection_matrix().inverse();
        let near_point = inverse.project_point3(ndc.extend(0.0));
        let far_point = inverse.project_point3(ndc.extend(1.0));
        self.ray = Ray::new(near_point, far_point - near_point);
    }

    /// True when a hit at `distance` falls inside `[near, far]`
    pub fn accepts(&self, distance: f32) -> bool {
        distance >= self.near && distance <= self.far
    }
}

impl From<Ray> for Raycaster {
    fn from(ray: Ray) -> Self {
        Self::new(ray.origin, ray.direction)
    }
}
