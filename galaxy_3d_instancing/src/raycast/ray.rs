/// Ray primitive and its intersection queries.
///
/// All queries work in whatever space the ray is expressed in; use
/// `transformed` to move a world ray into an object's local space.

use glam::{Mat4, Vec3};
use crate::math::{AABB, Sphere};

/// Parametric ray `origin + t * direction`, `t >= 0`.
///
/// The direction is normalized on construction. A ray transformed by a
/// scaling matrix is renormalized, so `t` always measures distance in the
/// ray's own space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    /// Point at parameter `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray expressed in another space (e.g. world → local with an inverse world matrix)
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }

    /// Point of the ray closest to `point` (clamped to the origin).
    pub fn closest_point_to_point(&self, point: Vec3) -> Vec3 {
        let t = (point - self.origin).dot(self.direction).max(0.0);
        self.at(t)
    }

    /// Squared distance between the ray and `point`.
    pub fn distance_sq_to_point(&self, point: Vec3) -> f32 {
        self.closest_point_to_point(point).distance_squared(point)
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.distance_sq_to_point(sphere.center) <= sphere.radius * sphere.radius
    }

    /// Slab test. Returns the entry distance (0 when the origin is inside).
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        let inv = self.direction.recip();
        let t1 = (aabb.min - self.origin) * inv;
        let t2 = (aabb.max - self.origin) * inv;

        // NaN from 0 * inf (origin on a slab plane, axis-parallel ray) is
        // dropped by f32::min/max, which keeps the test conservative.
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_far < 0.0 || t_near > t_far {
            return None;
        }
        Some(t_near.max(0.0))
    }

    /// Möller–Trumbore ray/triangle test.
    ///
    /// Triangles are front-facing when `(b - a) × (c - a)` points toward the
    /// ray origin. With `cull_back` set, back faces never hit. Returns the
    /// ray parameter of the hit.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3, cull_back: bool) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);

        if cull_back {
            if det < EPSILON {
                return None;
            }
        } else if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        if t < 0.0 {
            return None;
        }
        Some(t)
    }
}

#[cfg(test)]
#[path = "ray_tests.rs"]
mod tests;
