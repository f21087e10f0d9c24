/// Bounding volumes for hit-test rejection and host-side culling.
///
/// Both volumes are stored in local space and transformed by a world
/// matrix at query time.

use glam::{Mat4, Vec3};
use super::transform::max_matrix_scale;

// ===== AABB =====

/// Axis-Aligned Bounding Box in local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Smallest box enclosing all points. `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<AABB> {
        let first = *points.first()?;
        let (min, max) = points.iter().fold((first, first), |(min, max), p| {
            (min.min(*p), max.max(*p))
        });
        Some(AABB { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Transform this local-space AABB by a matrix, returning a new AABB.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the AABB extents
    /// for an exact (tight) result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Test if this AABB fully contains another AABB.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Test if this AABB contains a point (boundary included).
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

// ===== SPHERE =====

/// Bounding sphere (center + radius)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere centered on the points' AABB, radius from the farthest point.
    pub fn from_points(points: &[Vec3]) -> Option<Sphere> {
        let center = AABB::from_points(points)?.center();
        let radius_sq = points.iter()
            .map(|p| center.distance_squared(*p))
            .fold(0.0_f32, f32::max);
        Some(Sphere { center, radius: radius_sq.sqrt() })
    }

    /// Transform into another space. Non-uniform scale grows the radius
    /// by the largest axis so the result still encloses the volume.
    pub fn transformed(&self, matrix: &Mat4) -> Sphere {
        Sphere {
            center: matrix.transform_point3(self.center),
            radius: self.radius * max_matrix_scale(matrix),
        }
    }

    pub fn expanded(&self, amount: f32) -> Sphere {
        Sphere { center: self.center, radius: self.radius + amount }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
