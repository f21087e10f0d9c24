/// Hit records produced by raycasts.

use glam::Vec3;
use crate::instancing::ProxyKey;

/// Triangle that was hit (vertex indices into the geometry + world normal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    /// Unit geometric normal in world space (counter-clockwise winding)
    pub normal: Vec3,
}

/// A single ray hit.
///
/// Mesh hits carry `face`/`face_index`/`instance_index`; point hits carry
/// `index` and `distance_to_ray`. `object` is the proxy the hit is
/// attributed to; slot indices are only meaningful for the frame they
/// were produced in.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// Distance from the ray origin to `point`, in world units
    pub distance: f32,
    /// Distance between the ray and the point-sprite center (points only)
    pub distance_to_ray: Option<f32>,
    /// Hit position in world space
    pub point: Vec3,
    pub face: Option<Face>,
    pub face_index: Option<u32>,
    /// Slot of a point-sprite hit
    pub index: Option<u32>,
    /// Slot of a mesh-instance hit
    pub instance_index: Option<u32>,
    pub object: Option<ProxyKey>,
}

impl Intersection {
    /// Bare hit at `point`, no attribution yet
    pub fn new(distance: f32, point: Vec3) -> Self {
        Self {
            distance,
            distance_to_ray: None,
            point,
            face: None,
            face_index: None,
            index: None,
            instance_index: None,
            object: None,
        }
    }
}

/// Sort hits nearest first.
pub fn sort_by_distance(hits: &mut [Intersection]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
