/// Single-object triangle hit test.
///
/// Tests one (geometry, world matrix, material) triple. The instancing
/// proxies call this with a world matrix rebuilt from the packed buffer,
/// so it never needs to know about collections or slots.

use glam::{Mat3, Mat4};
use crate::resource::{Geometry, Material, Side};
use super::intersection::{Face, Intersection};
use super::raycaster::Raycaster;

/// Append every hit of `raycaster` against the geometry placed at
/// `world_matrix` to `out`. Returns the number of hits appended.
///
/// Rejection order: world bounding sphere, then local bounding box,
/// then per-triangle tests honoring the material side. Hits outside
/// `[near, far]` are dropped.
pub fn intersect_mesh(
    geometry: &Geometry,
    world_matrix: &Mat4,
    material: &Material,
    raycaster: &Raycaster,
    out: &mut Vec<Intersection>,
) -> usize {
    let world_sphere = geometry.bounding_sphere().transformed(world_matrix);
    if !raycaster.ray.intersects_sphere(&world_sphere) {
        return 0;
    }

    // Zero scale on any axis: nothing is drawn, nothing can be hit
    if world_matrix.determinant() == 0.0 {
        return 0;
    }
    let inverse = world_matrix.inverse();
    let local_ray = raycaster.ray.transformed(&inverse);
    if local_ray.intersect_aabb(geometry.bounding_box()).is_none() {
        return 0;
    }

    let normal_matrix = Mat3::from_mat4(inverse).transpose();
    let before = out.len();

    for face_index in 0..geometry.triangle_count() {
        let (Some([ia, ib, ic]), Some([a, b, c])) = (
            geometry.triangle(face_index),
            geometry.triangle_positions(face_index),
        ) else {
            continue;
        };

        let t = match material.side() {
            Side::Front => local_ray.intersect_triangle(a, b, c, true),
            Side::Back => local_ray.intersect_triangle(a, c, b, true),
            Side::Double => local_ray.intersect_triangle(a, b, c, false),
        };
        let Some(t) = t else {
            continue;
        };

        let point = world_matrix.transform_point3(local_ray.at(t));
        let distance = raycaster.ray.origin.distance(point);
        if !raycaster.accepts(distance) {
            continue;
        }

        let normal = (normal_matrix * (b - a).cross(c - a)).normalize_or_zero();
        out.push(Intersection {
            face: Some(Face { a: ia, b: ib, c: ic, normal }),
            face_index: Some(face_index as u32),
            ..Intersection::new(distance, point)
        });
    }

    out.len() - before
}

#[cfg(test)]
#[path = "mesh_intersect_tests.rs"]
mod tests;
