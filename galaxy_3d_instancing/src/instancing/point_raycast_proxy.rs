/// Per-proxy hit test against one point sprite.
///
/// A point is hit when the ray passes within `point_threshold` world
/// units of it. The test runs in collection space, so the threshold is
/// divided by the collection's average scale.

use crate::math::average_matrix_scale;
use crate::raycast::{Intersection, Raycaster};
use super::collection::InstancedCollection;
use super::point_collection::PointCollection;
use super::proxy::ProxyKey;

pub struct PointRaycastProxy<'a> {
    collection: &'a PointCollection,
    proxy: ProxyKey,
}

impl<'a> PointRaycastProxy<'a> {
    pub fn new(collection: &'a PointCollection, proxy: ProxyKey) -> Self {
        Self { collection, proxy }
    }

    pub fn proxy(&self) -> ProxyKey {
        self.proxy
    }

    /// Append at most one hit to `out`, returning how many were added.
    pub fn raycast(&self, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize {
        if self.collection.material().is_none() {
            return 0;
        }
        let Some(slot) = self.collection.active_slot_of(self.proxy) else {
            return 0;
        };
        let Some(sphere) = self.collection.bounding_sphere() else {
            return 0;
        };

        let world = self.collection.world_matrix();
        let threshold = raycaster.point_threshold;

        let world_sphere = sphere.transformed(world).expanded(threshold);
        if !raycaster.ray.intersects_sphere(&world_sphere) {
            return 0;
        }

        if world.determinant() == 0.0 {
            return 0;
        }
        let local_ray = raycaster.ray.transformed(&world.inverse());
        let local_threshold = threshold / average_matrix_scale(world);

        let Some(position) = self.collection.slot_position(slot) else {
            return 0;
        };
        let distance_sq = local_ray.distance_sq_to_point(position);
        if distance_sq >= local_threshold * local_threshold {
            return 0;
        }

        let point = world.transform_point3(local_ray.closest_point_to_point(position));
        let distance = raycaster.ray.origin.distance(point);
        if !raycaster.accepts(distance) {
            return 0;
        }

        out.push(Intersection {
            distance_to_ray: Some(distance_sq.sqrt()),
            index: Some(slot),
            object: Some(self.proxy),
            ..Intersection::new(distance, point)
        });
        1
    }
}
