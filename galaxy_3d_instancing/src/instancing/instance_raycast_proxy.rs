/// Per-proxy hit test against one slot of an InstanceCollection.
///
/// The collection draws every instance as one object, so a hit must be
/// rebuilt per slot: the slot's packed matrix is re-expanded to world
/// space and handed to the plain mesh intersection routine, then the
/// hits are attributed back to the proxy.

use crate::raycast::{intersect_mesh, Intersection, Raycaster};
use super::collection::InstancedCollection;
use super::instance_collection::InstanceCollection;
use super::proxy::ProxyKey;

pub struct InstanceRaycastProxy<'a> {
    collection: &'a InstanceCollection,
    proxy: ProxyKey,
}

impl<'a> InstanceRaycastProxy<'a> {
    pub fn new(collection: &'a InstanceCollection, proxy: ProxyKey) -> Self {
        Self { collection, proxy }
    }

    pub fn proxy(&self) -> ProxyKey {
        self.proxy
    }

    /// Append the proxy's hits to `out`, returning how many were added.
    ///
    /// Yields nothing when the proxy is not subscribed, its slot is not
    /// drawn this frame, or the collection lacks geometry or material.
    pub fn raycast(&self, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize {
        let (Some(geometry), Some(material)) = (self.collection.geometry(), self.collection.material()) else {
            return 0;
        };
        let Some(slot) = self.collection.active_slot_of(self.proxy) else {
            return 0;
        };
        let Some(local) = self.collection.slot_matrix(slot) else {
            return 0;
        };

        let world = *self.collection.world_matrix() * local;
        let start = out.len();
        intersect_mesh(geometry, &world, material, raycaster, out);

        for hit in &mut out[start..] {
            hit.instance_index = Some(slot);
            hit.object = Some(self.proxy);
        }
        out.len() - start
    }
}
