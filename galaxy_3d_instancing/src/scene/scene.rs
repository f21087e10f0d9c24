/// Scene: owns every proxy and collection and drives the frame.
///
/// Proxies and collections live in two SlotMaps, so keys stay valid
/// across unrelated removals and a key to a removed entry simply stops
/// resolving. A proxy refers to its collection by key only; destroying
/// the collection leaves the proxy alive but unable to draw or be hit.
///
/// Per frame, the host mutates proxies, calls `tick()` (world matrices,
/// then every collection's synchronize), uploads the dirty buffer ranges
/// and draws each collection's `active_count()` instances.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::error::{Error, Result};
use crate::instancing::{
    Collection, CollectionKey, InstanceCollection, InstanceCollectionDesc, InstancedCollection,
    PointCollection, PointCollectionDesc, ProxyHandle, ProxyKey, SyncReport,
};
use crate::math::{Color, Transform, AABB};
use crate::raycast::{sort_by_distance, Intersection, Raycaster};
use crate::resource::{Geometry, Material};
use crate::{engine_debug, engine_error};

const SOURCE: &str = "galaxy3d::Scene";

#[derive(Default)]
pub struct Scene {
    proxies: SlotMap<ProxyKey, ProxyHandle>,
    collections: SlotMap<CollectionKey, Collection>,
    /// Proxies whose world matrix must be recomputed at the next tick
    dirty_proxies: FxHashSet<ProxyKey>,
    /// Reports of the last tick, reused across frames
    last_reports: Vec<(CollectionKey, SyncReport)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== COLLECTIONS =====

    /// Create a mesh collection
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfiguration` when the descriptor's limit/range are invalid.
    pub fn create_instance_collection(&mut self, desc: InstanceCollectionDesc) -> Result<CollectionKey> {
        let collection = InstanceCollection::from_desc(desc)?;
        Ok(self.collections.insert(collection.into()))
    }

    /// Create a point-sprite collection
    pub fn create_point_collection(&mut self, desc: PointCollectionDesc) -> Result<CollectionKey> {
        let collection = PointCollection::from_desc(desc)?;
        Ok(self.collections.insert(collection.into()))
    }

    /// Destroy a collection and release its buffers.
    ///
    /// Subscribed proxies are kept; their collection key no longer
    /// resolves. Returns false if the key is invalid.
    pub fn destroy_collection(&mut self, key: CollectionKey) -> bool {
        match self.collections.remove(key) {
            Some(mut collection) => {
                collection.as_dyn_mut().destroy();
                true
            }
            None => false,
        }
    }

    pub fn collection(&self, key: CollectionKey) -> Option<&Collection> {
        self.collections.get(key)
    }

    pub fn collection_mut(&mut self, key: CollectionKey) -> Option<&mut Collection> {
        self.collections.get_mut(key)
    }

    pub fn instance_collection(&self, key: CollectionKey) -> Option<&InstanceCollection> {
        self.collections.get(key).and_then(Collection::as_mesh)
    }

    pub fn point_collection(&self, key: CollectionKey) -> Option<&PointCollection> {
        self.collections.get(key).and_then(Collection::as_points)
    }

    pub fn collection_keys(&self) -> impl Iterator<Item = CollectionKey> + '_ {
        self.collections.keys()
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    pub fn set_collection_world_matrix(&mut self, key: CollectionKey, matrix: Mat4) -> bool {
        match self.collections.get_mut(key) {
            Some(collection) => {
                collection.as_dyn_mut().set_world_matrix(matrix);
                true
            }
            None => false,
        }
    }

    /// Change a collection's draw cap (`None` = up to limit)
    pub fn set_range(&mut self, key: CollectionKey, range: Option<usize>) -> Result<()> {
        let collection = self.collections.get_mut(key)
            .ok_or_else(|| invalid_key(format!("Unknown collection {:?}", key)))?;
        collection.as_dyn_mut().set_range(range)
    }

    /// Swap the geometry of a mesh collection. False for point collections.
    pub fn set_geometry(&mut self, key: CollectionKey, geometry: Option<Arc<Geometry>>) -> bool {
        match self.collections.get_mut(key).and_then(Collection::as_mesh_mut) {
            Some(collection) => {
                collection.set_geometry(geometry);
                true
            }
            None => false,
        }
    }

    pub fn set_material(&mut self, key: CollectionKey, material: Option<Arc<Material>>) -> bool {
        match self.collections.get_mut(key) {
            Some(Collection::Mesh(collection)) => collection.set_material(material),
            Some(Collection::Points(collection)) => collection.set_material(material),
            None => return false,
        }
        true
    }

    // ===== PROXIES =====

    /// Create a proxy and subscribe it to a mesh collection.
    ///
    /// # Errors
    ///
    /// `Error::InvalidKey` if the collection does not exist or holds
    /// point sprites.
    pub fn create_proxy(&mut self, collection: CollectionKey, transform: Transform, color: Color) -> Result<ProxyKey> {
        match self.collections.get(collection) {
            Some(Collection::Mesh(_)) => {}
            Some(Collection::Points(_)) => {
                return Err(invalid_key(format!("Collection {:?} holds point sprites", collection)));
            }
            None => return Err(invalid_key(format!("Unknown collection {:?}", collection))),
        }
        self.insert_proxy(collection, ProxyHandle::new(transform, color))
    }

    /// Create a point proxy and subscribe it to a point collection.
    pub fn create_point_proxy(
        &mut self,
        collection: CollectionKey,
        position: Vec3,
        color: Color,
        size: f32,
    ) -> Result<ProxyKey> {
        match self.collections.get(collection) {
            Some(Collection::Points(_)) => {}
            Some(Collection::Mesh(_)) => {
                return Err(invalid_key(format!("Collection {:?} holds meshes", collection)));
            }
            None => return Err(invalid_key(format!("Unknown collection {:?}", collection))),
        }
        self.insert_proxy(collection, ProxyHandle::point(position, color, size))
    }

    fn insert_proxy(&mut self, collection: CollectionKey, mut handle: ProxyHandle) -> Result<ProxyKey> {
        handle.update_world_matrix();
        let key = self.proxies.insert(handle);

        let subscribed = self.collections.get_mut(collection)
            .ok_or_else(|| invalid_key(format!("Unknown collection {:?}", collection)))
            .and_then(|c| c.as_dyn_mut().subscribe(key));

        match subscribed {
            Ok(subscription) => {
                self.proxies[key].attach(collection, subscription);
                Ok(key)
            }
            Err(err) => {
                self.proxies.remove(key);
                Err(err)
            }
        }
    }

    /// Remove a proxy and unsubscribe it. Returns false if the key is invalid.
    pub fn destroy_proxy(&mut self, key: ProxyKey) -> bool {
        let Some(mut proxy) = self.proxies.remove(key) else {
            return false;
        };
        self.dirty_proxies.remove(&key);
        if let Some((collection, subscription)) = proxy.detach() {
            if let Some(collection) = self.collections.get_mut(collection) {
                collection.as_dyn_mut().unsubscribe(subscription);
            }
        }
        true
    }

    /// Move a proxy to another collection.
    ///
    /// The proxy takes the last slot of the new collection at the next tick.
    pub fn move_proxy(&mut self, key: ProxyKey, target: CollectionKey) -> Result<()> {
        let proxy = self.proxies.get(key)
            .ok_or_else(|| invalid_key(format!("Unknown proxy {:?}", key)))?;
        if proxy.collection() == Some(target) {
            return Ok(());
        }

        let subscription = self.collections.get_mut(target)
            .ok_or_else(|| invalid_key(format!("Unknown collection {:?}", target)))?
            .as_dyn_mut()
            .subscribe(key)?;

        if let Some((previous, old_subscription)) = self.proxies[key].detach() {
            if let Some(collection) = self.collections.get_mut(previous) {
                collection.as_dyn_mut().unsubscribe(old_subscription);
            }
        }
        self.proxies[key].attach(target, subscription);
        engine_debug!(SOURCE, "Moved proxy {:?} to collection {:?}", key, target);
        Ok(())
    }

    pub fn proxy(&self, key: ProxyKey) -> Option<&ProxyHandle> {
        self.proxies.get(key)
    }

    pub fn proxies(&self) -> &SlotMap<ProxyKey, ProxyHandle> {
        &self.proxies
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    pub fn set_transform(&mut self, key: ProxyKey, transform: Transform) -> bool {
        self.update_proxy(key, |proxy| proxy.set_transform(transform))
    }

    pub fn set_position(&mut self, key: ProxyKey, position: Vec3) -> bool {
        self.update_proxy(key, |proxy| proxy.set_position(position))
    }

    /// Host world matrix of the node the proxy hangs from
    pub fn set_parent_matrix(&mut self, key: ProxyKey, matrix: Mat4) -> bool {
        self.update_proxy(key, |proxy| proxy.set_parent_matrix(matrix))
    }

    pub fn set_color(&mut self, key: ProxyKey, color: Color) -> bool {
        match self.proxies.get_mut(key) {
            Some(proxy) => {
                proxy.set_color(color);
                true
            }
            None => false,
        }
    }

    pub fn set_size(&mut self, key: ProxyKey, size: f32) -> bool {
        match self.proxies.get_mut(key) {
            Some(proxy) => {
                proxy.set_size(size);
                true
            }
            None => false,
        }
    }

    /// Apply a transform change and queue the world-matrix refresh
    fn update_proxy(&mut self, key: ProxyKey, apply: impl FnOnce(&mut ProxyHandle)) -> bool {
        match self.proxies.get_mut(key) {
            Some(proxy) => {
                apply(proxy);
                self.dirty_proxies.insert(key);
                true
            }
            None => false,
        }
    }

    /// Slot the proxy was packed into at the last tick
    pub fn proxy_slot(&self, key: ProxyKey) -> Option<u32> {
        let collection = self.collections.get(self.proxies.get(key)?.collection()?)?;
        collection.as_dyn().slot_of(key)
    }

    /// Geometry shared by the proxy's collection (mesh proxies only)
    pub fn proxy_geometry(&self, key: ProxyKey) -> Option<&Geometry> {
        let collection = self.collections.get(self.proxies.get(key)?.collection()?)?;
        collection.as_mesh()?.geometry().map(|geometry| geometry.as_ref())
    }

    /// World-space bounds of one proxy: its collection's geometry box for
    /// meshes, a degenerate box at its position for points.
    pub fn proxy_world_bounds(&self, key: ProxyKey) -> Option<AABB> {
        let proxy = self.proxies.get(key)?;
        match self.collections.get(proxy.collection()?)? {
            Collection::Mesh(collection) => collection.geometry()
                .map(|geometry| geometry.bounding_box().transformed(proxy.world_matrix())),
            Collection::Points(_) => {
                let position = proxy.world_position();
                Some(AABB { min: position, max: position })
            }
        }
    }

    // ===== FRAME =====

    /// Recompute the world matrix of every proxy changed since the last call
    pub fn update_world_matrices(&mut self) {
        for key in self.dirty_proxies.drain() {
            if let Some(proxy) = self.proxies.get_mut(key) {
                proxy.update_world_matrix();
            }
        }
    }

    /// Synchronize a single collection against the current proxy state
    pub fn synchronize_collection(&mut self, key: CollectionKey) -> Option<SyncReport> {
        let collection = self.collections.get_mut(key)?;
        Some(collection.as_dyn_mut().synchronize(&self.proxies))
    }

    /// Run one frame: world matrices first, then every collection.
    pub fn tick(&mut self) -> &[(CollectionKey, SyncReport)] {
        self.update_world_matrices();

        self.last_reports.clear();
        for (key, collection) in self.collections.iter_mut() {
            let report = collection.as_dyn_mut().synchronize(&self.proxies);
            self.last_reports.push((key, report));
        }
        &self.last_reports
    }

    /// Reports produced by the last tick
    pub fn last_reports(&self) -> &[(CollectionKey, SyncReport)] {
        &self.last_reports
    }

    // ===== RAYCASTING =====

    /// Hit-test one proxy. Zero hits when it is unsubscribed, out of
    /// range or its collection is gone.
    pub fn raycast_proxy(&self, key: ProxyKey, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize {
        let Some(collection) = self.proxies.get(key)
            .and_then(ProxyHandle::collection)
            .and_then(|collection| self.collections.get(collection))
        else {
            return 0;
        };
        collection.as_dyn().raycast_proxy(key, raycaster, out)
    }

    /// Hit-test every active slot of one collection
    pub fn raycast_collection(&self, key: CollectionKey, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize {
        match self.collections.get(key) {
            Some(collection) => collection.as_dyn().raycast(raycaster, out),
            None => 0,
        }
    }

    /// Hit-test everything, nearest first
    pub fn raycast(&self, raycaster: &Raycaster) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for collection in self.collections.values() {
            collection.as_dyn().raycast(raycaster, &mut hits);
        }
        sort_by_distance(&mut hits);
        hits
    }

    /// Nearest hit, if any
    pub fn intersect_first(&self, raycaster: &Raycaster) -> Option<Intersection> {
        self.raycast(raycaster).into_iter().next()
    }

    /// Destroy every collection and proxy
    pub fn clear(&mut self) {
        for (_, mut collection) in self.collections.drain() {
            collection.as_dyn_mut().destroy();
        }
        self.proxies.clear();
        self.dirty_proxies.clear();
        self.last_reports.clear();
    }
}

fn invalid_key(message: String) -> Error {
    engine_error!(SOURCE, "{}", message);
    Error::InvalidKey(message)
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
