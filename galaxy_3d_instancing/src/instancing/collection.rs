/// Collection plumbing shared by mesh and point-sprite collections.
///
/// Both kinds own a fixed number of GPU slots (`limit`), a registry of
/// subscribed proxies and a world matrix. They only differ in what they
/// pack per slot and how a slot is hit-tested, which is what the
/// `InstancedCollection` trait abstracts.

use glam::Mat4;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::raycast::{Intersection, Raycaster};
use crate::{engine_debug, engine_error, engine_warn};
use super::instance_collection::InstanceCollection;
use super::point_collection::PointCollection;
use super::proxy::{ProxyHandle, ProxyKey};
use super::registry::ProxyRegistry;

new_key_type! {
    /// Stable key for a collection owned by a Scene
    pub struct CollectionKey;
}

/// Proof of a successful subscribe, consumed by unsubscribe.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    proxy: ProxyKey,
}

impl Subscription {
    pub(crate) fn new(proxy: ProxyKey) -> Self {
        Self { proxy }
    }

    pub fn proxy(&self) -> ProxyKey {
        self.proxy
    }
}

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Slots written this pass (`min(limit, registered)`, 0 when skipped)
    pub written: usize,
    /// Instances the host should draw (unchanged by a skipped pass)
    pub active_count: usize,
    /// Live registrations
    pub registered: usize,
    /// Registrations that did not fit under the limit
    pub overflow: usize,
    /// True when buffers were left untouched (missing geometry/material,
    /// singular world matrix or destroyed collection)
    pub skipped: bool,
}

/// Common behavior of every instanced collection.
pub trait InstancedCollection {
    fn name(&self) -> &str;

    /// Slots allocated at construction
    fn limit(&self) -> usize;

    /// Draw cap set by the host, `None` meaning "up to limit"
    fn range(&self) -> Option<usize>;

    /// Change the draw cap. Takes effect at the next synchronize().
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfiguration` when `range > limit`.
    fn set_range(&mut self, range: Option<usize>) -> Result<()>;

    /// Number of live subscriptions (may exceed limit)
    fn registered_count(&self) -> usize;

    /// `min(limit, range, registered)` as of the last synchronize()
    fn active_count(&self) -> usize;

    fn world_matrix(&self) -> &Mat4;

    fn set_world_matrix(&mut self, matrix: Mat4);

    /// Register a proxy. Its slot is assigned at the next synchronize().
    ///
    /// # Errors
    ///
    /// `Error::CollectionDestroyed` or `Error::AlreadySubscribed`.
    fn subscribe(&mut self, proxy: ProxyKey) -> Result<Subscription>;

    /// Drop a registration. Returns false if it was already gone.
    fn unsubscribe(&mut self, subscription: Subscription) -> bool;

    fn is_subscribed(&self, proxy: ProxyKey) -> bool;

    /// Slot of `proxy` as of the last synchronize()
    fn slot_of(&self, proxy: ProxyKey) -> Option<u32>;

    /// Proxy holding `slot` as of the last synchronize()
    fn proxy_at(&self, slot: u32) -> Option<ProxyKey>;

    /// Copy every subscribed proxy's state into the packed buffers.
    fn synchronize(&mut self, proxies: &SlotMap<ProxyKey, ProxyHandle>) -> SyncReport;

    /// Hit-test the slot owned by `proxy`, appending to `out`.
    /// Returns the number of hits appended.
    fn raycast_proxy(&self, proxy: ProxyKey, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize;

    /// Hit-test every active slot, attributing hits to their proxies.
    fn raycast(&self, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize {
        (0..self.active_count() as u32)
            .filter_map(|slot| self.proxy_at(slot))
            .map(|proxy| self.raycast_proxy(proxy, raycaster, out))
            .sum()
    }

    /// Release the GPU buffers and forget every registration.
    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;
}

// ===== SHARED STATE =====

/// State and bookkeeping common to both collection kinds.
#[derive(Debug)]
pub(crate) struct CollectionCore {
    name: String,
    limit: usize,
    range: Option<usize>,
    registry: ProxyRegistry,
    world_matrix: Mat4,
    /// Inverse of world_matrix captured by the last begin_pass()
    inverse_world_matrix: Mat4,
    active_count: usize,
    /// Currently over limit (warning is edge-triggered)
    overflowing: bool,
    destroyed: bool,
}

impl CollectionCore {
    pub(crate) fn new(name: String, limit: usize, range: Option<usize>, source: &str) -> Result<Self> {
        if limit == 0 {
            return Err(invalid_configuration(source,
                format!("Collection '{}': limit must be at least 1", name)));
        }
        check_range(source, &name, limit, range)?;

        engine_debug!("galaxy3d::InstancedCollection",
            "Created collection '{}' (limit {}, range {:?})", name, limit, range);

        Ok(Self {
            name,
            limit,
            range,
            registry: ProxyRegistry::with_capacity(limit),
            world_matrix: Mat4::IDENTITY,
            inverse_world_matrix: Mat4::IDENTITY,
            active_count: 0,
            overflowing: false,
            destroyed: false,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn range(&self) -> Option<usize> {
        self.range
    }

    pub(crate) fn set_range(&mut self, range: Option<usize>, source: &str) -> Result<()> {
        check_range(source, &self.name, self.limit, range)?;
        self.range = range;
        Ok(())
    }

    pub(crate) fn registry(&self) -> &ProxyRegistry {
        &self.registry
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active_count
    }

    pub(crate) fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, matrix: Mat4) {
        self.world_matrix = matrix;
    }

    pub(crate) fn inverse_world_matrix(&self) -> &Mat4 {
        &self.inverse_world_matrix
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn subscribe(&mut self, proxy: ProxyKey) -> Result<Subscription> {
        if self.destroyed {
            return Err(Error::CollectionDestroyed);
        }
        if !self.registry.insert(proxy) {
            return Err(Error::AlreadySubscribed);
        }
        Ok(Subscription::new(proxy))
    }

    pub(crate) fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.registry.remove(subscription.proxy)
    }

    /// True when `proxy` is registered and its slot is drawn this frame
    pub(crate) fn active_slot_of(&self, proxy: ProxyKey) -> Option<u32> {
        if self.destroyed || !self.registry.contains(proxy) {
            return None;
        }
        self.registry.slot_of(proxy)
            .filter(|slot| (*slot as usize) < self.active_count)
    }

    /// Assign slots and counts for a new pass.
    ///
    /// `ready` is false when the caller cannot write its buffers (missing
    /// geometry or material). A skipped pass leaves the slot snapshot,
    /// `active_count` and inverse world matrix from the last written pass,
    /// so raycasts keep matching what the buffers hold. The report still
    /// carries the live `registered` and `overflow` counts.
    pub(crate) fn begin_pass(&mut self, source: &str, ready: bool) -> SyncReport {
        if self.destroyed {
            return SyncReport { skipped: true, ..SyncReport::default() };
        }

        let registered = self.registry.len();
        let overflow = registered.saturating_sub(self.limit);

        if overflow > 0 && !self.overflowing {
            engine_warn!(source,
                "Collection '{}': {} proxies registered but limit is {}; {} not drawn",
                self.name, registered, self.limit, overflow);
        }
        self.overflowing = overflow > 0;

        let singular = self.world_matrix.determinant() == 0.0;
        if !ready || singular {
            return SyncReport {
                written: 0,
                active_count: self.active_count,
                registered,
                overflow,
                skipped: true,
            };
        }

        self.registry.assign_slots();
        self.inverse_world_matrix = self.world_matrix.inverse();

        let written = registered.min(self.limit);
        let active_count = written.min(self.range.unwrap_or(self.limit));
        self.active_count = active_count;

        SyncReport {
            written,
            active_count,
            registered,
            overflow,
            skipped: false,
        }
    }

    pub(crate) fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.active_count = 0;
        self.overflowing = false;
        self.registry.clear();
        engine_debug!("galaxy3d::InstancedCollection", "Destroyed collection '{}'", self.name);
    }
}

fn check_range(source: &str, name: &str, limit: usize, range: Option<usize>) -> Result<()> {
    match range {
        Some(range) if range > limit => Err(invalid_configuration(source,
            format!("Collection '{}': range {} exceeds limit {}", name, range, limit))),
        _ => Ok(()),
    }
}

fn invalid_configuration(source: &str, message: String) -> Error {
    engine_error!(source, "{}", message);
    Error::InvalidConfiguration(message)
}

// ===== COLLECTION ENUM =====

/// A collection of either kind, as stored by the Scene.
pub enum Collection {
    Mesh(InstanceCollection),
    Points(PointCollection),
}

impl Collection {
    pub fn as_dyn(&self) -> &dyn InstancedCollection {
        match self {
            Collection::Mesh(collection) => collection,
            Collection::Points(collection) => collection,
        }
    }

    pub fn as_dyn_mut(&mut self) -> &mut dyn InstancedCollection {
        match self {
            Collection::Mesh(collection) => collection,
            Collection::Points(collection) => collection,
        }
    }

    pub fn as_mesh(&self) -> Option<&InstanceCollection> {
        match self {
            Collection::Mesh(collection) => Some(collection),
            Collection::Points(_) => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut InstanceCollection> {
        match self {
            Collection::Mesh(collection) => Some(collection),
            Collection::Points(_) => None,
        }
    }

    pub fn as_points(&self) -> Option<&PointCollection> {
        match self {
            Collection::Points(collection) => Some(collection),
            Collection::Mesh(_) => None,
        }
    }

    pub fn as_points_mut(&mut self) -> Option<&mut PointCollection> {
        match self {
            Collection::Points(collection) => Some(collection),
            Collection::Mesh(_) => None,
        }
    }
}

impl From<InstanceCollection> for Collection {
    fn from(collection: InstanceCollection) -> Self {
        Collection::Mesh(collection)
    }
}

impl From<PointCollection> for Collection {
    fn from(collection: PointCollection) -> Self {
        Collection::Points(collection)
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
