/// InstanceCollection: N copies of one mesh drawn in a single call.
///
/// Each frame, `synchronize()` packs every subscribed proxy's world
/// matrix (expressed relative to the collection) and color into two
/// fixed-size buffers:
///
/// - transforms: 16 floats per slot, column-major, initialized to identity
/// - colors: 3 floats per slot (RGB), initialized to black
///
/// The host draws `active_count()` instances and uploads the dirty range
/// of each buffer. Slots are never cleared; anything past `active_count`
/// is simply not drawn.

use std::sync::Arc;
use glam::Mat4;
use slotmap::SlotMap;
use crate::error::Result;
use crate::math::{relative_trs_matrix, Color};
use crate::raycast::{Intersection, Raycaster};
use crate::resource::{Geometry, Material};
use crate::engine_trace;
use super::collection::{CollectionCore, InstancedCollection, Subscription, SyncReport};
use super::instance_raycast_proxy::InstanceRaycastProxy;
use super::packed_buffer::{BufferUsage, PackedBuffer};
use super::proxy::{ProxyHandle, ProxyKey};

const SOURCE: &str = "galaxy3d::InstanceCollection";

/// Floats per transform slot
pub const TRANSFORM_STRIDE: usize = 16;
/// Floats per color slot
pub const COLOR_STRIDE: usize = 3;

/// Instance collection descriptor
pub struct InstanceCollectionDesc {
    pub name: String,
    /// Number of slots, fixed for the collection's lifetime (>= 1)
    pub limit: usize,
    /// Optional draw cap (<= limit)
    pub range: Option<usize>,
    pub geometry: Option<Arc<Geometry>>,
    pub material: Option<Arc<Material>>,
}

pub struct InstanceCollection {
    core: CollectionCore,
    geometry: Option<Arc<Geometry>>,
    material: Option<Arc<Material>>,
    transforms: PackedBuffer,
    colors: PackedBuffer,
}

impl InstanceCollection {
    /// Allocate a collection and its buffers.
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfiguration` when `limit` is 0 or `range > limit`.
    pub fn from_desc(desc: InstanceCollectionDesc) -> Result<Self> {
        let core = CollectionCore::new(desc.name, desc.limit, desc.range, SOURCE)?;
        let limit = core.limit();

        Ok(Self {
            core,
            geometry: desc.geometry,
            material: desc.material,
            transforms: PackedBuffer::filled(
                "instance_transforms", &Mat4::IDENTITY.to_cols_array(), limit, BufferUsage::INSTANCE_STREAM),
            colors: PackedBuffer::new(
                "instance_colors", COLOR_STRIDE, limit, BufferUsage::INSTANCE_STREAM),
        })
    }

    // ===== RESOURCES =====

    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        self.geometry.as_ref()
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: Option<Arc<Geometry>>) {
        self.geometry = geometry;
    }

    pub fn set_material(&mut self, material: Option<Arc<Material>>) {
        self.material = material;
    }

    /// False while geometry or material is missing. Synchronize and
    /// raycast do nothing in that state.
    pub fn is_complete(&self) -> bool {
        self.geometry.is_some() && self.material.is_some()
    }

    // ===== BUFFERS =====

    pub fn transform_buffer(&self) -> &PackedBuffer {
        &self.transforms
    }

    pub fn color_buffer(&self) -> &PackedBuffer {
        &self.colors
    }

    /// Host acknowledgment after uploading both buffers
    pub fn clear_dirty(&mut self) {
        self.transforms.clear_dirty();
        self.colors.clear_dirty();
    }

    /// Collection-relative matrix packed in `slot`
    pub fn slot_matrix(&self, slot: u32) -> Option<Mat4> {
        self.transforms.item(slot as usize).map(Mat4::from_cols_slice)
    }

    pub fn slot_color(&self, slot: u32) -> Option<Color> {
        self.colors.item(slot as usize).map(|c| Color::new(c[0], c[1], c[2]))
    }

    /// Hit-tester for one subscribed proxy
    pub fn raycast_proxy_for(&self, proxy: ProxyKey) -> InstanceRaycastProxy<'_> {
        InstanceRaycastProxy::new(self, proxy)
    }

    pub(crate) fn active_slot_of(&self, proxy: ProxyKey) -> Option<u32> {
        self.core.active_slot_of(proxy)
    }
}

impl InstancedCollection for InstanceCollection {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn limit(&self) -> usize {
        self.core.limit()
    }

    fn range(&self) -> Option<usize> {
        self.core.range()
    }

    fn set_range(&mut self, range: Option<usize>) -> Result<()> {
        self.core.set_range(range, SOURCE)
    }

    fn registered_count(&self) -> usize {
        self.core.registry().len()
    }

    fn active_count(&self) -> usize {
        self.core.active_count()
    }

    fn world_matrix(&self) -> &Mat4 {
        self.core.world_matrix()
    }

    fn set_world_matrix(&mut self, matrix: Mat4) {
        self.core.set_world_matrix(matrix);
    }

    fn subscribe(&mut self, proxy: ProxyKey) -> Result<Subscription> {
        self.core.subscribe(proxy)
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.core.unsubscribe(subscription)
    }

    fn is_subscribed(&self, proxy: ProxyKey) -> bool {
        self.core.registry().contains(proxy)
    }

    fn slot_of(&self, proxy: ProxyKey) -> Option<u32> {
        self.core.registry().slot_of(proxy)
    }

    fn proxy_at(&self, slot: u32) -> Option<ProxyKey> {
        self.core.registry().proxy_at(slot)
    }

    fn synchronize(&mut self, proxies: &SlotMap<ProxyKey, ProxyHandle>) -> SyncReport {
        let report = self.core.begin_pass(SOURCE, self.is_complete());
        if report.skipped {
            return report;
        }

        let inverse_world = *self.core.inverse_world_matrix();
        let order = self.core.registry().frame_order();

        for (slot, key) in order.iter().take(report.written).enumerate() {
            // A proxy removed without unsubscribing keeps its previous slot data
            let Some(proxy) = proxies.get(*key) else {
                continue;
            };
            let relative = relative_trs_matrix(&inverse_world, proxy.world_matrix());
            self.transforms.write(slot, &relative.to_cols_array());
            self.colors.write(slot, &proxy.color().to_array());
        }

        self.transforms.mark_dirty(0..report.written);
        self.colors.mark_dirty(0..report.written);

        engine_trace!(SOURCE, "Collection '{}': wrote {} slots, drawing {}",
            self.core.name(), report.written, report.active_count);

        report
    }

    fn raycast_proxy(&self, proxy: ProxyKey, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize {
        InstanceRaycastProxy::new(self, proxy).raycast(raycaster, out)
    }

    fn destroy(&mut self) {
        self.core.destroy();
        self.transforms.release();
        self.colors.release();
    }

    fn is_destroyed(&self) -> bool {
        self.core.is_destroyed()
    }
}

#[cfg(test)]
#[path = "instance_collection_tests.rs"]
mod tests;
