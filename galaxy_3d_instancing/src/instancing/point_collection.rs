/// PointCollection: point sprites packed into one draw call.
///
/// Same slot bookkeeping as InstanceCollection, but a slot holds only a
/// collection-relative position (3 floats), a color (3 floats) and a size
/// (1 float). Every pass also refits the bounding sphere around the drawn
/// positions, which point raycasts use as a coarse reject.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use slotmap::SlotMap;
use crate::error::Result;
use crate::math::{Color, Sphere};
use crate::raycast::{Intersection, Raycaster};
use crate::resource::Material;
use crate::engine_trace;
use super::instance_collection::COLOR_STRIDE;
use super::collection::{CollectionCore, InstancedCollection, Subscription, SyncReport};
use super::packed_buffer::{BufferUsage, PackedBuffer};
use super::point_raycast_proxy::PointRaycastProxy;
use super::proxy::{ProxyHandle, ProxyKey};

const SOURCE: &str = "galaxy3d::PointCollection";

pub const POSITION_STRIDE: usize = 3;
pub const SIZE_STRIDE: usize = 1;

/// Point collection descriptor
pub struct PointCollectionDesc {
    pub name: String,
    pub limit: usize,
    pub range: Option<usize>,
    pub material: Option<Arc<Material>>,
}

pub struct PointCollection {
    core: CollectionCore,
    material: Option<Arc<Material>>,
    positions: PackedBuffer,
    colors: PackedBuffer,
    sizes: PackedBuffer,
    /// Local-space sphere around the drawn positions (None when nothing is drawn)
    bounding_sphere: Option<Sphere>,
    /// Reused each pass to refit the bounding sphere
    scratch: Vec<Vec3>,
}

impl PointCollection {
    /// Allocate a point collection and its buffers.
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfiguration` when `limit` is 0 or `range > limit`.
    pub fn from_desc(desc: PointCollectionDesc) -> Result<Self> {
        let core = CollectionCore::new(desc.name, desc.limit, desc.range, SOURCE)?;
        let limit = core.limit();

        Ok(Self {
            core,
            material: desc.material,
            positions: PackedBuffer::new("point_positions", POSITION_STRIDE, limit, BufferUsage::INSTANCE_STREAM),
            colors: PackedBuffer::new("point_colors", COLOR_STRIDE, limit, BufferUsage::INSTANCE_STREAM),
            sizes: PackedBuffer::new("point_sizes", SIZE_STRIDE, limit, BufferUsage::INSTANCE_STREAM),
            bounding_sphere: None,
            scratch: Vec::with_capacity(limit),
        })
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Option<Arc<Material>>) {
        self.material = material;
    }

    pub fn bounding_sphere(&self) -> Option<&Sphere> {
        self.bounding_sphere.as_ref()
    }

    pub fn position_buffer(&self) -> &PackedBuffer {
        &self.positions
    }

    pub fn color_buffer(&self) -> &PackedBuffer {
        &self.colors
    }

    pub fn size_buffer(&self) -> &PackedBuffer {
        &self.sizes
    }

    pub fn clear_dirty(&mut self) {
        self.positions.clear_dirty();
        self.colors.clear_dirty();
        self.sizes.clear_dirty();
    }

    /// Collection-relative position packed in `slot`
    pub fn slot_position(&self, slot: u32) -> Option<Vec3> {
        self.positions.item(slot as usize).map(Vec3::from_slice)
    }

    pub fn slot_color(&self, slot: u32) -> Option<Color> {
        self.colors.item(slot as usize).map(|c| Color::new(c[0], c[1], c[2]))
    }

    pub fn slot_size(&self, slot: u32) -> Option<f32> {
        self.sizes.item(slot as usize).map(|s| s[0])
    }

    pub fn raycast_proxy_for(&self, proxy: ProxyKey) -> PointRaycastProxy<'_> {
        PointRaycastProxy::new(self, proxy)
    }

    pub(crate) fn active_slot_of(&self, proxy: ProxyKey) -> Option<u32> {
        self.core.active_slot_of(proxy)
    }

    fn refit_bounding_sphere(&mut self) {
        self.scratch.clear();
        for slot in 0..self.core.active_count() {
            if let Some(position) = self.positions.item(slot) {
                self.scratch.push(Vec3::from_slice(position));
            }
        }
        self.bounding_sphere = Sphere::from_points(&self.scratch);
    }
}

impl InstancedCollection for PointCollection {
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
        let report = self.core.begin_pass(SOURCE, self.material.is_some());
        if report.skipped {
            return report;
        }

        let inverse_world = *self.core.inverse_world_matrix();
        let order = self.core.registry().frame_order();

        for (slot, key) in order.iter().take(report.written).enumerate() {
            let Some(proxy) = proxies.get(*key) else {
                continue;
            };
            let local = inverse_world.transform_point3(proxy.world_position());
            self.positions.write(slot, &local.to_array());
            self.colors.write(slot, &proxy.color().to_array());
            self.sizes.write(slot, &[proxy.size()]);
        }

        self.positions.mark_dirty(0..report.written);
        self.colors.mark_dirty(0..report.written);
        self.sizes.mark_dirty(0..report.written);
        self.refit_bounding_sphere();

        engine_trace!(SOURCE, "Collection '{}': wrote {} points, drawing {}",
            self.core.name(), report.written, report.active_count);

        report
    }

    fn raycast_proxy(&self, proxy: ProxyKey, raycaster: &Raycaster, out: &mut Vec<Intersection>) -> usize {
        PointRaycastProxy::new(self, proxy).raycast(raycaster, out)
    }

    fn destroy(&mut self) {
        self.core.destroy();
        self.positions.release();
        self.colors.release();
        self.sizes.release();
        self.bounding_sphere = None;
        self.scratch = Vec::new();
    }

    fn is_destroyed(&self) -> bool {
        self.core.is_destroyed()
    }
}

#[cfg(test)]
#[path = "point_collection_tests.rs"]
mod tests;
