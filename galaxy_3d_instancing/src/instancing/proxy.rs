/// ProxyHandle: the per-instance object a host manipulates.
///
/// A proxy is never drawn on its own. It owns the source-of-truth
/// transform, color and size of one instance; the collection it is
/// subscribed to copies those values into its packed buffers during
/// synchronization. Proxies live in a SlotMap owned by the Scene, so the
/// collection only ever refers to them through a `ProxyKey`.

use glam::{Mat4, Vec3};
use slotmap::new_key_type;
use crate::math::{Color, Transform};
use super::collection::{CollectionKey, Subscription};

new_key_type! {
    /// Stable key for a ProxyHandle. Also the identity collections use to
    /// locate a proxy's slot.
    pub struct ProxyKey;
}

#[derive(Debug, Clone)]
pub struct ProxyHandle {
    transform: Transform,
    color: Color,
    /// Point-sprite size (ignored by mesh collections)
    size: f32,
    /// World matrix of whatever the host parents the proxy to
    parent_matrix: Mat4,
    /// parent_matrix * transform, refreshed by update_world_matrix()
    world_matrix: Mat4,
    /// Non-owning reference to the collection. Resolves to nothing once
    /// the collection is destroyed.
    collection: Option<CollectionKey>,
    subscription: Option<Subscription>,
}

impl ProxyHandle {
    pub fn new(transform: Transform, color: Color) -> Self {
        Self {
            transform,
            color,
            size: 1.0,
            parent_matrix: Mat4::IDENTITY,
            world_matrix: transform.to_matrix(),
            collection: None,
            subscription: None,
        }
    }

    /// Proxy for a point sprite at `position`
    pub fn point(position: Vec3, color: Color, size: f32) -> Self {
        Self {
            size,
            ..Self::new(Transform::from_position(position), color)
        }
    }

    // ===== ACCESSORS =====

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn parent_matrix(&self) -> &Mat4 {
        &self.parent_matrix
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Translation part of the world matrix
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }

    pub fn collection(&self) -> Option<CollectionKey> {
        self.collection
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    // ===== SETTERS =====

    /// Replace the local transform. The world matrix is stale until the
    /// next update_world_matrix().
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    pub fn set_parent_matrix(&mut self, matrix: Mat4) {
        self.parent_matrix = matrix;
    }

    /// Recompute the world matrix from the parent and local transform
    pub fn update_world_matrix(&mut self) {
        self.world_matrix = self.parent_matrix * self.transform.to_matrix();
    }

    // ===== SUBSCRIPTION (crate-internal) =====

    pub(crate) fn attach(&mut self, collection: CollectionKey, subscription: Subscription) {
        self.collection = Some(collection);
        self.subscription = Some(subscription);
    }

    /// Clear both back-references, returning what the collection needs
    /// to unsubscribe.
    pub(crate) fn detach(&mut self) -> Option<(CollectionKey, Subscription)> {
        let collection = self.collection.take();
        let subscription = self.subscription.take();
        collection.zip(subscription)
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
