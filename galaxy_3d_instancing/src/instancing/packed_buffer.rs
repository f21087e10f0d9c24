/// Fixed-capacity float buffer consumed directly by the GPU.
///
/// A PackedBuffer holds `capacity` items of `item_size` floats each
/// (16 for a matrix, 3 for a color, 1 for a point size). It is allocated
/// once and never resized. The owning collection is its sole writer; the
/// host reads `as_bytes()` plus `dirty_byte_range()` to upload, then calls
/// `clear_dirty()`.
///
/// Writes past the capacity are rejected, never clamped or grown.

use std::ops::Range;
use bitflags::bitflags;

bitflags! {
    /// How the host should bind and upload the buffer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Bound as a vertex attribute stream
        const VERTEX   = 1 << 0;
        /// Advanced once per instance rather than per vertex
        const INSTANCE = 1 << 1;
        /// Rewritten every frame
        const DYNAMIC  = 1 << 2;
        /// Destination of CPU → GPU copies
        const COPY_DST = 1 << 3;
    }
}

impl BufferUsage {
    /// Usage of every per-instance stream the collections produce
    pub const INSTANCE_STREAM: Self = Self::VERTEX
        .union(Self::INSTANCE)
        .union(Self::DYNAMIC)
        .union(Self::COPY_DST);
}

pub struct PackedBuffer {
    label: &'static str,
    data: Vec<f32>,
    item_size: usize,
    capacity: usize,
    usage: BufferUsage,
    /// Items written since the host last acknowledged an upload
    dirty: Option<Range<usize>>,
    /// Bumped on every mark_dirty() (lets hosts detect changes cheaply)
    version: u64,
}

impl PackedBuffer {
    /// Zero-filled buffer
    pub fn new(label: &'static str, item_size: usize, capacity: usize, usage: BufferUsage) -> Self {
        Self {
            label,
            data: vec![0.0; item_size * capacity],
            item_size,
            capacity,
            usage,
            dirty: None,
            version: 0,
        }
    }

    /// Buffer with every item initialized to `fill` (e.g. an identity matrix).
    ///
    /// `fill` must be exactly `item_size` floats long.
    pub fn filled(label: &'static str, fill: &[f32], capacity: usize, usage: BufferUsage) -> Self {
        Self {
            label,
            data: fill.repeat(capacity),
            item_size: fill.len(),
            capacity,
            usage,
            dirty: None,
            version: 0,
        }
    }

    // ===== ACCESSORS =====

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Number of items (0 once released)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Floats of item `index`
    pub fn item(&self, index: usize) -> Option<&[f32]> {
        if index >= self.capacity {
            return None;
        }
        let start = index * self.item_size;
        Some(&self.data[start..start + self.item_size])
    }

    // ===== WRITES =====

    /// Overwrite item `index`. Returns false (and writes nothing) when the
    /// index is out of capacity or `values` has the wrong length.
    ///
    /// Does not mark the item dirty; the writer marks the whole written
    /// span once per pass with `mark_dirty`.
    pub fn write(&mut self, index: usize, values: &[f32]) -> bool {
        if index >= self.capacity || values.len() != self.item_size {
            return false;
        }
        let start = index * self.item_size;
        self.data[start..start + self.item_size].copy_from_slice(values);
        true
    }

    /// Flag `items` for upload, merged with any pending range.
    pub fn mark_dirty(&mut self, items: Range<usize>) {
        let items = items.start.min(self.capacity)..items.end.min(self.capacity);
        if items.is_empty() {
            return;
        }
        self.dirty = Some(match self.dirty.take() {
            Some(pending) => pending.start.min(items.start)..pending.end.max(items.end),
            None => items,
        });
        self.version += 1;
    }

    // ===== UPLOAD PROTOCOL =====

    pub fn needs_upload(&self) -> bool {
        self.dirty.is_some()
    }

    /// Pending item range
    pub fn dirty_range(&self) -> Option<Range<usize>> {
        self.dirty.clone()
    }

    /// Pending range in bytes, relative to `as_bytes()`
    pub fn dirty_byte_range(&self) -> Option<Range<usize>> {
        let stride = self.item_size * std::mem::size_of::<f32>();
        self.dirty.as_ref().map(|r| r.start * stride..r.end * stride)
    }

    /// Called by the host once the pending range has been uploaded
    pub fn clear_dirty(&mut self) {
        self.dirty = None;
    }

    /// Free the storage. The buffer keeps its item size but holds no items.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.capacity = 0;
        self.dirty = None;
    }
}

#[cfg(test)]
#[path = "packed_buffer_tests.rs"]
mod tests;
