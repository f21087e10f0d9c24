/// Ordered set of subscribed proxies with per-frame slot assignment.
///
/// Registration order decides slots: the i-th live entry at the last
/// `assign_slots()` owns slot i. Removals leave a tombstone so that
/// unsubscribe stays O(1); tombstones are squeezed out at the start of
/// the next pass, which shifts later entries down.
///
/// Slot lookups answer from the snapshot taken by the last pass, so a
/// slot is only meaningful for the frame it was assigned in.

use rustc_hash::FxHashMap;
use super::proxy::ProxyKey;

#[derive(Debug, Default)]
pub struct ProxyRegistry {
    /// Registration order, `None` for removed entries
    entries: Vec<Option<ProxyKey>>,
    /// Proxy → index into `entries`
    positions: FxHashMap<ProxyKey, usize>,
    /// Slot order of the last pass
    frame_order: Vec<ProxyKey>,
    /// Proxy → slot of the last pass
    frame_slots: FxHashMap<ProxyKey, u32>,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for `capacity` live proxies
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            frame_order: Vec::with_capacity(capacity),
            frame_slots: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Append `proxy`. Returns false if it is already registered.
    pub fn insert(&mut self, proxy: ProxyKey) -> bool {
        if self.positions.contains_key(&proxy) {
            return false;
        }
        self.positions.insert(proxy, self.entries.len());
        self.entries.push(Some(proxy));
        true
    }

    /// Tombstone `proxy`. Returns false if it was not registered.
    pub fn remove(&mut self, proxy: ProxyKey) -> bool {
        match self.positions.remove(&proxy) {
            Some(position) => {
                self.entries[position] = None;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, proxy: ProxyKey) -> bool {
        self.positions.contains_key(&proxy)
    }

    /// Live registrations
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Live proxies in registration order
    pub fn iter(&self) -> impl Iterator<Item = ProxyKey> + '_ {
        self.entries.iter().flatten().copied()
    }

    /// Compact tombstones and snapshot slots for a new pass.
    ///
    /// Every live proxy gets a slot, including those past the collection
    /// limit; callers compare against their own limit. Storage is reused
    /// across passes.
    pub fn assign_slots(&mut self) {
        if self.entries.len() != self.positions.len() {
            self.entries.retain(Option::is_some);
            for (position, proxy) in self.entries.iter().flatten().enumerate() {
                self.positions.insert(*proxy, position);
            }
        }

        self.frame_order.clear();
        self.frame_order.extend(self.entries.iter().flatten().copied());

        self.frame_slots.clear();
        for (slot, proxy) in self.frame_order.iter().enumerate() {
            self.frame_slots.insert(*proxy, slot as u32);
        }
    }

    /// Slot order of the last pass
    pub fn frame_order(&self) -> &[ProxyKey] {
        &self.frame_order
    }

    /// Slot of `proxy` at the last pass
    pub fn slot_of(&self, proxy: ProxyKey) -> Option<u32> {
        self.frame_slots.get(&proxy).copied()
    }

    /// Proxy holding `slot` at the last pass
    pub fn proxy_at(&self, slot: u32) -> Option<ProxyKey> {
        self.frame_order.get(slot as usize).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
        self.frame_order.clear();
        self.frame_slots.clear();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
