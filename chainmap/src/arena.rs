//! Index-addressed storage for chain nodes.
//!
//! All nodes of a map live in a single [`NodeArena`] and refer to their successors by
//! [`NodeId`]. Freed slots are kept on an intrusive freelist and reused before the arena grows.
use crate::entry::Entry;

/// Index of a node inside a [`NodeArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone)]
enum Slot<K, V> {
    Occupied(Entry<K, V>),
    /// Link to the next free slot. The list ends at the current length of the arena.
    Free { next_free: u32 },
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub(crate) struct ArenaStats {
    /// Number of live nodes.
    pub used: usize,
    /// Number of nodes that fit into the currently reserved storage.
    pub reserved: usize,
}

#[derive(Clone)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: u32,
    stats: ArenaStats,
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: 0,
            stats: ArenaStats::default(),
        }
    }
}

impl<K, V> NodeArena<K, V> {
    pub fn len(&self) -> usize {
        self.stats.used
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    /// Stores `entry` in a free slot, growing the storage if there is none.
    ///
    /// # Panics
    ///
    /// Panics if the number of nodes would exceed the range of [`NodeId`].
    pub fn alloc(&mut self, entry: Entry<K, V>) -> NodeId {
        let id = self.free;
        if id as usize == self.slots.len() {
            assert_ne!(id, u32::MAX, "node arena exhausted");
            if self.slots.len() == self.slots.capacity() {
                self.grow();
            }
            self.slots.push(Slot::Occupied(entry));
            self.free = id + 1;
        } else {
            match std::mem::replace(&mut self.slots[id as usize], Slot::Occupied(entry)) {
                Slot::Free { next_free } => self.free = next_free,
                Slot::Occupied(_) => unreachable!("freelist points at a live node"),
            }
        }
        self.stats.used += 1;
        NodeId(id)
    }

    fn grow(&mut self) {
        let old_cap = self.slots.capacity();
        let new_cap = (old_cap * 2 - old_cap / 4 * 3).clamp(8, u32::MAX as usize);
        self.slots.reserve_exact(new_cap - self.slots.len());
        self.stats.reserved = self.slots.capacity();
        log::debug!(
            "grew node arena from {old_cap} to {} nodes",
            self.stats.reserved
        );
    }

    /// Removes a node from the arena and returns its entry.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live node.
    pub fn free(&mut self, id: NodeId) -> Entry<K, V> {
        let slot = &mut self.slots[id.index()];
        assert!(
            matches!(slot, Slot::Occupied(_)),
            "freeing node {id:?} which is not live"
        );
        let Slot::Occupied(entry) = std::mem::replace(
            slot,
            Slot::Free {
                next_free: self.free,
            },
        ) else {
            unreachable!()
        };
        self.free = id.0;
        self.stats.used -= 1;
        entry
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Entry<K, V> {
        match &self.slots[id.index()] {
            Slot::Occupied(entry) => entry,
            Slot::Free { .. } => panic!("dangling node {id:?}"),
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Entry<K, V> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(entry) => entry,
            Slot::Free { .. } => panic!("dangling node {id:?}"),
        }
    }
}
