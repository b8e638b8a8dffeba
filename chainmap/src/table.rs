//! [ChainMap] is a hash map with a fixed number of slots and separate chaining.
use std::{
    borrow::Borrow,
    fmt::{self, Debug, Display},
    hash::Hash,
};

use crate::{
    arena::NodeArena,
    chain::Chain,
    fmt::{fmt_closure, fmt_list},
    hash::{entry_hash, slot_index, CAPACITY},
};

/// A hash map with exactly [`CAPACITY`] slots that never resizes.
///
/// Each slot holds a chain of entries, so the map accepts any number of entries, with lookups
/// becoming linear in the number of entries per slot as the map fills up.
#[derive(Clone)]
pub struct ChainMap<K, V> {
    slots: [Chain; CAPACITY],
    nodes: NodeArena<K, V>,
}

impl<K, V> Default for ChainMap<K, V> {
    fn default() -> Self {
        ChainMap {
            slots: std::array::from_fn(|_| Chain::default()),
            nodes: NodeArena::default(),
        }
    }
}

impl<K, V> ChainMap<K, V> {
    /// Returns an empty map.
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Returns the number of entries chained in the given slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= CAPACITY`.
    pub fn slot_len(&self, slot: usize) -> usize {
        self.slots[slot].entries(&self.nodes).count()
    }
}

#[inline]
fn locate<Q: Hash + ?Sized>(key: &Q) -> (i32, usize) {
    let hash = entry_hash(key);
    (hash, slot_index(hash))
}

impl<K: Hash + Eq, V> ChainMap<K, V> {
    /// Stores `value` at `key`, replacing any previous value.
    pub fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
    /// Stores `value` at `key`, replacing and returning any previous value.
    ///
    /// A replaced value is overwritten in place, keeping the entry's position in its chain.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (hash, slot) = locate(&key);
        let old_value = self.slots[slot].add(&mut self.nodes, hash, key, value);
        if old_value.is_some() {
            log::trace!("overwrote value in slot {slot}");
        }
        old_value
    }
    /// Returns a reference to the value stored at `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let (hash, slot) = locate(key);
        self.slots[slot].get(&self.nodes, hash, key)
    }
    /// Returns a mutable reference to the value stored at `key`, if any.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let (hash, slot) = locate(key);
        self.slots[slot].get_mut(&mut self.nodes, hash, key)
    }
    /// Returns `true` if the map contains an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.get(key).is_some()
    }
    /// Removes the entry for `key` and returns its value.
    ///
    /// The map is left unchanged if there is no such entry.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }
    /// Removes the entry for `key` and returns the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let (hash, slot) = locate(key);
        let removed = self.slots[slot].remove(&mut self.nodes, hash, key);
        if removed.is_none() {
            log::trace!("nothing to remove in slot {slot}");
        }
        removed
    }

    /// Asserts that the internal invariants hold.
    ///
    /// Every entry sits in the home slot of its hash, its cached hash matches its key, no key is
    /// stored twice and every live node is reachable from exactly one chain.
    pub fn check(&self) {
        let stats = self.nodes.stats();
        assert!(stats.used <= stats.reserved);

        let mut reachable = 0;
        for (slot, chain) in self.slots.iter().enumerate() {
            let entries: Vec<_> = chain.entries(&self.nodes).take(stats.used + 1).collect();
            assert!(entries.len() <= stats.used, "cycle in chain of slot {slot}");
            for (position, entry) in entries.iter().enumerate() {
                assert_eq!(entry.hash, entry_hash(&entry.key), "stale hash in slot {slot}");
                assert_eq!(slot_index(entry.hash), slot, "entry outside of its home slot");
                assert!(
                    entries[..position].iter().all(|other| other.key != entry.key),
                    "duplicate key in slot {slot}"
                );
            }
            assert_eq!(chain.is_empty(), entries.is_empty());
            reachable += entries.len();
        }
        assert_eq!(reachable, stats.used, "unreachable nodes");
    }
}

impl<K: Display, V: Display> ChainMap<K, V> {
    fn slot_fragments<'a>(&'a self, chain: &'a Chain) -> impl Display + 'a {
        fmt_closure(move |f| {
            for entry in chain.entries(&self.nodes) {
                write!(f, "{{{entry}}}")?;
            }
            Ok(())
        })
    }

    /// Renders the chain of every slot as a sequence of `{key: value}` fragments.
    ///
    /// Always returns [`CAPACITY`] strings, in slot order. Empty slots are rendered as empty
    /// strings.
    pub fn debug_dump(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|chain| self.slot_fragments(chain).to_string())
            .collect()
    }

    /// Returns a value that formats like [`debug_dump`](Self::debug_dump), one line per slot.
    pub fn dump(&self) -> impl Display + Debug + '_ {
        fmt_closure(move |f| {
            for chain in &self.slots {
                writeln!(f, "{}", self.slot_fragments(chain))?;
            }
            Ok(())
        })
    }
}

impl<K: Debug, V: Debug> Debug for ChainMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.slots
                    .iter()
                    .map(|chain| fmt_list(move || chain.entries(&self.nodes))),
            )
            .finish()
    }
}

#[test]
fn test() {
    let mut map: ChainMap<String, usize> = ChainMap::new();
    map.put("adam".into(), 10);
    map.put("eve".into(), 25);
    map.put("mallory".into(), 8);
    map.put("jim".into(), 14);
    assert_eq!(map.insert("eve".into(), 23), Some(25));
    assert_eq!(map.remove("mallory"), Some(8));
    dbg!(&map);
    map.check();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("eve"), Some(&23));
}
