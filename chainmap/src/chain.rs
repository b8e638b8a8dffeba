//! Singly linked chains of entries sharing a slot.
use std::borrow::Borrow;

use crate::{
    arena::{NodeArena, NodeId},
    entry::Entry,
};

/// The entries of one slot, linked through their `next` fields.
///
/// A chain only stores its head; the nodes themselves are owned by the map's [`NodeArena`],
/// which has to be passed to every operation.
#[derive(Clone, Default, Debug)]
pub(crate) struct Chain {
    head: Option<NodeId>,
}

impl Chain {
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Stores `value` at `key`, overwriting the value of a matching entry in place.
    ///
    /// Returns the previous value if the key was present. New keys are appended at the end.
    pub fn add<K: Eq, V>(
        &mut self,
        nodes: &mut NodeArena<K, V>,
        hash: i32,
        key: K,
        value: V,
    ) -> Option<V> {
        let Some(mut last) = self.head else {
            self.head = Some(nodes.alloc(Entry::new(hash, key, value)));
            return None;
        };
        loop {
            let entry = nodes.get_mut(last);
            if entry.matches(hash, &key) {
                return Some(entry.replace_value(value));
            }
            match entry.next {
                Some(next) => last = next,
                None => break,
            }
        }
        let id = nodes.alloc(Entry::new(hash, key, value));
        nodes.get_mut(last).next = Some(id);
        None
    }

    /// Returns the node storing `key`, if any.
    pub fn find<K, V, Q>(&self, nodes: &NodeArena<K, V>, hash: i32, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let entry = nodes.get(id);
            if entry.matches(hash, key) {
                return Some(id);
            }
            cursor = entry.next;
        }
        None
    }

    pub fn get<'a, K, V, Q>(&self, nodes: &'a NodeArena<K, V>, hash: i32, key: &Q) -> Option<&'a V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.find(nodes, hash, key).map(|id| &nodes.get(id).value)
    }

    pub fn get_mut<'a, K, V, Q>(
        &self,
        nodes: &'a mut NodeArena<K, V>,
        hash: i32,
        key: &Q,
    ) -> Option<&'a mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let id = self.find(nodes, hash, key)?;
        Some(&mut nodes.get_mut(id).value)
    }

    /// Unlinks the entry storing `key` and returns its key and value.
    ///
    /// Leaves the chain unchanged if the key is not present.
    pub fn remove<K, V, Q>(&mut self, nodes: &mut NodeArena<K, V>, hash: i32, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut prev: Option<NodeId> = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let entry = nodes.get(id);
            let next = entry.next;
            if entry.matches(hash, key) {
                match prev {
                    None => self.head = next,
                    Some(prev) => nodes.get_mut(prev).next = next,
                }
                let entry = nodes.free(id);
                return Some((entry.key, entry.value));
            }
            prev = Some(id);
            cursor = next;
        }
        None
    }

    /// Returns the entries in chain order.
    pub fn entries<'a, K, V>(&self, nodes: &'a NodeArena<K, V>) -> Entries<'a, K, V> {
        Entries {
            nodes,
            cursor: self.head,
        }
    }
}

pub(crate) struct Entries<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    cursor: Option<NodeId>,
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.nodes.get(self.cursor?);
        self.cursor = entry.next;
        Some(entry)
    }
}
