use std::{borrow::Borrow, fmt};

use crate::arena::NodeId;

/// A single key-value pair stored in a chain.
///
/// The hash is computed once when the entry is created and never updated afterwards.
#[derive(Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) hash: i32,
    pub(crate) key: K,
    pub(crate) value: V,
    /// Successor within the same chain.
    pub(crate) next: Option<NodeId>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(hash: i32, key: K, value: V) -> Self {
        Self {
            hash,
            key,
            value,
            next: None,
        }
    }

    /// Replaces the value in place, returning the previous one.
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Returns whether this entry stores `key`.
    ///
    /// The hashes are compared first; equal hashes alone never identify a key.
    #[inline]
    pub(crate) fn matches<Q>(&self, hash: i32, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.key, self.value)
    }
}
