//! Hash codes and home slots of keys.
//!
//! Every key is reduced to a 32-bit hash, which is stored next to the key and used as a cheap
//! pre-filter before comparing keys for equality. The home slot of a key is derived from that
//! hash alone.
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use zwohash::ZwoHasher;

/// Number of slots of every [`ChainMap`](crate::ChainMap). This never changes.
pub const CAPACITY: usize = 16;

/// Computes the 32-bit hash code of a key.
///
/// The 64-bit hash produced by [`ZwoHasher`] is folded by xoring its upper half into its lower
/// half. Values that compare equal through [`Borrow`](std::borrow::Borrow) (e.g. a `String` and
/// the corresponding `str`) have the same hash code.
#[inline]
pub fn hash_code<Q: Hash + ?Sized>(key: &Q) -> i32 {
    let hash = <BuildHasherDefault<ZwoHasher>>::default().hash_one(key);
    (hash ^ (hash >> 32)) as i32
}

/// Hashes a sequence consisting of a single, possibly absent, element.
///
/// An absent element contributes a hash code of zero.
#[inline]
pub const fn single_value_hash(code: Option<i32>) -> i32 {
    let code = match code {
        Some(code) => code,
        None => 0,
    };
    31i32.wrapping_add(code)
}

/// Computes the hash that is stored alongside a key.
#[inline]
pub fn entry_hash<Q: Hash + ?Sized>(key: &Q) -> i32 {
    single_value_hash(Some(hash_code(key)))
}

/// Returns the home slot of a hash, always in `0..CAPACITY`.
#[inline]
pub const fn slot_index(hash: i32) -> usize {
    hash.rem_euclid(CAPACITY as i32) as usize
}
