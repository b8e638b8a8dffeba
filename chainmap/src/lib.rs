//! [ChainMap] is a minimal hash map with a fixed number of slots, resolving collisions by
//! separate chaining.
//!
//! The map always has [`CAPACITY`] slots and never rehashes, so its performance degrades linearly
//! once the number of entries grows well beyond the number of slots. Each slot stores a singly
//! linked chain of entries. Each entry caches the hash of its key, which is compared before the
//! keys themselves.
//!
//! All chain nodes of a map are kept in a single arena and linked by index, so removing an entry
//! only relinks its predecessor and returns the node's storage to a freelist.
//!
//! Keys only need to implement [`Hash`](std::hash::Hash) and [`Eq`]. Hashing uses a fixed
//! hasher (see [`hash`]); there is no way to plug in a different one.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod arena;
mod chain;
mod entry;
mod fmt;
mod table;

pub mod hash;

pub use hash::CAPACITY;
pub use table::ChainMap;
