//! Hash array mapped trie with graded tables.
//!
//! A HAMT stores pairs in a trie indexed by successive fixed-width chunks
//! of the key's hash. Interior tables come in two representations:
//!
//! - **Sparse**: an occupancy bitmap plus a compacted child array, with
//!   the array position of slot `i` given by `popcount(bitmap & (bit_i - 1))`
//! - **Fixed**: one slot per index value
//!
//! Under the default [`TableOption::Hybrid`] policy a sparse table is
//! promoted to fixed once it fills past an upgrade threshold and demoted
//! again when it drains to a downgrade threshold. Grading changes the
//! representation only, never the contents.
//!
//! # Two disciplines
//!
//! - [`Hamt`]: persistent. `put`/`del` path-copy from the edited table to
//!   a new root and share everything else with the previous version.
//! - [`TransientHamt`]: in place. `put`/`del` edit the tables on the
//!   descent path and take `&mut self`.
//!
//! Both run over the same node types and convert into each other.
//!
//! # Widths
//!
//! [`Bits30`] slices a 30-bit FNV-1a hash into six 5-bit chunks (32-way
//! tables); [`Bits60`] slices a 60-bit hash into ten 6-bit chunks (64-way
//! tables). Keys whose full hashes collide share a collision leaf.
//!
//! # References
//!
//! - Bagwell, 2001. "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod hash;
pub mod iter;
pub mod node;
pub mod stats;
pub mod stream;
pub mod table;

mod map;
mod ops;
mod transient;
mod trie;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError, TableOption};
pub use hash::{Bits30, Bits60, HashKey, HashVal, Width};
pub use map::Hamt;
pub use stats::{InvariantError, Stats};
pub use stream::{CancelToken, Stream};
pub use transient::TransientHamt;

/// Persistent map over 30-bit hashes.
pub type Hamt32<K, V> = Hamt<K, V, Bits30>;

/// Persistent map over 60-bit hashes.
pub type Hamt64<K, V> = Hamt<K, V, Bits60>;

/// Transient map over 30-bit hashes.
pub type TransientHamt32<K, V> = TransientHamt<K, V, Bits30>;

/// Transient map over 60-bit hashes.
pub type TransientHamt64<K, V> = TransientHamt<K, V, Bits60>;
