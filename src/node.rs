//! Trie node kinds: leaves and the shared node handle.
//!
//! Leaves are immutable once built. Every "modification" of a leaf returns
//! a fresh leaf, so a leaf may be shared by any number of tables and maps.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::hash::{HashVal, Width};
use crate::table::Table;

/// A key paired with its value.
pub struct KeyVal<K, V> {
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

impl<K: Clone, V: Clone> Clone for KeyVal<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for KeyVal<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.key, self.value)
    }
}

/// Terminal trie node.
pub enum Leaf<K, V, W> {
    /// Exactly one pair.
    Flat {
        /// Full hash of `kv.key`.
        hash: HashVal<W>,
        /// The stored pair.
        kv: KeyVal<K, V>,
    },
    /// Two or more pairs whose keys share the full hash.
    ///
    /// Invariant: `entries.len() >= 2`.
    Collision {
        /// The shared hash.
        hash: HashVal<W>,
        /// Pairs in insertion order.
        entries: Vec<KeyVal<K, V>>,
    },
}

/// Outcome of [`Leaf::del`].
pub struct LeafDel<K, V, W> {
    /// Value of the removed pair.
    pub value: V,
    /// Leaf left behind, or `None` if the last pair was removed.
    pub rest: Option<Leaf<K, V, W>>,
}

impl<K, V, W: Width> Leaf<K, V, W> {
    /// Builds a single-pair leaf.
    #[must_use]
    pub const fn flat(hash: HashVal<W>, key: K, value: V) -> Self {
        Self::Flat {
            hash,
            kv: KeyVal { key, value },
        }
    }

    /// Returns the hash shared by every pair in this leaf.
    #[must_use]
    pub const fn hash(&self) -> HashVal<W> {
        match self {
            Self::Flat { hash, .. } | Self::Collision { hash, .. } => *hash,
        }
    }

    /// Returns the stored pairs.
    #[must_use]
    pub fn pairs(&self) -> &[KeyVal<K, V>] {
        match self {
            Self::Flat { kv, .. } => std::slice::from_ref(kv),
            Self::Collision { entries, .. } => entries,
        }
    }

    /// Returns the number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs().len()
    }

    /// Always `false`: a leaf holds at least one pair.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl<K: Eq, V, W: Width> Leaf<K, V, W> {
    /// Looks up `key` among the stored pairs.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.pairs()
            .iter()
            .find(|kv| kv.key == *key)
            .map(|kv| &kv.value)
    }
}

impl<K: Eq + Clone, V: Clone, W: Width> Leaf<K, V, W> {
    /// Returns a leaf holding `key -> value` in addition to (or in place of)
    /// this leaf's pairs, and whether the key was new.
    ///
    /// The caller guarantees `key` hashes to [`hash`](Self::hash).
    #[must_use]
    pub fn put(&self, key: K, value: V) -> (Self, bool) {
        let hash = self.hash();
        match self {
            Self::Flat { kv, .. } if kv.key == key => (Self::flat(hash, key, value), false),
            Self::Flat { kv, .. } => {
                trace!(target: "hamt::put", %hash, "collision leaf created");
                let entries = vec![kv.clone(), KeyVal { key, value }];
                (Self::Collision { hash, entries }, true)
            }
            Self::Collision { entries, .. } => {
                let mut entries = entries.clone();
                if let Some(kv) = entries.iter_mut().find(|kv| kv.key == key) {
                    kv.value = value;
                    (Self::Collision { hash, entries }, false)
                } else {
                    entries.push(KeyVal { key, value });
                    (Self::Collision { hash, entries }, true)
                }
            }
        }
    }

    /// Removes `key`, returning its value and the leaf left behind.
    ///
    /// A collision leaf shrinking to one pair degrades to a flat leaf.
    #[must_use]
    pub fn del(&self, key: &K) -> Option<LeafDel<K, V, W>> {
        let hash = self.hash();
        match self {
            Self::Flat { kv, .. } if kv.key == *key => Some(LeafDel {
                value: kv.value.clone(),
                rest: None,
            }),
            Self::Flat { .. } => None,
            Self::Collision { entries, .. } => {
                let pos = entries.iter().position(|kv| kv.key == *key)?;
                let mut entries = entries.clone();
                let removed = entries.remove(pos);
                let rest = if entries.len() == 1 {
                    let KeyVal { key, value } = entries.swap_remove(0);
                    Self::flat(hash, key, value)
                } else {
                    Self::Collision { hash, entries }
                };
                Some(LeafDel {
                    value: removed.value,
                    rest: Some(rest),
                })
            }
        }
    }

    /// Merges two leaves sharing one hash into a collision leaf.
    pub(crate) fn merge(a: &Self, b: &Self) -> Self {
        assert_eq!(a.hash(), b.hash(), "merging leaves with distinct hashes");
        trace!(target: "hamt::put", hash = %a.hash(), "collision leaf created at depth limit");
        let entries = a.pairs().iter().chain(b.pairs()).cloned().collect();
        Self::Collision {
            hash: a.hash(),
            entries,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, W> fmt::Debug for Leaf<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat { hash, kv } => f
                .debug_struct("Flat")
                .field("hash", hash)
                .field("kv", kv)
                .finish(),
            Self::Collision { hash, entries } => f
                .debug_struct("Collision")
                .field("hash", hash)
                .field("entries", entries)
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Node handle
// ---------------------------------------------------------------------------

/// Shared handle to a child of a table.
///
/// Cloning a node clones the handle, never the subtree.
pub enum Node<K, V, W> {
    /// A leaf.
    Leaf(Arc<Leaf<K, V, W>>),
    /// A subtable.
    Table(Arc<Table<K, V, W>>),
}

impl<K, V, W> Node<K, V, W> {
    /// Wraps a leaf in a fresh handle.
    #[must_use]
    pub fn leaf(leaf: Leaf<K, V, W>) -> Self {
        Self::Leaf(Arc::new(leaf))
    }

    /// Wraps a table in a fresh handle.
    #[must_use]
    pub fn table(table: Table<K, V, W>) -> Self {
        Self::Table(Arc::new(table))
    }

    /// Returns the leaf, if this is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf<K, V, W>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Table(_) => None,
        }
    }

    /// Returns the subtable, if this is one.
    #[must_use]
    pub fn as_table(&self) -> Option<&Table<K, V, W>> {
        match self {
            Self::Table(table) => Some(table),
            Self::Leaf(_) => None,
        }
    }

    /// Returns `true` if both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => Arc::ptr_eq(a, b),
            (Self::Table(a), Self::Table(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<K, V, W> Clone for Node<K, V, W> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(leaf) => Self::Leaf(Arc::clone(leaf)),
            Self::Table(table) => Self::Table(Arc::clone(table)),
        }
    }
}

impl<K, V, W> fmt::Debug for Node<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "Leaf({:p})", Arc::as_ptr(leaf)),
            Self::Table(table) => write!(f, "Table({:p})", Arc::as_ptr(table)),
        }
    }
}
