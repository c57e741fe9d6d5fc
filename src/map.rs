//! Persistent (functional) map.

use std::fmt;
use std::ops;

use crate::config::{Config, ConfigError, Grading};
use crate::hash::{HashKey, Width};
use crate::iter::Iter;
use crate::stats::{InvariantError, Stats};
use crate::stream::{CancelToken, Stream};
use crate::transient::TransientHamt;
use crate::trie::Trie;

/// Persistent hash array mapped trie.
///
/// A map value is never mutated once built. [`put`](Self::put) and
/// [`del`](Self::del) return a new map that shares every untouched subtree
/// with the old one, so old versions stay valid and may be read from any
/// number of threads. Cloning is O(1).
pub struct Hamt<K, V, W> {
    trie: Trie<K, V, W>,
}

// ---------------------------------------------------------------------------
// Construction & accessors (no key bounds)
// ---------------------------------------------------------------------------

impl<K, V, W: Width> Hamt<K, V, W> {
    /// Creates an empty map with hybrid grading and default thresholds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            trie: Trie::new(Grading::default_for::<W>()),
        }
    }

    /// Creates an empty map with the given table policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the thresholds do not fit the width.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            trie: Trie::new(Grading::resolve::<W>(&config)?),
        })
    }

    pub(crate) const fn from_trie(trie: Trie<K, V, W>) -> Self {
        Self { trie }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.trie.len
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.trie.len == 0
    }

    /// Returns an iterator over `(&K, &V)` pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, W> {
        self.trie.iter()
    }

    /// Returns the table policy with its resolved thresholds.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.trie.grading.config()
    }

    /// Collects structural statistics.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.trie.stats()
    }

    /// Returns an in-place map with the same contents.
    ///
    /// Every table is copied up front, so edits to the transient map never
    /// disturb this one.
    #[must_use]
    pub fn transient(&self) -> TransientHamt<K, V, W> {
        TransientHamt::from_trie(self.trie.deep_copy())
    }
}

impl<K, V, W> Hamt<K, V, W>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    W: Width,
{
    /// Streams cloned pairs from a background thread through a channel
    /// holding at most `buffer` pairs.
    ///
    /// The stream stops before its next send once `token` is cancelled or
    /// the stream is dropped.
    #[must_use]
    pub fn stream(&self, buffer: usize, token: CancelToken) -> Stream<K, V> {
        Stream::spawn(self.trie.root.clone(), buffer, token)
    }
}

// ---------------------------------------------------------------------------
// Read operations (K: HashKey)
// ---------------------------------------------------------------------------

impl<K: HashKey, V, W: Width> Hamt<K, V, W> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.trie.get(key)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Checks every structural invariant of the trie.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found.
    pub fn validate(&self) -> Result<(), InvariantError> {
        self.trie.validate()
    }
}

// ---------------------------------------------------------------------------
// Write operations (K: HashKey + Clone, V: Clone)
// ---------------------------------------------------------------------------

impl<K: HashKey + Clone, V: Clone, W: Width> Hamt<K, V, W> {
    /// Returns a map with `key -> value` added, and `true` if the key was
    /// new. `self` is unchanged.
    #[must_use]
    pub fn put(&self, key: K, value: V) -> (Self, bool) {
        let (trie, added) = self.trie.put_persistent(key, value);
        (Self { trie }, added)
    }

    /// Returns a map without `key` and the removed value. If the key is
    /// absent the returned map shares the whole trie with `self`.
    #[must_use]
    pub fn del(&self, key: &K) -> (Self, Option<V>) {
        self.trie
            .del_persistent(key)
            .map_or_else(|| (self.clone(), None), |(trie, value)| (Self { trie }, Some(value)))
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, W> Clone for Hamt<K, V, W> {
    fn clone(&self) -> Self {
        Self {
            trie: self.trie.clone(),
        }
    }
}

impl<K, V, W: Width> Default for Hamt<K, V, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, W: Width> fmt::Debug for Hamt<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hamt")
            .field("len", &self.trie.len)
            .field("width", &W::HASH_BITS)
            .field("tables", &self.trie.grading.tables)
            .finish_non_exhaustive()
    }
}

impl<K: HashKey + Clone, V: Clone, W: Width> FromIterator<(K, V)> for Hamt<K, V, W> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHamt::new();
        transient.extend(iter);
        transient.persistent()
    }
}

impl<K: HashKey, V: PartialEq, W: Width> PartialEq for Hamt<K, V, W> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: HashKey, V: Eq, W: Width> Eq for Hamt<K, V, W> {}

impl<K: HashKey, V, W: Width> ops::Index<&K> for Hamt<K, V, W> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, W: Width> IntoIterator for &'a Hamt<K, V, W> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, W>;

    fn into_iter(self) -> Iter<'a, K, V, W> {
        self.iter()
    }
}
