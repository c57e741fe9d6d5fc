//! Transient (in-place) map.

use std::fmt;
use std::ops;

use crate::config::{Config, ConfigError, Grading};
use crate::hash::{HashKey, Width};
use crate::iter::Iter;
use crate::map::Hamt;
use crate::stats::{InvariantError, Stats};
use crate::stream::{CancelToken, Stream};
use crate::trie::Trie;

/// Hash array mapped trie mutated in place.
///
/// The map exclusively owns its tables; [`put`](Self::put) and
/// [`del`](Self::del) edit the tables on the descent path directly. The
/// `&mut self` receivers make a single writer a compile-time requirement;
/// the map provides no internal synchronization.
///
/// Converting to and from [`Hamt`] is the way to share a snapshot: a table
/// still referenced by a persistent map or a live [`Stream`] is copied the
/// first time a transient edit reaches it.
pub struct TransientHamt<K, V, W> {
    trie: Trie<K, V, W>,
}

impl<K, V, W: Width> TransientHamt<K, V, W> {
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

    /// Freezes this map into a persistent one without copying.
    #[must_use]
    pub fn persistent(self) -> Hamt<K, V, W> {
        Hamt::from_trie(self.trie)
    }
}

impl<K, V, W> TransientHamt<K, V, W>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    W: Width,
{
    /// Streams cloned pairs of the current contents from a background
    /// thread through a channel holding at most `buffer` pairs.
    ///
    /// The stream reads a snapshot; later edits to this map are not seen.
    #[must_use]
    pub fn stream(&self, buffer: usize, token: CancelToken) -> Stream<K, V> {
        Stream::spawn(self.trie.root.clone(), buffer, token)
    }
}

impl<K: HashKey, V, W: Width> TransientHamt<K, V, W> {
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

impl<K: HashKey + Clone, V: Clone, W: Width> TransientHamt<K, V, W> {
    /// Stores `key -> value`. Returns `true` if the key was new, `false` if
    /// an existing value was replaced.
    pub fn put(&mut self, key: K, value: V) -> bool {
        self.trie.put_in_place(key, value)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn del(&mut self, key: &K) -> Option<V> {
        self.trie.del_in_place(key)
    }
}

impl<K, V, W: Width> Default for TransientHamt<K, V, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, W: Width> fmt::Debug for TransientHamt<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientHamt")
            .field("len", &self.trie.len)
            .field("width", &W::HASH_BITS)
            .field("tables", &self.trie.grading.tables)
            .finish_non_exhaustive()
    }
}

impl<K: HashKey + Clone, V: Clone, W: Width> Extend<(K, V)> for TransientHamt<K, V, W> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K: HashKey + Clone, V: Clone, W: Width> FromIterator<(K, V)> for TransientHamt<K, V, W> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: HashKey, V: PartialEq, W: Width> PartialEq for TransientHamt<K, V, W> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: HashKey, V: Eq, W: Width> Eq for TransientHamt<K, V, W> {}

impl<K: HashKey, V, W: Width> ops::Index<&K> for TransientHamt<K, V, W> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, W: Width> IntoIterator for &'a TransientHamt<K, V, W> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, W>;

    fn into_iter(self) -> Iter<'a, K, V, W> {
        self.iter()
    }
}

impl<K, V, W: Width> From<Hamt<K, V, W>> for TransientHamt<K, V, W> {
    fn from(map: Hamt<K, V, W>) -> Self {
        map.transient()
    }
}

impl<K, V, W: Width> From<TransientHamt<K, V, W>> for Hamt<K, V, W> {
    fn from(map: TransientHamt<K, V, W>) -> Self {
        map.persistent()
    }
}
