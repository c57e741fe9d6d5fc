//! Root structure shared by the persistent and transient maps.

use std::sync::Arc;

use crate::config::Grading;
use crate::hash::{HashKey, HashVal, Width};
use crate::iter::Iter;
use crate::node::{Leaf, Node};
use crate::ops::edit;
use crate::ops::get::get;
use crate::ops::insert::plan_insert;
use crate::ops::remove::plan_remove;
use crate::stats::{self, InvariantError, Stats};
use crate::table::Table;

/// Root table, entry count, and grading policy.
pub struct Trie<K, V, W> {
    pub root: Option<Arc<Table<K, V, W>>>,
    pub len: usize,
    pub grading: Grading,
}

impl<K, V, W: Width> Trie<K, V, W> {
    pub const fn new(grading: Grading) -> Self {
        Self {
            root: None,
            len: 0,
            grading,
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V, W> {
        Iter::new(self.root.as_deref())
    }

    pub fn stats(&self) -> Stats {
        stats::collect(self.root.as_deref())
    }

    /// Copies every table; leaves stay shared.
    pub fn deep_copy(&self) -> Self {
        Self {
            root: self.root.as_ref().map(|root| Arc::new(root.deep_copy())),
            len: self.len,
            grading: self.grading,
        }
    }

    fn singleton(hash: HashVal<W>, leaf: Leaf<K, V, W>, grading: Grading) -> Arc<Table<K, V, W>> {
        let mut root = Table::empty(HashVal::from_raw(0), 0, grading);
        root.insert(hash.index(0), Node::leaf(leaf));
        Arc::new(root)
    }
}

impl<K: HashKey, V, W: Width> Trie<K, V, W> {
    pub fn get(&self, key: &K) -> Option<&V> {
        let root = self.root.as_deref()?;
        get(root, key.hash_val(), key)
    }

    pub fn validate(&self) -> Result<(), InvariantError> {
        stats::validate(self.root.as_deref(), self.len)
    }
}

impl<K: HashKey + Clone, V: Clone, W: Width> Trie<K, V, W> {
    /// Copy-on-write insert: `self` is left untouched.
    pub fn put_persistent(&self, key: K, value: V) -> (Self, bool) {
        let hash: HashVal<W> = key.hash_val();
        let Some(root) = &self.root else {
            let root = Self::singleton(hash, Leaf::flat(hash, key, value), self.grading);
            return (
                Self {
                    root: Some(root),
                    len: 1,
                    grading: self.grading,
                },
                true,
            );
        };
        let plan = plan_insert(root, hash, key, value, self.grading);
        let trie = Self {
            root: edit::persistent(root, plan.edit, self.grading),
            len: self.len + usize::from(plan.added),
            grading: self.grading,
        };
        (trie, plan.added)
    }

    /// In-place insert.
    pub fn put_in_place(&mut self, key: K, value: V) -> bool {
        let hash: HashVal<W> = key.hash_val();
        let Some(root) = &self.root else {
            self.root = Some(Self::singleton(hash, Leaf::flat(hash, key, value), self.grading));
            self.len = 1;
            return true;
        };
        let plan = plan_insert(root, hash, key, value, self.grading);
        edit::in_place(&mut self.root, plan.edit, self.grading);
        if plan.added {
            self.len += 1;
        }
        plan.added
    }

    /// Copy-on-write delete. Returns `None` if `key` is absent.
    pub fn del_persistent(&self, key: &K) -> Option<(Self, V)> {
        let root = self.root.as_ref()?;
        let plan = plan_remove(root, key.hash_val(), key)?;
        let trie = Self {
            root: edit::persistent(root, plan.edit, self.grading),
            len: self.len - 1,
            grading: self.grading,
        };
        Some((trie, plan.value))
    }

    /// In-place delete.
    pub fn del_in_place(&mut self, key: &K) -> Option<V> {
        let root = self.root.as_ref()?;
        let plan = plan_remove(root, key.hash_val(), key)?;
        edit::in_place(&mut self.root, plan.edit, self.grading);
        self.len -= 1;
        Some(plan.value)
    }
}

impl<K, V, W> Clone for Trie<K, V, W> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
            grading: self.grading,
        }
    }
}
