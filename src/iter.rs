//! Pull-style pre-order traversal.

use std::iter::FusedIterator;

use crate::hash::Width;
use crate::node::{KeyVal, Node};
use crate::table::Table;

/// Iterator over `(&K, &V)` pairs of a map.
///
/// Order follows hash bits and insertion history, not key order. Walks an
/// explicit stack of `(table, next position)` cursors, so depth never
/// exceeds `W::DEPTH_LIMIT` frames.
pub struct Iter<'a, K, V, W> {
    stack: Vec<(&'a Table<K, V, W>, usize)>,
    pending: std::slice::Iter<'a, KeyVal<K, V>>,
}

impl<'a, K, V, W: Width> Iter<'a, K, V, W> {
    /// Starts a traversal at `root`.
    #[must_use]
    pub fn new(root: Option<&'a Table<K, V, W>>) -> Self {
        let mut stack = Vec::with_capacity(W::DEPTH_LIMIT);
        if let Some(root) = root {
            stack.push((root, 0));
        }
        Self {
            stack,
            pending: <&[KeyVal<K, V>]>::default().iter(),
        }
    }
}

impl<'a, K, V, W: Width> Iterator for Iter<'a, K, V, W> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(kv) = self.pending.next() {
                return Some((&kv.key, &kv.value));
            }
            let (table, pos) = self.stack.last_mut()?;
            let table: &'a Table<K, V, W> = *table;
            let found = table.next_child(*pos);
            if let Some((resume, _)) = found {
                *pos = resume;
            }
            match found {
                None => {
                    self.stack.pop();
                }
                Some((_, Node::Leaf(leaf))) => self.pending = leaf.pairs().iter(),
                Some((_, Node::Table(sub))) => self.stack.push((&**sub, 0)),
            }
        }
    }
}

impl<K, V, W: Width> FusedIterator for Iter<'_, K, V, W> {}
