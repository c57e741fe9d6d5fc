//! Deletion planning with collapse of emptied and single-leaf tables.

use std::sync::Arc;

use tracing::trace;

use crate::hash::{HashVal, Width};
use crate::node::Node;
use crate::ops::edit::Edit;
use crate::table::{SlotOp, Table};

/// Outcome of planning a delete.
pub struct RemovePlan<K, V, W> {
    /// Slot change realizing the delete.
    pub edit: Edit<K, V, W>,
    /// Value of the removed pair.
    pub value: V,
}

/// Plans the removal of `key` from the trie rooted at `root`. Returns
/// `None` if the key is absent.
///
/// A table left empty is cleared from its parent; a non-root table left
/// with a single leaf child is replaced in its parent by that leaf. Both
/// cascade upward. The root table is never collapsed.
///
/// # Panics
///
/// Panics if the descent passes `W::DEPTH_LIMIT` tables without reaching
/// an empty slot or a leaf.
pub fn plan_remove<K, V, W>(
    root: &Table<K, V, W>,
    hash: HashVal<W>,
    key: &K,
) -> Option<RemovePlan<K, V, W>>
where
    K: Eq + Clone,
    V: Clone,
    W: Width,
{
    let mut tables: Vec<&Table<K, V, W>> = Vec::with_capacity(W::DEPTH_LIMIT);
    let mut path = Vec::with_capacity(W::DEPTH_LIMIT);
    let mut table = root;

    let removed = loop {
        let depth = tables.len();
        assert!(
            depth < W::DEPTH_LIMIT,
            "descent passed depth limit {} without reaching a slot",
            W::DEPTH_LIMIT
        );
        let idx = hash.index(depth);
        tables.push(table);
        path.push(idx);
        match table.get(idx)? {
            Node::Leaf(leaf) => {
                if leaf.hash() != hash {
                    return None;
                }
                break leaf.del(key)?;
            }
            Node::Table(child) => table = &**child,
        }
    };

    let mut op = removed
        .rest
        .map_or(SlotOp::Remove, |leaf| SlotOp::Replace(Node::leaf(leaf)));

    while let (Some(&table), Some(&idx)) = (tables.last(), path.last()) {
        if tables.len() == 1 {
            break;
        }
        let next = match &op {
            SlotOp::Remove if table.nentries() == 1 => SlotOp::Remove,
            SlotOp::Remove if table.nentries() == 2 => match sibling(table, idx) {
                Some(Node::Leaf(leaf)) => SlotOp::Replace(Node::Leaf(Arc::clone(leaf))),
                _ => break,
            },
            SlotOp::Replace(Node::Leaf(leaf)) if table.nentries() == 1 => {
                SlotOp::Replace(Node::Leaf(Arc::clone(leaf)))
            }
            _ => break,
        };
        trace!(
            target: "hamt::del",
            depth = table.depth(),
            path = %table.hash_path().path_string(table.depth()),
            "collapsing table into parent"
        );
        tables.pop();
        path.pop();
        op = next;
    }

    Some(RemovePlan {
        edit: Edit { path, op },
        value: removed.value,
    })
}

/// Returns the child of `table` in any slot other than `idx`.
fn sibling<K, V, W: Width>(table: &Table<K, V, W>, idx: usize) -> Option<&Node<K, V, W>> {
    table
        .entries()
        .into_iter()
        .find(|&(i, _)| i != idx)
        .map(|(_, node)| node)
}
