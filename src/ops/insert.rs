//! Insertion planning and subtree construction on hash divergence.

use std::sync::Arc;

use crate::config::Grading;
use crate::hash::{HashVal, Width};
use crate::node::{Leaf, Node};
use crate::ops::edit::Edit;
use crate::table::{SlotOp, Table};

/// Outcome of planning an insert.
pub struct InsertPlan<K, V, W> {
    /// Slot change realizing the insert.
    pub edit: Edit<K, V, W>,
    /// `true` if a new key was inserted, `false` if a value was replaced.
    pub added: bool,
}

/// Plans the insertion of `key -> value` into the trie rooted at `root`.
///
/// # Panics
///
/// Panics if the descent passes `W::DEPTH_LIMIT` tables without reaching
/// an empty slot or a leaf.
pub fn plan_insert<K, V, W>(
    root: &Table<K, V, W>,
    hash: HashVal<W>,
    key: K,
    value: V,
    grading: Grading,
) -> InsertPlan<K, V, W>
where
    K: Eq + Clone,
    V: Clone,
    W: Width,
{
    let mut table = root;
    let mut path = Vec::with_capacity(W::DEPTH_LIMIT);
    for depth in 0..W::DEPTH_LIMIT {
        let idx = hash.index(depth);
        path.push(idx);
        match table.get(idx) {
            None => {
                let op = SlotOp::Insert(Node::leaf(Leaf::flat(hash, key, value)));
                return InsertPlan {
                    edit: Edit { path, op },
                    added: true,
                };
            }
            Some(Node::Leaf(leaf)) if leaf.hash() == hash => {
                let (leaf, added) = leaf.put(key, value);
                let op = SlotOp::Replace(Node::leaf(leaf));
                return InsertPlan {
                    edit: Edit { path, op },
                    added,
                };
            }
            Some(Node::Leaf(leaf)) => {
                let new = Arc::new(Leaf::flat(hash, key, value));
                let op = SlotOp::Replace(branch(leaf, &new, depth + 1, grading));
                return InsertPlan {
                    edit: Edit { path, op },
                    added: true,
                };
            }
            Some(Node::Table(child)) => table = &**child,
        }
    }
    panic!("descent passed depth limit {} without reaching a slot", W::DEPTH_LIMIT);
}

/// Builds the subtree holding two leaves whose hashes agree on every chunk
/// below `depth`.
///
/// Single-child tables are chained while the chunks keep agreeing; the
/// first differing chunk gets a two-child table. Leaves still agreeing at
/// the depth limit share the full hash and are merged into a collision leaf.
pub fn branch<K, V, W>(
    a: &Arc<Leaf<K, V, W>>,
    b: &Arc<Leaf<K, V, W>>,
    depth: usize,
    grading: Grading,
) -> Node<K, V, W>
where
    K: Eq + Clone,
    V: Clone,
    W: Width,
{
    let (ha, hb) = (a.hash(), b.hash());
    let mut shared = Vec::new();
    let mut depth = depth;

    let mut node = loop {
        if depth >= W::DEPTH_LIMIT {
            break Node::leaf(Leaf::merge(a, b));
        }
        let (ia, ib) = (ha.index(depth), hb.index(depth));
        if ia != ib {
            let mut table = Table::empty(ha.path(depth), depth, grading);
            table.insert(ia, Node::Leaf(Arc::clone(a)));
            table.insert(ib, Node::Leaf(Arc::clone(b)));
            break Node::table(table);
        }
        shared.push(ia);
        depth += 1;
    };

    while let Some(idx) = shared.pop() {
        depth -= 1;
        let mut table = Table::empty(ha.path(depth), depth, grading);
        table.insert(idx, node);
        node = Node::table(table);
    }
    node
}
