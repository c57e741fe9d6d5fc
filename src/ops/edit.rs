//! Applying a planned single-slot edit, persistently or in place.
//!
//! Planning walks the trie read-only and yields the slot to change plus
//! the change itself. Collapses are resolved during planning, so applying
//! an edit never touches more than one slot.

use std::sync::Arc;

use crate::config::Grading;
use crate::hash::Width;
use crate::node::Node;
use crate::table::{SlotOp, Table};

/// A change to one slot of one table.
pub struct Edit<K, V, W> {
    /// Slot indices from the root down; the last one is the edited slot,
    /// the others select the tables leading to it.
    pub path: Vec<usize>,
    /// The change.
    pub op: SlotOp<K, V, W>,
}

impl<K, V, W: Width> Edit<K, V, W> {
    fn split(&self) -> (usize, &[usize]) {
        let (&slot, above) = self.path.split_last().expect("edit path is never empty");
        (slot, above)
    }

    /// `true` if applying this edit leaves the root table empty.
    fn empties_root(&self, root: &Table<K, V, W>) -> bool {
        self.path.len() == 1 && matches!(self.op, SlotOp::Remove) && root.nentries() == 1
    }
}

/// Copies the edited table and every ancestor up to the root, sharing all
/// untouched subtrees with `root`. Returns the new root, or `None` if the
/// trie is now empty.
pub fn persistent<K, V, W: Width>(
    root: &Arc<Table<K, V, W>>,
    edit: Edit<K, V, W>,
    grading: Grading,
) -> Option<Arc<Table<K, V, W>>> {
    if edit.empties_root(root) {
        return None;
    }
    let (slot, above) = edit.split();
    let above = above.to_vec();

    let mut ancestors: Vec<&Table<K, V, W>> = Vec::with_capacity(above.len());
    let mut table: &Table<K, V, W> = root;
    for &idx in &above {
        ancestors.push(table);
        table = match table.get(idx) {
            Some(Node::Table(child)) => &**child,
            _ => panic!("edit path leaves the table chain at depth {}", ancestors.len()),
        };
    }

    let mut edited = table.clone();
    edited.apply(slot, edit.op, grading);

    for (parent, &idx) in ancestors.iter().rev().zip(above.iter().rev()) {
        let mut copy = (*parent).clone();
        copy.replace(idx, Node::table(edited));
        edited = copy;
    }
    Some(Arc::new(edited))
}

/// Mutates the tables on the edit path directly.
///
/// Tables still shared with another map are copied once on the way down,
/// so a persistent version is never disturbed.
pub fn in_place<K, V, W: Width>(
    root: &mut Option<Arc<Table<K, V, W>>>,
    edit: Edit<K, V, W>,
    grading: Grading,
) {
    let Some(root_table) = root.as_mut() else {
        panic!("edit applied to an empty trie");
    };
    if edit.empties_root(root_table) {
        *root = None;
        return;
    }
    let (slot, above) = edit.split();
    let above = above.to_vec();

    let mut table = Arc::make_mut(root_table);
    for (depth, &idx) in above.iter().enumerate() {
        table = match table.get_mut(idx) {
            Some(Node::Table(child)) => Arc::make_mut(child),
            _ => panic!("edit path leaves the table chain at depth {depth}"),
        };
    }
    table.apply(slot, edit.op, grading);
}
