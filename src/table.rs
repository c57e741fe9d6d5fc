//! Interior nodes: bitmap-compressed sparse tables and dense fixed tables.
//!
//! Both kinds address children by the index chunk of the hash at their
//! depth. A sparse table stores only occupied slots, located by popcount
//! over its bitmap; a fixed table stores every slot.
//!
//! Cloning a table is the shallow `copy()`: the slot array is duplicated,
//! the children are shared.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::config::Grading;
use crate::hash::{HashVal, Width};
use crate::node::Node;

/// Returns the single-bit mask for slot `idx`.
#[inline]
#[must_use]
pub const fn mask(idx: usize) -> u64 {
    1 << idx
}

/// Returns the compacted position of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
#[must_use]
pub const fn slot_index(bitmap: u64, bit: u64) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

/// Physical representation of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Bitmap plus compacted child array.
    Sparse,
    /// One slot per index value.
    Fixed,
}

/// Single-slot edit applied to a table.
pub(crate) enum SlotOp<K, V, W> {
    /// Fill an empty slot.
    Insert(Node<K, V, W>),
    /// Overwrite an occupied slot.
    Replace(Node<K, V, W>),
    /// Clear an occupied slot.
    Remove,
}

// ---------------------------------------------------------------------------
// SparseTable
// ---------------------------------------------------------------------------

/// Bitmap-indexed table.
///
/// Invariant: `bitmap.count_ones() == children.len()`, and `children` is
/// ordered by slot index.
pub struct SparseTable<K, V, W> {
    path: HashVal<W>,
    depth: usize,
    bitmap: u64,
    children: Vec<Node<K, V, W>>,
}

impl<K, V, W: Width> SparseTable<K, V, W> {
    /// Creates an empty table at `depth` below hash prefix `path`.
    #[must_use]
    pub const fn new(path: HashVal<W>, depth: usize) -> Self {
        Self {
            path,
            depth,
            bitmap: 0,
            children: Vec::new(),
        }
    }

    fn from_entries<'a>(
        path: HashVal<W>,
        depth: usize,
        entries: impl IntoIterator<Item = (usize, &'a Node<K, V, W>)>,
    ) -> Self
    where
        K: 'a,
        V: 'a,
    {
        let mut table = Self::new(path, depth);
        for (idx, node) in entries {
            table.bitmap |= mask(idx);
            table.children.push(node.clone());
        }
        table
    }

    /// Returns the occupancy bitmap.
    #[must_use]
    pub const fn bitmap(&self) -> u64 {
        self.bitmap
    }

    /// Returns the compacted child array.
    #[must_use]
    pub fn children(&self) -> &[Node<K, V, W>] {
        &self.children
    }

    fn get(&self, idx: usize) -> Option<&Node<K, V, W>> {
        let bit = mask(idx);
        if self.bitmap & bit == 0 {
            None
        } else {
            Some(&self.children[slot_index(self.bitmap, bit)])
        }
    }

    fn get_mut(&mut self, idx: usize) -> Option<&mut Node<K, V, W>> {
        let bit = mask(idx);
        if self.bitmap & bit == 0 {
            None
        } else {
            Some(&mut self.children[slot_index(self.bitmap, bit)])
        }
    }

    fn insert(&mut self, idx: usize, node: Node<K, V, W>) {
        let bit = mask(idx);
        assert!(self.bitmap & bit == 0, "insert into occupied slot {idx}");
        self.children.insert(slot_index(self.bitmap, bit), node);
        self.bitmap |= bit;
    }

    fn remove(&mut self, idx: usize) -> Node<K, V, W> {
        let bit = mask(idx);
        assert!(self.bitmap & bit != 0, "remove from empty slot {idx}");
        let old = self.children.remove(slot_index(self.bitmap, bit));
        self.bitmap &= !bit;
        old
    }

    fn entries(&self) -> Vec<(usize, &Node<K, V, W>)> {
        let mut bits = self.bitmap;
        let mut out = Vec::with_capacity(self.children.len());
        for child in &self.children {
            out.push((bits.trailing_zeros() as usize, child));
            bits &= bits.wrapping_sub(1);
        }
        out
    }
}

impl<K, V, W> Clone for SparseTable<K, V, W> {
    fn clone(&self) -> Self {
        Self {
            path: self.path,
            depth: self.depth,
            bitmap: self.bitmap,
            children: self.children.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// FixedTable
// ---------------------------------------------------------------------------

/// Dense table with one slot per index value.
///
/// Invariant: `count` equals the number of occupied slots.
pub struct FixedTable<K, V, W> {
    path: HashVal<W>,
    depth: usize,
    count: usize,
    slots: Vec<Option<Node<K, V, W>>>,
}

impl<K, V, W: Width> FixedTable<K, V, W> {
    /// Creates an empty table at `depth` below hash prefix `path`.
    #[must_use]
    pub fn new(path: HashVal<W>, depth: usize) -> Self {
        let mut slots = Vec::with_capacity(W::FAN_OUT);
        slots.resize_with(W::FAN_OUT, || None);
        Self {
            path,
            depth,
            count: 0,
            slots,
        }
    }

    fn from_entries<'a>(
        path: HashVal<W>,
        depth: usize,
        entries: impl IntoIterator<Item = (usize, &'a Node<K, V, W>)>,
    ) -> Self
    where
        K: 'a,
        V: 'a,
    {
        let mut table = Self::new(path, depth);
        for (idx, node) in entries {
            table.slots[idx] = Some(node.clone());
            table.count += 1;
        }
        table
    }

    /// Returns the full slot array.
    #[must_use]
    pub fn slots(&self) -> &[Option<Node<K, V, W>>] {
        &self.slots
    }

    fn insert(&mut self, idx: usize, node: Node<K, V, W>) {
        let slot = &mut self.slots[idx];
        assert!(slot.is_none(), "insert into occupied slot {idx}");
        *slot = Some(node);
        self.count += 1;
    }

    fn remove(&mut self, idx: usize) -> Node<K, V, W> {
        let old = self.slots[idx]
            .take()
            .unwrap_or_else(|| panic!("remove from empty slot {idx}"));
        self.count -= 1;
        old
    }

    fn entries(&self) -> Vec<(usize, &Node<K, V, W>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|node| (idx, node)))
            .collect()
    }
}

impl<K, V, W> Clone for FixedTable<K, V, W> {
    fn clone(&self) -> Self {
        Self {
            path: self.path,
            depth: self.depth,
            count: self.count,
            slots: self.slots.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Interior trie node.
pub enum Table<K, V, W> {
    /// Bitmap-compressed representation.
    Sparse(SparseTable<K, V, W>),
    /// Dense representation.
    Fixed(FixedTable<K, V, W>),
}

impl<K, V, W: Width> Table<K, V, W> {
    /// Creates an empty table of the kind `grading` starts with.
    pub(crate) fn empty(path: HashVal<W>, depth: usize, grading: Grading) -> Self {
        if grading.starts_fixed() {
            Self::Fixed(FixedTable::new(path, depth))
        } else {
            Self::Sparse(SparseTable::new(path, depth))
        }
    }

    /// Returns the physical representation.
    #[must_use]
    pub const fn kind(&self) -> TableKind {
        match self {
            Self::Sparse(_) => TableKind::Sparse,
            Self::Fixed(_) => TableKind::Fixed,
        }
    }

    /// Returns the hash prefix fixed by this table's ancestors.
    #[must_use]
    pub const fn hash_path(&self) -> HashVal<W> {
        match self {
            Self::Sparse(t) => t.path,
            Self::Fixed(t) => t.path,
        }
    }

    /// Returns the depth of this table; the root is at depth 0.
    #[must_use]
    pub const fn depth(&self) -> usize {
        match self {
            Self::Sparse(t) => t.depth,
            Self::Fixed(t) => t.depth,
        }
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub const fn nentries(&self) -> usize {
        match self {
            Self::Sparse(t) => t.children.len(),
            Self::Fixed(t) => t.count,
        }
    }

    /// Returns the child in slot `idx`.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Node<K, V, W>> {
        match self {
            Self::Sparse(t) => t.get(idx),
            Self::Fixed(t) => t.slots[idx].as_ref(),
        }
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Node<K, V, W>> {
        match self {
            Self::Sparse(t) => t.get_mut(idx),
            Self::Fixed(t) => t.slots[idx].as_mut(),
        }
    }

    /// Returns `(idx, child)` for every occupied slot, ascending by `idx`.
    #[must_use]
    pub fn entries(&self) -> Vec<(usize, &Node<K, V, W>)> {
        match self {
            Self::Sparse(t) => t.entries(),
            Self::Fixed(t) => t.entries(),
        }
    }

    /// Returns the first child at physical position `pos` or later, with the
    /// position to resume from.
    pub(crate) fn next_child(&self, pos: usize) -> Option<(usize, &Node<K, V, W>)> {
        match self {
            Self::Sparse(t) => t.children.get(pos).map(|child| (pos + 1, child)),
            Self::Fixed(t) => t.slots.get(pos..)?.iter().enumerate().find_map(|(i, slot)| {
                slot.as_ref().map(|child| (pos + i + 1, child))
            }),
        }
    }

    /// Fills empty slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is occupied.
    pub fn insert(&mut self, idx: usize, node: Node<K, V, W>) {
        match self {
            Self::Sparse(t) => t.insert(idx, node),
            Self::Fixed(t) => t.insert(idx, node),
        }
    }

    /// Overwrites occupied slot `idx`, returning the previous child.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty.
    pub fn replace(&mut self, idx: usize, node: Node<K, V, W>) -> Node<K, V, W> {
        let slot = self
            .get_mut(idx)
            .unwrap_or_else(|| panic!("replace of empty slot {idx}"));
        std::mem::replace(slot, node)
    }

    /// Clears occupied slot `idx`, returning the removed child.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty.
    pub fn remove(&mut self, idx: usize) -> Node<K, V, W> {
        match self {
            Self::Sparse(t) => t.remove(idx),
            Self::Fixed(t) => t.remove(idx),
        }
    }

    /// Copies this table and every descendant table. Leaves stay shared.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let mut copy = self.clone();
        let children: Box<dyn Iterator<Item = &mut Node<K, V, W>>> = match &mut copy {
            Self::Sparse(t) => Box::new(t.children.iter_mut()),
            Self::Fixed(t) => Box::new(t.slots.iter_mut().flatten()),
        };
        for child in children {
            if let Node::Table(table) = child {
                *table = Arc::new(table.deep_copy());
            }
        }
        copy
    }

    /// Returns an equivalent fixed table.
    #[must_use]
    pub fn to_fixed(&self) -> FixedTable<K, V, W> {
        FixedTable::from_entries(self.hash_path(), self.depth(), self.entries())
    }

    /// Returns an equivalent sparse table.
    #[must_use]
    pub fn to_sparse(&self) -> SparseTable<K, V, W> {
        SparseTable::from_entries(self.hash_path(), self.depth(), self.entries())
    }

    /// Applies `op` to slot `idx`, grading the representation around it.
    pub(crate) fn apply(&mut self, idx: usize, op: SlotOp<K, V, W>, grading: Grading) {
        match op {
            SlotOp::Insert(node) => {
                if grading.grades()
                    && self.kind() == TableKind::Sparse
                    && self.nentries() >= grading.upgrade
                {
                    trace!(
                        target: "hamt::table",
                        depth = self.depth(),
                        entries = self.nentries(),
                        "promoting sparse table to fixed"
                    );
                    let fixed = self.to_fixed();
                    *self = Self::Fixed(fixed);
                }
                self.insert(idx, node);
            }
            SlotOp::Replace(node) => {
                self.replace(idx, node);
            }
            SlotOp::Remove => {
                self.remove(idx);
                if grading.grades()
                    && self.kind() == TableKind::Fixed
                    && self.nentries() <= grading.downgrade
                {
                    trace!(
                        target: "hamt::table",
                        depth = self.depth(),
                        entries = self.nentries(),
                        "demoting fixed table to sparse"
                    );
                    let sparse = self.to_sparse();
                    *self = Self::Sparse(sparse);
                }
            }
        }
    }
}

impl<K, V, W> Clone for Table<K, V, W> {
    fn clone(&self) -> Self {
        match self {
            Self::Sparse(t) => Self::Sparse(t.clone()),
            Self::Fixed(t) => Self::Fixed(t.clone()),
        }
    }
}

impl<K, V, W: Width> fmt::Debug for Table<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = match self {
            Self::Sparse(t) => {
                let mut s = f.debug_struct("SparseTable");
                s.field("bitmap", &format_args!("{:#066b}", t.bitmap));
                s
            }
            Self::Fixed(_) => f.debug_struct("FixedTable"),
        };
        s.field("depth", &self.depth())
            .field("path", &self.hash_path().path_string(self.depth()))
            .field("nentries", &self.nentries())
            .finish()
    }
}
