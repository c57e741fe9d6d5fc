//! Structural statistics and invariant checking.
//!
//! Neither is part of the map contract; both exist so tests and debugging
//! sessions can look at the shape of a trie.

use std::fmt;

use thiserror::Error;

use crate::hash::{HashKey, HashVal, Width};
use crate::node::{Leaf, Node};
use crate::table::{Table, TableKind};

/// Shape of a trie, gathered by one pre-order walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Depth of the deepest table (root is 0).
    pub max_depth: usize,
    /// Number of tables at each depth.
    pub tables_per_depth: Vec<usize>,
    /// Number of sparse tables.
    pub sparse_tables: usize,
    /// Number of fixed tables.
    pub fixed_tables: usize,
    /// Number of single-pair leaves.
    pub flat_leaves: usize,
    /// Number of collision leaves.
    pub collision_leaves: usize,
    /// Number of stored pairs.
    pub pairs: usize,
}

impl Stats {
    /// Total number of tables.
    #[must_use]
    pub const fn tables(&self) -> usize {
        self.sparse_tables + self.fixed_tables
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pairs: {}", self.pairs)?;
        writeln!(
            f,
            "tables: {} sparse, {} fixed, max depth {}",
            self.sparse_tables, self.fixed_tables, self.max_depth
        )?;
        for (depth, n) in self.tables_per_depth.iter().enumerate() {
            writeln!(f, "  depth {depth}: {n}")?;
        }
        write!(
            f,
            "leaves: {} flat, {} collision",
            self.flat_leaves, self.collision_leaves
        )
    }
}

pub(crate) fn collect<K, V, W: Width>(root: Option<&Table<K, V, W>>) -> Stats {
    let mut stats = Stats::default();
    let mut stack: Vec<&Table<K, V, W>> = root.into_iter().collect();
    while let Some(table) = stack.pop() {
        let depth = table.depth();
        stats.max_depth = stats.max_depth.max(depth);
        if stats.tables_per_depth.len() <= depth {
            stats.tables_per_depth.resize(depth + 1, 0);
        }
        stats.tables_per_depth[depth] += 1;
        match table.kind() {
            TableKind::Sparse => stats.sparse_tables += 1,
            TableKind::Fixed => stats.fixed_tables += 1,
        }
        for (_, child) in table.entries() {
            match child {
                Node::Table(sub) => stack.push(&**sub),
                Node::Leaf(leaf) => {
                    match **leaf {
                        Leaf::Flat { .. } => stats.flat_leaves += 1,
                        Leaf::Collision { .. } => stats.collision_leaves += 1,
                    }
                    stats.pairs += leaf.len();
                }
            }
        }
    }
    stats
}

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// A table with no children.
    #[error("empty table at {path}")]
    EmptyTable {
        /// Hash path of the table.
        path: String,
    },
    /// Occupancy count disagrees with the occupied slots.
    #[error("table at {path} reports {reported} entries but holds {actual}")]
    Occupancy {
        /// Hash path of the table.
        path: String,
        /// Stored count.
        reported: usize,
        /// Occupied slots.
        actual: usize,
    },
    /// Sparse bitmap population disagrees with the child array.
    #[error("sparse table at {path} has {bits} bitmap bits but {children} children")]
    Bitmap {
        /// Hash path of the table.
        path: String,
        /// Set bits.
        bits: usize,
        /// Child array length.
        children: usize,
    },
    /// A non-root table whose only child is a leaf.
    #[error("uncollapsed single-leaf table at {path}")]
    SingleLeafTable {
        /// Hash path of the table.
        path: String,
    },
    /// A table whose recorded depth or hash path disagrees with its position.
    #[error("table at {path} records depth {depth} and path {recorded}")]
    Misplaced {
        /// Position in the trie.
        path: String,
        /// Recorded depth.
        depth: usize,
        /// Recorded hash path.
        recorded: String,
    },
    /// A table at or below the depth limit.
    #[error("table at {path} is deeper than the depth limit")]
    TooDeep {
        /// Hash path of the table.
        path: String,
    },
    /// A leaf whose hash does not lead to its slot, or a pair whose key
    /// does not hash to its leaf.
    #[error("leaf with hash {hash} stored at {path}")]
    LeafMisplaced {
        /// Slot path.
        path: String,
        /// Offending hash.
        hash: String,
    },
    /// A collision leaf with fewer than two pairs.
    #[error("collision leaf at {path} holds {len} pair(s)")]
    ShortCollision {
        /// Slot path.
        path: String,
        /// Pair count.
        len: usize,
    },
    /// Reachable pairs disagree with the map's entry count.
    #[error("map counts {expected} entries but {actual} are reachable")]
    Count {
        /// Stored entry count.
        expected: usize,
        /// Reachable pairs.
        actual: usize,
    },
}

pub(crate) fn validate<K: HashKey, V, W: Width>(
    root: Option<&Table<K, V, W>>,
    len: usize,
) -> Result<(), InvariantError> {
    let mut pairs = 0;
    let mut stack: Vec<(&Table<K, V, W>, usize, HashVal<W>)> = root
        .into_iter()
        .map(|t| (t, 0, HashVal::from_raw(0)))
        .collect();

    while let Some((table, depth, path)) = stack.pop() {
        let at = path.path_string(depth);
        if depth >= W::DEPTH_LIMIT {
            return Err(InvariantError::TooDeep { path: at });
        }
        if table.depth() != depth || table.hash_path() != path {
            return Err(InvariantError::Misplaced {
                path: at,
                depth: table.depth(),
                recorded: table.hash_path().path_string(table.depth()),
            });
        }
        let entries = table.entries();
        if entries.is_empty() {
            return Err(InvariantError::EmptyTable { path: at });
        }
        if table.nentries() != entries.len() {
            return Err(InvariantError::Occupancy {
                path: at,
                reported: table.nentries(),
                actual: entries.len(),
            });
        }
        if let Table::Sparse(sparse) = table {
            let bits = sparse.bitmap().count_ones() as usize;
            if bits != sparse.children().len() {
                return Err(InvariantError::Bitmap {
                    path: at,
                    bits,
                    children: sparse.children().len(),
                });
            }
        }
        if depth > 0 && matches!(entries.as_slice(), [(_, Node::Leaf(_))]) {
            return Err(InvariantError::SingleLeafTable { path: at });
        }

        for (idx, child) in entries {
            let slot = path.with_index(idx, depth);
            match child {
                Node::Table(sub) => stack.push((&**sub, depth + 1, slot)),
                Node::Leaf(leaf) => {
                    check_leaf(leaf, slot, depth + 1)?;
                    pairs += leaf.len();
                }
            }
        }
    }

    if pairs == len {
        Ok(())
    } else {
        Err(InvariantError::Count {
            expected: len,
            actual: pairs,
        })
    }
}

fn check_leaf<K: HashKey, V, W: Width>(
    leaf: &Leaf<K, V, W>,
    slot: HashVal<W>,
    depth: usize,
) -> Result<(), InvariantError> {
    let misplaced = |hash: HashVal<W>| InvariantError::LeafMisplaced {
        path: slot.path_string(depth),
        hash: hash.to_string(),
    };
    if leaf.hash().path(depth) != slot {
        return Err(misplaced(leaf.hash()));
    }
    if let Leaf::Collision { entries, .. } = leaf
        && entries.len() < 2
    {
        return Err(InvariantError::ShortCollision {
            path: slot.path_string(depth),
            len: entries.len(),
        });
    }
    for kv in leaf.pairs() {
        let hash = kv.key.hash_val::<W>();
        if hash != leaf.hash() {
            return Err(misplaced(hash));
        }
    }
    Ok(())
}
