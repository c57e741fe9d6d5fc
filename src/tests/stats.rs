use std::sync::Arc;

use super::ForcedKey;
use crate::config::Grading;
use crate::hash::{Bits30, HashVal};
use crate::node::{KeyVal, Leaf, Node};
use crate::stats::validate;
use crate::table::Table;
use crate::{Hamt32, InvariantError, TransientHamt32};

type T30 = Table<ForcedKey, u32, Bits30>;

fn grading() -> Grading {
    Grading::default_for::<Bits30>()
}

fn table(path: u64, depth: usize) -> T30 {
    Table::empty(HashVal::from_raw(path), depth, grading())
}

fn flat(id: u32, hash: u64) -> Node<ForcedKey, u32, Bits30> {
    Node::leaf(Leaf::flat(HashVal::from_raw(hash), ForcedKey::new(id, hash), id))
}

#[test]
fn empty_stats() {
    let map: Hamt32<u32, u32> = Hamt32::new();
    let stats = map.stats();
    assert_eq!(stats.tables(), 0);
    assert_eq!(stats.pairs, 0);
    assert!(stats.tables_per_depth.is_empty());
}

#[test]
fn stats_count_pairs_and_leaves() {
    let mut map = TransientHamt32::new();
    map.put(ForcedKey::new(1, 3), ());
    map.put(ForcedKey::new(2, 3), ());
    map.put(ForcedKey::new(3, 4), ());
    map.put(ForcedKey::new(4, 4 | (1 << 5)), ());

    let stats = map.stats();
    assert_eq!(stats.pairs, 4);
    assert_eq!(stats.collision_leaves, 1);
    assert_eq!(stats.flat_leaves, 2);
    assert_eq!(stats.tables_per_depth, vec![1, 1]);
    assert_eq!(stats.max_depth, 1);
}

#[test]
fn stats_display() {
    let mut map = TransientHamt32::new();
    map.put(ForcedKey::new(1, 1), ());
    map.put(ForcedKey::new(2, 1 | (1 << 5)), ());
    let text = map.stats().to_string();
    assert_eq!(
        text,
        "pairs: 2\n\
         tables: 2 sparse, 0 fixed, max depth 1\n  \
         depth 0: 1\n  \
         depth 1: 1\n\
         leaves: 2 flat, 0 collision"
    );
}

#[test]
fn well_formed_trie_validates() {
    let mut root = table(0, 0);
    root.insert(1, flat(1, 1));
    assert_eq!(validate(Some(&root), 1), Ok(()));
    assert_eq!(validate::<ForcedKey, u32, Bits30>(None, 0), Ok(()));
}

#[test]
fn detects_count_mismatch() {
    let mut root = table(0, 0);
    root.insert(1, flat(1, 1));
    assert_eq!(
        validate(Some(&root), 2),
        Err(InvariantError::Count {
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn detects_misplaced_leaf() {
    let mut root = table(0, 0);
    root.insert(2, flat(1, 1));
    assert!(matches!(
        validate(Some(&root), 1),
        Err(InvariantError::LeafMisplaced { .. })
    ));
}

#[test]
fn detects_single_leaf_subtable() {
    let mut sub = table(1, 1);
    sub.insert(0, flat(1, 1));
    let mut root = table(0, 0);
    root.insert(1, Node::Table(Arc::new(sub)));
    assert_eq!(
        validate(Some(&root), 1),
        Err(InvariantError::SingleLeafTable {
            path: "/01/".to_owned()
        })
    );
}

#[test]
fn detects_empty_subtable() {
    let mut root = table(0, 0);
    root.insert(1, flat(1, 1));
    root.insert(2, Node::table(table(2, 1)));
    assert!(matches!(
        validate(Some(&root), 1),
        Err(InvariantError::EmptyTable { .. })
    ));
}

#[test]
fn detects_wrong_recorded_depth() {
    let mut sub = table(1, 2);
    sub.insert(0, flat(1, 1));
    sub.insert(1, flat(2, 1 | (1 << 5)));
    let mut root = table(0, 0);
    root.insert(1, Node::Table(Arc::new(sub)));
    assert!(matches!(
        validate(Some(&root), 2),
        Err(InvariantError::Misplaced { depth: 2, .. })
    ));
}

#[test]
fn detects_short_collision_leaf() {
    let hash = HashVal::from_raw(5);
    let leaf = Leaf::Collision {
        hash,
        entries: vec![KeyVal {
            key: ForcedKey::new(1, 5),
            value: 1,
        }],
    };
    let mut root = table(0, 0);
    root.insert(5, Node::leaf(leaf));
    assert_eq!(
        validate(Some(&root), 1),
        Err(InvariantError::ShortCollision {
            path: "/05/".to_owned(),
            len: 1
        })
    );
}

#[test]
fn detects_key_hashing_elsewhere() {
    let leaf = Leaf::flat(HashVal::from_raw(5), ForcedKey::new(1, 6), 1);
    let mut root = table(0, 0);
    root.insert(5, Node::leaf(leaf));
    assert!(matches!(
        validate(Some(&root), 1),
        Err(InvariantError::LeafMisplaced { .. })
    ));
}

#[test]
fn error_messages_name_the_path() {
    let err = InvariantError::SingleLeafTable {
        path: "/01/".to_owned(),
    };
    assert_eq!(err.to_string(), "uncollapsed single-leaf table at /01/");
}
