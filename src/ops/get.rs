//! Lookup: descends by successive index chunks until a leaf or an empty slot.

use crate::hash::{HashVal, Width};
use crate::node::Node;
use crate::table::Table;

/// Searches for `key` in the trie rooted at `root`.
///
/// # Panics
///
/// Panics if the descent passes `W::DEPTH_LIMIT` tables without reaching
/// a leaf, which means the trie is corrupt.
pub fn get<'a, K, V, W>(root: &'a Table<K, V, W>, hash: HashVal<W>, key: &K) -> Option<&'a V>
where
    K: Eq,
    W: Width,
{
    let mut table = root;
    for depth in 0..W::DEPTH_LIMIT {
        match table.get(hash.index(depth))? {
            Node::Leaf(leaf) => {
                return if leaf.hash() == hash {
                    leaf.get(key)
                } else {
                    None
                };
            }
            Node::Table(child) => table = &**child,
        }
    }
    panic!("descent passed depth limit {} without reaching a leaf", W::DEPTH_LIMIT);
}
