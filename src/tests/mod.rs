use crate::hash::{HashKey, HashVal, Width};

mod hash;
mod stats;
mod stream;
mod stress;

/// A key with a caller-chosen hash, for steering keys into chosen slots.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ForcedKey {
    id: u32,
    hash: u64,
}

impl ForcedKey {
    const fn new(id: u32, hash: u64) -> Self {
        Self { id, hash }
    }
}

impl HashKey for ForcedKey {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::from_raw(self.hash)
    }
}

/// Three-letter keys "aaa" through "zzz".
fn trigrams() -> Vec<String> {
    let letters = b'a'..=b'z';
    let mut out = Vec::with_capacity(26 * 26 * 26);
    for a in letters.clone() {
        for b in letters.clone() {
            for c in letters.clone() {
                out.push(String::from_utf8(vec![a, b, c]).expect("ascii"));
            }
        }
    }
    out
}
