use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::trigrams;
use crate::{Hamt, Hamt32, Hamt64, HashKey, TransientHamt, TransientHamt32, Width};

/// Insert "aaa".."zzz", delete every third, check the survivors.
fn trigram_persistent<W: Width>() {
    let keys = trigrams();
    let mut map: Hamt<String, usize, W> = Hamt::new();
    for (i, k) in keys.iter().enumerate() {
        map = map.put(k.clone(), i).0;
    }
    assert_eq!(map.len(), 17_576);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(map.get(k), Some(&i), "missing {k}");
    }
    let full = map.clone();

    for (i, k) in keys.iter().enumerate().step_by(3) {
        let (next, removed) = map.del(k);
        assert_eq!(removed, Some(i));
        map = next;
    }
    assert_eq!(map.len(), 17_576 - 5_859);
    for (i, k) in keys.iter().enumerate() {
        let expected = (i % 3 != 0).then_some(&i);
        assert_eq!(map.get(k), expected, "wrong lookup for {k}");
    }
    assert!(map.validate().is_ok());
    assert_eq!(full.len(), 17_576);
    assert!(full.validate().is_ok());
}

fn trigram_transient<W: Width>() {
    let keys = trigrams();
    let mut map: TransientHamt<String, usize, W> = TransientHamt::new();
    for (i, k) in keys.iter().enumerate() {
        assert!(map.put(k.clone(), i));
    }
    for (i, k) in keys.iter().enumerate().step_by(3) {
        assert_eq!(map.del(k), Some(i));
    }
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(map.get(k).copied(), (i % 3 != 0).then_some(i));
    }
    assert_eq!(map.iter().count(), map.len());
    assert!(map.validate().is_ok());
}

#[test]
fn trigrams_persistent_30() {
    trigram_persistent::<crate::Bits30>();
}

#[test]
fn trigrams_persistent_60() {
    trigram_persistent::<crate::Bits60>();
}

#[test]
fn trigrams_transient_30() {
    trigram_transient::<crate::Bits30>();
}

#[test]
fn trigrams_transient_60() {
    trigram_transient::<crate::Bits60>();
}

/// Shuffled insertion and deletion order, drained to empty.
#[test]
fn shuffled_drain() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut keys: Vec<u64> = (0..20_000).collect();
    keys.shuffle(&mut rng);

    let mut map = TransientHamt32::new();
    for &k in &keys {
        map.put(k, k.wrapping_mul(3));
    }
    assert_eq!(map.len(), 20_000);
    assert!(map.validate().is_ok());

    keys.shuffle(&mut rng);
    for (n, &k) in keys.iter().enumerate() {
        assert_eq!(map.del(&k), Some(k.wrapping_mul(3)));
        if n % 1000 == 0 {
            assert!(map.validate().is_ok(), "invalid after {n} deletions");
        }
    }
    assert!(map.is_empty());
    assert_eq!(map.stats().tables(), 0);
}

fn randomized<K, F>(seed: u64, make_key: F)
where
    K: HashKey + Clone + std::hash::Hash,
    F: Fn(u32) -> K,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = Hamt64::new();
    let mut m: HashMap<K, u64> = HashMap::new();

    for _ in 0..30_000 {
        let op = rng.gen_range(0..100);
        let key = make_key(rng.gen_range(0..4096));
        match op {
            0..=49 => {
                let v: u64 = rng.r#gen();
                let (next, added) = t.put(key.clone(), v);
                assert_eq!(added, m.insert(key, v).is_none());
                t = next;
            }
            50..=79 => {
                let (next, removed) = t.del(&key);
                assert_eq!(removed, m.remove(&key));
                t = next;
            }
            _ => assert_eq!(t.get(&key), m.get(&key)),
        }
    }
    assert_eq!(t.len(), m.len());
    assert!(t.validate().is_ok());
    for (k, v) in &t {
        assert_eq!(m.get(k), Some(v));
    }
}

#[test]
fn randomized_integer_keys() {
    randomized(1, |i| i);
}

#[test]
fn randomized_string_keys() {
    randomized(2, |i| format!("key-{i}"));
}

#[test]
fn randomized_byte_keys() {
    randomized(3, |i| i.to_be_bytes().to_vec());
}

/// Many snapshots taken while a transient map is hammered stay intact.
#[test]
fn snapshots_under_churn() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut live = TransientHamt32::new();
    let mut snapshots: Vec<(Hamt32<u32, u32>, HashMap<u32, u32>)> = Vec::new();
    let mut model = HashMap::new();

    for round in 0..20 {
        for _ in 0..500 {
            let k = rng.gen_range(0..2000);
            if rng.gen_bool(0.6) {
                live.put(k, round);
                model.insert(k, round);
            } else {
                live.del(&k);
                model.remove(&k);
            }
        }
        let frozen = std::mem::take(&mut live).persistent();
        live = frozen.transient();
        snapshots.push((frozen, model.clone()));
    }

    for (map, expected) in &snapshots {
        assert_eq!(map.len(), expected.len());
        for (k, v) in expected {
            assert_eq!(map.get(k), Some(v));
        }
        assert!(map.validate().is_ok());
    }
}
