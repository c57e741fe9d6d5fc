use crate::hash::{Bits30, Bits60, HashKey, HashVal, Width};

#[test]
fn width_constants() {
    assert_eq!(Bits30::FAN_OUT, 32);
    assert_eq!(Bits30::DEPTH_LIMIT, 6);
    assert_eq!(Bits60::FAN_OUT, 64);
    assert_eq!(Bits60::DEPTH_LIMIT, 10);
    assert_eq!(HashVal::<Bits30>::MASK, 0x3FFF_FFFF);
    assert_eq!(HashVal::<Bits60>::MASK, 0x0FFF_FFFF_FFFF_FFFF);
}

/// FNV-1a reference values, XOR-folded to the width.
#[test]
fn fnv_fold_reference_values() {
    // FNV-1a-32("") = 0x811c9dc5, FNV-1a-32("a") = 0xe40c292c
    assert_eq!(Bits30::fold(b""), 0x011C_9DC7);
    assert_eq!(Bits30::fold(b"a"), 0x240C_292F);
    // FNV-1a-64("a") = 0xaf63dc4c8601ec8c
    assert_eq!(Bits60::fold(b"a"), 0x0F63_DC4C_8601_EC86);
}

#[test]
fn fold_fits_width() {
    for word in ["", "x", "hello", "a much longer key than the others"] {
        assert!(Bits30::fold(word.as_bytes()) <= HashVal::<Bits30>::MASK);
        assert!(Bits60::fold(word.as_bytes()) <= HashVal::<Bits60>::MASK);
    }
}

#[test]
fn from_raw_masks_high_bits() {
    let h = HashVal::<Bits30>::from_raw(u64::MAX);
    assert_eq!(h.raw(), HashVal::<Bits30>::MASK);
}

#[test]
fn index_reads_low_chunk_first() {
    let h = HashVal::<Bits30>::from_raw(31 | (3 << 5) | (21 << 10));
    assert_eq!(h.index(0), 31);
    assert_eq!(h.index(1), 3);
    assert_eq!(h.index(2), 21);
    assert_eq!(h.index(3), 0);

    let h = HashVal::<Bits60>::from_raw(3 | (42 << 6));
    assert_eq!(h.index(0), 3);
    assert_eq!(h.index(1), 42);
}

#[test]
fn last_chunk_is_reachable() {
    let h = HashVal::<Bits30>::from_raw(19 << 25);
    assert_eq!(h.index(5), 19);
    let h = HashVal::<Bits60>::from_raw(51 << 54);
    assert_eq!(h.index(9), 51);
}

#[test]
fn path_keeps_lower_chunks() {
    let h = HashVal::<Bits30>::from_raw(31 | (3 << 5) | (21 << 10));
    assert_eq!(h.path(0).raw(), 0);
    assert_eq!(h.path(1).raw(), 31);
    assert_eq!(h.path(2).raw(), 31 | (3 << 5));
    assert_eq!(h.path(6), h);
}

#[test]
fn with_index_sets_chunk_and_clears_above() {
    let h = HashVal::<Bits30>::from_raw(31 | (3 << 5) | (21 << 10));
    let edited = h.with_index(7, 1);
    assert_eq!(edited.raw(), 31 | (7 << 5));
    assert_eq!(edited.index(1), 7);
    assert_eq!(edited.index(2), 0);
    assert_eq!(HashVal::<Bits30>::from_raw(0).with_index(5, 0).raw(), 5);
}

#[test]
fn path_string_format() {
    let h = HashVal::<Bits30>::from_raw(3 | (17 << 5));
    assert_eq!(h.path_string(0), "/");
    assert_eq!(h.path_string(2), "/03/17/");
    assert_eq!(h.path_string(3), "/03/17/00/");
}

#[test]
fn key_hashes_are_deterministic() {
    let a: HashVal<Bits30> = "abc".hash_val();
    let b: HashVal<Bits30> = "abc".to_owned().hash_val();
    let c: HashVal<Bits30> = b"abc".hash_val();
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(a, HashVal::of_bytes(b"abc"));
}

#[test]
fn integer_keys_hash_little_endian_bytes() {
    let h: HashVal<Bits60> = 0x0102_u16.hash_val();
    assert_eq!(h, HashVal::of_bytes(&[0x02, 0x01]));
}

#[test]
fn distinct_widths_give_distinct_values() {
    let narrow: HashVal<Bits30> = "key".hash_val();
    let wide: HashVal<Bits60> = "key".hash_val();
    assert_ne!(narrow.raw(), wide.raw());
}
