//! Hash widths, hash values, and the key capability.
//!
//! A [`HashVal`] is a `W::HASH_BITS`-wide unsigned value consumed
//! `W::INDEX_BITS` at a time, least significant chunk first. Chunk `d`
//! selects the slot at trie depth `d`.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// 32-bit FNV-1a offset basis.
const FNV32_OFFSET: u32 = 0x811C_9DC5;

/// 32-bit FNV-1a prime.
const FNV32_PRIME: u32 = 0x0100_0193;

/// 64-bit FNV-1a offset basis.
const FNV64_OFFSET: u64 = 0xCBF2_9CE4_8422_2325;

/// 64-bit FNV-1a prime.
const FNV64_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Hash width and per-level chunk width of a trie.
pub trait Width: Copy + fmt::Debug + Send + Sync + 'static {
    /// Number of significant hash bits (W).
    const HASH_BITS: u32;

    /// Bits consumed per trie level (B).
    const INDEX_BITS: u32;

    /// Number of index chunks in a hash value: `W / B`.
    const DEPTH_LIMIT: usize = (Self::HASH_BITS / Self::INDEX_BITS) as usize;

    /// Slots per table: `2^B`.
    const FAN_OUT: usize = 1 << Self::INDEX_BITS;

    /// Hashes `bytes` with FNV-1a and XOR-folds the result to `HASH_BITS`.
    fn fold(bytes: &[u8]) -> u64;
}

/// 30-bit hashes, 5-bit chunks: 32-way tables, 6 levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bits30;

/// 60-bit hashes, 6-bit chunks: 64-way tables, 10 levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bits60;

impl Width for Bits30 {
    const HASH_BITS: u32 = 30;
    const INDEX_BITS: u32 = 5;

    fn fold(bytes: &[u8]) -> u64 {
        let h = bytes.iter().fold(FNV32_OFFSET, |h, &b| {
            (h ^ u32::from(b)).wrapping_mul(FNV32_PRIME)
        });
        u64::from((h >> Self::HASH_BITS) ^ (h & ((1 << Self::HASH_BITS) - 1)))
    }
}

impl Width for Bits60 {
    const HASH_BITS: u32 = 60;
    const INDEX_BITS: u32 = 6;

    fn fold(bytes: &[u8]) -> u64 {
        let h = bytes.iter().fold(FNV64_OFFSET, |h, &b| {
            (h ^ u64::from(b)).wrapping_mul(FNV64_PRIME)
        });
        (h >> Self::HASH_BITS) ^ (h & ((1 << Self::HASH_BITS) - 1))
    }
}

// ---------------------------------------------------------------------------
// HashVal
// ---------------------------------------------------------------------------

/// A `W::HASH_BITS`-wide hash value.
pub struct HashVal<W> {
    raw: u64,
    _width: PhantomData<W>,
}

impl<W: Width> HashVal<W> {
    /// Mask of the significant hash bits.
    pub const MASK: u64 = (1 << W::HASH_BITS) - 1;

    const INDEX_MASK: u64 = (1 << W::INDEX_BITS) - 1;

    /// Wraps a raw value, discarding bits above `W::HASH_BITS`.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            raw: raw & Self::MASK,
            _width: PhantomData,
        }
    }

    /// Hashes a byte string.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_raw(W::fold(bytes))
    }

    /// Returns the underlying bits.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.raw
    }

    /// Extracts the index chunk for `depth`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn index(self, depth: usize) -> usize {
        debug_assert!(depth < W::DEPTH_LIMIT, "depth {depth} past limit");
        let chunk = (self.raw >> shift::<W>(depth)) & Self::INDEX_MASK;
        // Chunk fits in INDEX_BITS (<= 6).
        chunk as usize
    }

    /// Keeps only the chunks below `depth`: the prefix consumed by the
    /// ancestors of a node at that depth.
    #[must_use]
    pub const fn path(self, depth: usize) -> Self {
        let shift = shift::<W>(depth);
        if shift >= W::HASH_BITS as usize {
            self
        } else {
            Self::from_raw(self.raw & ((1 << shift) - 1))
        }
    }

    /// Sets chunk `depth` to `idx`, keeping lower chunks and clearing higher.
    #[must_use]
    pub fn with_index(self, idx: usize, depth: usize) -> Self {
        debug_assert!(idx < W::FAN_OUT, "index {idx} out of range");
        Self::from_raw(self.path(depth).raw | ((idx as u64) << shift::<W>(depth)))
    }

    /// Renders the first `depth` chunks as `/i0/i1/.../`.
    #[must_use]
    pub fn path_string(self, depth: usize) -> String {
        let mut out = String::from("/");
        for d in 0..depth.min(W::DEPTH_LIMIT) {
            let _ = write!(out, "{:02}/", self.index(d));
        }
        out
    }
}

const fn shift<W: Width>(depth: usize) -> usize {
    depth * W::INDEX_BITS as usize
}

// Manual impls: `W` is a marker, never a bound on the value.

impl<W> Clone for HashVal<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for HashVal<W> {}

impl<W> PartialEq for HashVal<W> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<W> Eq for HashVal<W> {}

impl<W> Hash for HashVal<W> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<W> fmt::Debug for HashVal<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashVal({:#x})", self.raw)
    }
}

impl<W> fmt::Display for HashVal<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.raw)
    }
}

// ---------------------------------------------------------------------------
// HashKey
// ---------------------------------------------------------------------------

/// A key usable in the trie.
///
/// Equality is always decided by [`Eq`]; equal hashes never imply equal keys.
pub trait HashKey: Eq {
    /// Returns the key's hash folded to the trie's width.
    fn hash_val<W: Width>(&self) -> HashVal<W>;
}

impl HashKey for [u8] {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::of_bytes(self)
    }
}

impl<const N: usize> HashKey for [u8; N] {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::of_bytes(self)
    }
}

impl HashKey for Vec<u8> {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::of_bytes(self)
    }
}

impl HashKey for str {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::of_bytes(self.as_bytes())
    }
}

impl HashKey for String {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::of_bytes(self.as_bytes())
    }
}

impl HashKey for char {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::of_bytes(&u32::from(*self).to_le_bytes())
    }
}

impl HashKey for bool {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        HashVal::of_bytes(&[u8::from(*self)])
    }
}

impl<T: HashKey + ?Sized> HashKey for &T {
    fn hash_val<W: Width>(&self) -> HashVal<W> {
        (**self).hash_val()
    }
}

macro_rules! int_hash_key {
    ($($t:ty),*) => {
        $(
            impl HashKey for $t {
                fn hash_val<W: Width>(&self) -> HashVal<W> {
                    HashVal::of_bytes(&self.to_le_bytes())
                }
            }
        )*
    };
}

int_hash_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
