//! Per-element capabilities the containers rely on.
//!
//! A type participates as a hash table key by implementing [`TableKey`]:
//! it names one sentinel value meaning "this bucket is empty" and supplies
//! a hash. Equality comes from `Eq`. Relocation is an ordinary Rust move and
//! explicit copying is `Clone`.
//!
//! Built-in keys:
//! - integer primitives and `char`: the zero value is the sentinel, the hash
//!   is xxHash of the native-endian bytes with seed 0;
//! - `Option<T>` for byte-like `T` (`String`, `&str`, `Vec<u8>`, ...):
//!   `None` is the sentinel, the hash is xxHash of the referenced bytes.
//!
//! [`SizeOf`] reports the memory footprint of a value for accounting.

use core::mem;

/// Seed for every built-in hash.
pub const HASH_SEED: u64 = 0;

/// Hash of a byte string: xxh64 on 64-bit targets, xxh32 elsewhere.
#[cfg(target_pointer_width = "64")]
#[inline]
pub fn default_hash(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh64::xxh64(bytes, HASH_SEED)
}

/// Hash of a byte string: xxh64 on 64-bit targets, xxh32 elsewhere.
#[cfg(not(target_pointer_width = "64"))]
#[inline]
pub fn default_hash(bytes: &[u8]) -> u64 {
    u64::from(xxhash_rust::xxh32::xxh32(bytes, HASH_SEED as u32))
}

/// Key capability set for open-addressing tables.
///
/// Implementations must keep `hash` consistent with `Eq`, and the sentinel
/// returned by [`TableKey::empty`] must never be stored as a real key.
pub trait TableKey: Eq {
    /// The sentinel marking an unoccupied bucket.
    fn empty() -> Self;

    fn is_empty(&self) -> bool;

    fn hash(&self) -> u64;

    #[inline]
    fn set_empty(&mut self)
    where
        Self: Sized,
    {
        *self = Self::empty();
    }

    /// Bulk form of [`TableKey::set_empty`].
    #[inline]
    fn set_all_empty(keys: &mut [Self])
    where
        Self: Sized,
    {
        for key in keys {
            key.set_empty();
        }
    }
}

macro_rules! impl_table_key_for_int {
    ($($t:ty),* $(,)?) => {$(
        impl TableKey for $t {
            #[inline]
            fn empty() -> Self {
                0
            }
            #[inline]
            fn is_empty(&self) -> bool {
                *self == 0
            }
            #[inline]
            fn hash(&self) -> u64 {
                default_hash(&self.to_ne_bytes())
            }
            #[inline]
            fn set_all_empty(keys: &mut [Self]) {
                keys.fill(0);
            }
        }
    )*};
}

impl_table_key_for_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl TableKey for char {
    #[inline]
    fn empty() -> Self {
        '\0'
    }
    #[inline]
    fn is_empty(&self) -> bool {
        *self == '\0'
    }
    #[inline]
    fn hash(&self) -> u64 {
        default_hash(&u32::from(*self).to_ne_bytes())
    }
}

/// Types whose identity is a byte string. `Option<T>` of these is a
/// [`TableKey`] with `None` as the sentinel.
pub trait ByteKey {
    fn key_bytes(&self) -> &[u8];
}

impl ByteKey for String {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ByteKey for Box<str> {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ByteKey for Vec<u8> {
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl ByteKey for Box<[u8]> {
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl ByteKey for &str {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ByteKey for &[u8] {
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl<T: ByteKey + Eq> TableKey for Option<T> {
    #[inline]
    fn empty() -> Self {
        None
    }
    #[inline]
    fn is_empty(&self) -> bool {
        self.is_none()
    }
    #[inline]
    fn hash(&self) -> u64 {
        match self {
            Some(k) => default_hash(k.key_bytes()),
            None => 0,
        }
    }
}

/// Memory footprint of a value, counting owned heap data.
pub trait SizeOf {
    fn size_of(&self) -> usize;
}

macro_rules! impl_size_of_fixed {
    ($($t:ty),* $(,)?) => {$(
        impl SizeOf for $t {
            #[inline]
            fn size_of(&self) -> usize {
                mem::size_of::<$t>()
            }
        }
    )*};
}

impl_size_of_fixed!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

impl SizeOf for String {
    // length field plus the bytes themselves
    fn size_of(&self) -> usize {
        mem::size_of::<u32>() + self.len()
    }
}

impl SizeOf for &str {
    fn size_of(&self) -> usize {
        mem::size_of::<u32>() + self.len()
    }
}

impl<T: SizeOf> SizeOf for Option<T> {
    fn size_of(&self) -> usize {
        match self {
            Some(v) => v.size_of(),
            None => mem::size_of::<Self>(),
        }
    }
}
