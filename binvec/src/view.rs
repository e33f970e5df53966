//! A zero-copy UTF-8 view into a shared byte region.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering::Relaxed};

use binvec_error::BinVecResult;
use bytes::Bytes;
use xxhash_rust::xxh32::xxh32;
use xxhash_rust::xxh64::xxh64;

/// Seed for both hash widths.
const HASH_SEED: u32 = 0x9747_B28C;

/// A non-owning UTF-8 string view backed by a reference-counted byte region,
/// typically the payload of a parsed blob.
///
/// Ordering is unsigned lexicographic over the bytes and equality is byte
/// equality. The 32- and 64-bit xxHash values are computed on first use and
/// cached; zero marks an uncomputed cell, so a hash that happens to be zero
/// is recomputed on each call. Concurrent first computations race benignly:
/// every thread stores the same value.
pub struct Utf8Str {
    bytes: Bytes,
    hash32: AtomicU32,
    hash64: AtomicU64,
}

impl Utf8Str {
    /// Wrap a byte region, validating that it is UTF-8.
    pub fn from_utf8(bytes: Bytes) -> BinVecResult<Self> {
        std::str::from_utf8(&bytes)?;
        Ok(Self { bytes, hash32: AtomicU32::new(0), hash64: AtomicU64::new(0) })
    }

    /// Wrap a region already known to be UTF-8.
    pub(crate) fn from_validated(bytes: Bytes) -> Self {
        debug_assert!(std::str::from_utf8(&bytes).is_ok());
        Self { bytes, hash32: AtomicU32::new(0), hash64: AtomicU64::new(0) }
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: every constructor validates that `bytes` is UTF-8, and the
        // region is immutable for the life of the view.
        unsafe { std::str::from_utf8_unchecked(&self.bytes) }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 32-bit xxHash of the bytes, cached after the first call.
    pub fn hash32(&self) -> u32 {
        let cached = self.hash32.load(Relaxed);
        if cached != 0 {
            return cached;
        }
        let computed = xxh32(&self.bytes, HASH_SEED);
        self.hash32.store(computed, Relaxed);
        computed
    }

    /// 64-bit xxHash of the bytes, cached after the first call.
    pub fn hash64(&self) -> u64 {
        let cached = self.hash64.load(Relaxed);
        if cached != 0 {
            return cached;
        }
        let computed = xxh64(&self.bytes, HASH_SEED as u64);
        self.hash64.store(computed, Relaxed);
        computed
    }
}

impl Clone for Utf8Str {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            hash32: AtomicU32::new(self.hash32.load(Relaxed)),
            hash64: AtomicU64::new(self.hash64.load(Relaxed)),
        }
    }
}

impl Default for Utf8Str {
    fn default() -> Self {
        Self::from_validated(Bytes::new())
    }
}

impl PartialEq for Utf8Str {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Utf8Str {}

impl PartialEq<str> for Utf8Str {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Utf8Str {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for Utf8Str {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Utf8Str {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for Utf8Str {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl Borrow<str> for Utf8Str {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Utf8Str {
    fn from(value: &str) -> Self {
        Self::from_validated(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Utf8Str {
    fn from(value: String) -> Self {
        Self::from_validated(Bytes::from(value.into_bytes()))
    }
}

impl fmt::Display for Utf8Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Utf8Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ordering_is_lexicographic_by_bytes() {
        let apple = Utf8Str::from("apple");
        let apricot = Utf8Str::from("apricot");
        assert!(apple < apricot);
        assert_eq!(apple.cmp(&apricot), Ordering::Less);
        assert_eq!(apple, Utf8Str::from("apple"));
        assert_eq!(apple, "apple");
    }

    #[test]
    fn hashes_are_stable_and_discriminating() {
        let apple = Utf8Str::from("apple");
        let again = Utf8Str::from("apple");
        let banana = Utf8Str::from("banana");

        assert_eq!(apple.hash32(), apple.hash32());
        assert_eq!(apple.hash32(), again.hash32());
        assert_eq!(apple.hash64(), again.hash64());
        assert_ne!(apple.hash32(), banana.hash32());
        assert_ne!(apple.hash64(), banana.hash64());
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(Utf8Str::from_utf8(Bytes::from_static(&[0xff, 0xfe])).is_err());
    }

    #[test]
    fn views_share_the_region() {
        let region = Bytes::from_static(b"hello world");
        let hello = Utf8Str::from_utf8(region.slice(0..5)).unwrap();
        let world = Utf8Str::from_utf8(region.slice(6..11)).unwrap();
        assert_eq!(hello, "hello");
        assert_eq!(world, "world");
    }
}
