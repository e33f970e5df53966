//! The NA mask: a compact representation of per-element availability.
//!
//! A mask is one of three variants: every position present
//! ([`NaMask::AllZeroes`]), every position missing ([`NaMask::AllOnes`]), or
//! an explicit bitmap of 64-bit little-endian words where a set bit marks a
//! missing position ([`NaMask::Bitmap`]). The bitmap may carry fewer words
//! than `ceil(len / 64)`; positions past the stored words read as present.
//!
//! The common all-present column costs a single tag byte on the wire instead
//! of a bit per element.

use arrow_buffer::{BooleanBuffer, BooleanBufferBuilder};
use bytes::Bytes;

/// Little-endian `u64` words backing a [`NaMask::Bitmap`].
///
/// The words live in a shared [`Bytes`] region, so a mask parsed out of a
/// blob borrows the blob's storage instead of copying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskWords {
    words: Bytes,
}

impl MaskWords {
    /// Wrap a region of little-endian `u64` words. The length must be a
    /// multiple of eight bytes.
    pub fn new(words: Bytes) -> Self {
        assert_eq!(words.len() % 8, 0, "mask words must be whole u64 words");
        Self { words }
    }

    /// Copy a word slice into an owned region.
    pub fn from_words(words: &[u64]) -> Self {
        let mut bytes = Vec::with_capacity(words.len() * 8);
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        Self { words: Bytes::from(bytes) }
    }

    /// Number of stored words.
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len() / 8
    }

    /// Word at `index`; words past the stored region read as zero.
    #[inline]
    pub fn word(&self, index: usize) -> u64 {
        let start = index * 8;
        if start >= self.words.len() {
            return 0;
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.words[start..start + 8]);
        u64::from_le_bytes(buf)
    }

    /// Whether bit `index` is set, i.e. the position is missing.
    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        (self.word(index >> 6) >> (index & 63)) & 1 == 1
    }

    /// The words as an owned vector, for the encoder.
    pub fn to_words(&self) -> Vec<u64> {
        (0..self.num_words()).map(|i| self.word(i)).collect()
    }
}

/// Per-element availability for one vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NaMask {
    /// Every position is present.
    AllZeroes,
    /// Every position is missing.
    AllOnes,
    /// A set bit marks a missing position.
    Bitmap(MaskWords),
}

impl NaMask {
    /// Build a mask from a boolean buffer where a set bit marks a missing
    /// position, collapsing to [`NaMask::AllZeroes`] / [`NaMask::AllOnes`]
    /// when possible.
    pub fn from_buffer(buffer: &BooleanBuffer) -> Self {
        let len = buffer.len();
        let missing = buffer.count_set_bits();
        if missing == 0 {
            return Self::AllZeroes;
        }
        if missing == len {
            return Self::AllOnes;
        }

        let num_words = len.div_ceil(64);
        let mut bytes = buffer.values()[..len.div_ceil(8)].to_vec();
        bytes.resize(num_words * 8, 0);
        Self::Bitmap(MaskWords::new(Bytes::from(bytes)))
    }

    /// Whether position `index` is missing.
    #[inline]
    pub fn is_missing(&self, index: usize) -> bool {
        match self {
            Self::AllZeroes => false,
            Self::AllOnes => true,
            Self::Bitmap(words) => words.is_set(index),
        }
    }

    /// Whether position `index` is present.
    #[inline]
    pub fn is_present(&self, index: usize) -> bool {
        !self.is_missing(index)
    }

    /// Number of missing positions among the first `len`.
    pub fn missing_count(&self, len: usize) -> usize {
        match self {
            Self::AllZeroes => 0,
            Self::AllOnes => len,
            Self::Bitmap(_) => (0..len).filter(|&i| self.is_missing(i)).count(),
        }
    }
}

impl FromIterator<bool> for NaMask {
    /// Collect per-position missing flags into a mask.
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self::from_buffer(&BooleanBuffer::from_iter(iter))
    }
}

/// Incrementally collects missing flags while a column is staged.
#[derive(Debug)]
pub struct NaMaskBuilder {
    buffer: BooleanBufferBuilder,
}

impl NaMaskBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: BooleanBufferBuilder::new(capacity) }
    }

    /// Record the next position; `missing` set marks it unavailable.
    #[inline]
    pub fn append(&mut self, missing: bool) {
        self.buffer.append(missing);
    }

    /// Number of positions recorded so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Finish into a mask, collapsing to the tag-only variants when the
    /// bitmap is uniform.
    pub fn finish(mut self) -> NaMask {
        NaMask::from_buffer(&self.buffer.finish())
    }
}

impl Default for NaMaskBuilder {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn all_present() {
        let mask: NaMask = [false; 5].into_iter().collect();
        assert_eq!(mask, NaMask::AllZeroes);
        assert!(mask.is_present(0));
        assert!(mask.is_present(4));
        assert_eq!(mask.missing_count(5), 0);
    }

    #[test]
    fn all_missing() {
        let mask: NaMask = [true; 5].into_iter().collect();
        assert_eq!(mask, NaMask::AllOnes);
        assert!(mask.is_missing(0));
        assert_eq!(mask.missing_count(5), 5);
    }

    #[test]
    fn bitmap() {
        let mut builder = NaMaskBuilder::with_capacity(130);
        for i in 0..130 {
            builder.append(i % 3 == 0);
        }
        let mask = builder.finish();
        assert!(matches!(mask, NaMask::Bitmap(_)));
        for i in 0..130 {
            assert_eq!(mask.is_missing(i), i % 3 == 0, "position {i}");
        }
        if let NaMask::Bitmap(words) = &mask {
            assert_eq!(words.num_words(), 3);
        }
    }

    #[test]
    fn out_of_range_words_read_as_present() {
        // A single stored word covers positions 0..64; everything past it
        // must read as present.
        let mask = NaMask::Bitmap(MaskWords::from_words(&[1 << 3]));
        assert!(mask.is_missing(3));
        assert!(mask.is_present(2));
        assert!(mask.is_present(64));
        assert!(mask.is_present(1000));
    }

    #[test]
    fn word_round_trip() {
        let words = MaskWords::from_words(&[0xdead_beef, u64::MAX]);
        assert_eq!(words.num_words(), 2);
        assert_eq!(words.word(0), 0xdead_beef);
        assert_eq!(words.word(1), u64::MAX);
        assert_eq!(words.word(2), 0);
        assert_eq!(words.to_words(), vec![0xdead_beef, u64::MAX]);
    }
}
