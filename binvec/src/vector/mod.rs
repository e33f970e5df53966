//! Column handles: polymorphic readers over parsed blobs.
//!
//! A handle holds a reference-counted view of the blob's bytes and answers
//! element queries without copying the payload. `get` is the unchecked hot
//! path: construction validates the header and structural sizes, and the
//! caller guards missing positions with `is_available`; for an unavailable
//! or out-of-range index use [`BinaryVector::get_safe`].

use binvec_error::{binvec_err, BinVecResult};
use binvec_flatbuffers::vector::{
    ConstStringVector, DictStringVector, NaMaskTable, SimplePrimitiveVector, SimpleStringVector,
    MASK_ALL_ONES, MASK_ALL_ZEROES, MASK_SIMPLE_BIT_MASK,
};
use binvec_mask::{MaskWords, NaMask};
use bytes::Bytes;

use crate::wire::{subtype, MajorType, WireHeader, HEADER_LEN};

mod dict;
mod primitive;
mod string;

pub use primitive::PrimitiveVector;
pub use string::{StrElement, StringVector};

/// The read contract shared by every column handle.
pub trait BinaryVector {
    type Elem: Clone + 'static;

    /// Logical row count.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether position `index` holds a value. Valid for `index < len()`.
    fn is_available(&self, index: usize) -> bool;

    /// Element at `index`. If the position is missing the value is
    /// unspecified; out-of-range indexes may panic.
    fn get(&self, index: usize) -> Self::Elem;

    /// Bounds- and availability-checked element access.
    fn get_safe(&self, index: usize) -> Option<Self::Elem> {
        (index < self.len() && self.is_available(index)).then(|| self.get(index))
    }

    /// Iterate the available values, skipping missing positions.
    fn iter(&self) -> AvailableIter<'_, Self>
    where
        Self: Sized,
    {
        AvailableIter { vector: self, index: 0 }
    }

    /// Iterate every position as `Some(value)` / `None`.
    fn iter_opt(&self) -> OptionIter<'_, Self>
    where
        Self: Sized,
    {
        OptionIter { vector: self, index: 0 }
    }
}

/// Yields only the available values of a vector.
pub struct AvailableIter<'a, V: BinaryVector> {
    vector: &'a V,
    index: usize,
}

impl<V: BinaryVector> Iterator for AvailableIter<'_, V> {
    type Item = V::Elem;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.vector.len() {
            let index = self.index;
            self.index += 1;
            if self.vector.is_available(index) {
                return Some(self.vector.get(index));
            }
        }
        None
    }
}

/// Yields `Option<Elem>` for every position of a vector.
pub struct OptionIter<'a, V: BinaryVector> {
    vector: &'a V,
    index: usize,
}

impl<V: BinaryVector> Iterator for OptionIter<'_, V> {
    type Item = Option<V::Elem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vector.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        Some(self.vector.get_safe(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len() - self.index;
        (remaining, Some(remaining))
    }
}

/// A vector with a declared length and no stored values; every position is
/// missing.
#[derive(Clone, Debug)]
pub struct EmptyVector {
    len: usize,
}

impl EmptyVector {
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Materialize the NA mask referenced by a payload table. An absent table
/// means every position is present.
pub(crate) fn parse_mask(blob: &Bytes, table: Option<NaMaskTable<'_>>) -> BinVecResult<NaMask> {
    let Some(table) = table else {
        return Ok(NaMask::AllZeroes);
    };
    match table.mask_type()? {
        MASK_ALL_ZEROES => Ok(NaMask::AllZeroes),
        MASK_ALL_ONES => Ok(NaMask::AllOnes),
        MASK_SIMPLE_BIT_MASK => match table.bit_mask()? {
            None => Ok(NaMask::AllZeroes),
            Some(words) => {
                let byte_len = words.bytes(8)?.len();
                let pos = words.pos();
                Ok(NaMask::Bitmap(MaskWords::new(blob.slice(pos..pos + byte_len))))
            }
        },
        other => Err(binvec_err!(MalformedHeader: "unknown NA mask type {other}")),
    }
}

/// Convert a declared `i32` length into a `usize`.
pub(crate) fn parse_len(len: i32) -> BinVecResult<usize> {
    usize::try_from(len).map_err(|_| binvec_err!(LengthMismatch: "negative vector length {len}"))
}

/// A cheap peek at a blob's shape: its wire kinds, logical length, and the
/// packed bit-width where one applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorSummary {
    pub major: MajorType,
    pub sub: u8,
    pub len: usize,
    pub nbits: Option<u8>,
}

/// Inspect a blob without constructing a typed handle.
pub fn inspect(blob: &Bytes) -> BinVecResult<VectorSummary> {
    let header = WireHeader::parse(blob)?;
    let (len, nbits) = match (header.major, header.sub) {
        (MajorType::Empty, _) => (header.aux as usize, None),
        (MajorType::Simple, subtype::STRING) => {
            let table = SimpleStringVector::root_at(blob, HEADER_LEN)?;
            (parse_len(table.data_len()?)?, None)
        }
        (MajorType::Simple, _) => {
            let table = SimplePrimitiveVector::root_at(blob, HEADER_LEN)?;
            (parse_len(table.len()?)?, Some(table.nbits()?))
        }
        (MajorType::Dict, _) => {
            let table = DictStringVector::root_at(blob, HEADER_LEN)?;
            let nbits = match table.info()? {
                Some(info) => Some(info.nbits()?),
                None => None,
            };
            (parse_len(table.len()?)?, nbits)
        }
        (MajorType::Const, subtype::STRING) => {
            let table = ConstStringVector::root_at(blob, HEADER_LEN)?;
            (parse_len(table.len()?)?, None)
        }
        (MajorType::Const, _) => {
            let table = SimplePrimitiveVector::root_at(blob, HEADER_LEN)?;
            (parse_len(table.len()?)?, Some(table.nbits()?))
        }
    };
    Ok(VectorSummary { major: header.major, sub: header.sub, len, nbits })
}
