//! Handles over string columns.
//!
//! `StringVector<String>` materializes owned strings; `StringVector<Utf8Str>`
//! hands out zero-copy views into the blob. The view path never allocates
//! string storage.

use binvec_error::{binvec_bail, binvec_err, binvec_panic, BinVecResult};
use binvec_flatbuffers::read::Vector;
use binvec_flatbuffers::vector::{ConstStringVector, SimpleStringVector};
use binvec_mask::NaMask;
use bytes::Bytes;

use crate::vector::dict::DictStrings;
use crate::vector::{parse_len, parse_mask, BinaryVector, EmptyVector};
use crate::view::Utf8Str;
use crate::wire::{subtype, MajorType, WireHeader, HEADER_LEN};

/// A string element type: either owned [`String`] or the zero-copy
/// [`Utf8Str`] view.
pub trait StrElement: Clone + std::fmt::Debug + Default + Send + Sync + 'static {
    /// Materialize the value at `pos..pos + len` of `blob`. The region must
    /// hold valid UTF-8; corrupt regions panic.
    fn from_region(blob: &Bytes, pos: usize, len: usize) -> Self;
}

impl StrElement for String {
    fn from_region(blob: &Bytes, pos: usize, len: usize) -> Self {
        match std::str::from_utf8(&blob[pos..pos + len]) {
            Ok(s) => s.to_owned(),
            Err(_) => binvec_panic!("string payload at {pos} is not valid utf-8"),
        }
    }
}

impl StrElement for Utf8Str {
    fn from_region(blob: &Bytes, pos: usize, len: usize) -> Self {
        match std::str::from_utf8(&blob[pos..pos + len]) {
            Ok(_) => Utf8Str::from_validated(blob.slice(pos..pos + len)),
            Err(_) => binvec_panic!("string payload at {pos} is not valid utf-8"),
        }
    }
}

/// A parsed string column yielding elements of type `S`.
#[derive(Clone, Debug)]
pub struct StringVector<S: StrElement = String> {
    repr: Repr<S>,
}

#[derive(Clone, Debug)]
enum Repr<S> {
    Empty(EmptyVector),
    Const { len: usize, na: NaMask, value: S },
    Simple(SimpleStrings),
    Dict(DictStrings),
}

/// The simple encoding: a table vector of `len` length-prefixed strings.
#[derive(Clone, Debug)]
pub(crate) struct SimpleStrings {
    blob: Bytes,
    vec_pos: usize,
    len: usize,
    na: NaMask,
}

impl SimpleStrings {
    /// `(position, length)` of entry `index` inside the blob.
    fn region(&self, index: usize) -> (usize, usize) {
        Vector::new(&self.blob, self.vec_pos, self.len)
            .get_str(index)
            .unwrap_or_else(|err| binvec_panic!("corrupt string vector: {err}"))
    }
}

impl<S: StrElement> StringVector<S> {
    /// An all-missing vector of the given length.
    pub fn empty(len: usize) -> Self {
        Self { repr: Repr::Empty(EmptyVector::new(len)) }
    }

    /// Parse a blob into a handle, validating the header and structural
    /// sizes.
    pub fn parse(blob: Bytes) -> BinVecResult<Self> {
        let header = WireHeader::parse(&blob)?;
        match (header.major, header.sub) {
            (MajorType::Empty, _) => Ok(Self::empty(header.aux as usize)),
            (MajorType::Simple, subtype::STRING) => Self::parse_simple(blob),
            (MajorType::Const, subtype::STRING) => Self::parse_const(blob),
            (MajorType::Dict, subtype::STRING) => {
                Ok(Self { repr: Repr::Dict(DictStrings::parse(blob)?) })
            }
            _ => binvec_bail!(
                MalformedHeader: "blob of kind {:?}/{} does not hold a string column",
                header.major,
                header.sub
            ),
        }
    }

    /// Parse an optional region; an absent region decodes as an all-missing
    /// vector of `len_hint` rows.
    pub fn parse_opt(blob: Option<Bytes>, len_hint: usize) -> BinVecResult<Self> {
        match blob {
            None => Ok(Self::empty(len_hint)),
            Some(blob) => Self::parse(blob),
        }
    }

    fn parse_simple(blob: Bytes) -> BinVecResult<Self> {
        let table = SimpleStringVector::root_at(&blob, HEADER_LEN)?;
        let len = parse_len(table.data_len()?)?;
        let na = parse_mask(&blob, table.na_mask()?)?;
        let data = table
            .data()?
            .ok_or_else(|| binvec_err!(TruncatedPayload: "string vector without data"))?;
        if data.len() != len {
            binvec_bail!(
                LengthMismatch: "declared {len} strings but the vector holds {}",
                data.len()
            );
        }
        // The offsets array itself must be in bounds; the strings it points
        // at are resolved lazily.
        data.bytes(4)?;
        Ok(Self {
            repr: Repr::Simple(SimpleStrings { blob: blob.clone(), vec_pos: data.pos(), len, na }),
        })
    }

    fn parse_const(blob: Bytes) -> BinVecResult<Self> {
        let table = ConstStringVector::root_at(&blob, HEADER_LEN)?;
        let len = parse_len(table.len()?)?;
        let na = parse_mask(&blob, table.na_mask()?)?;
        let (pos, byte_len) = table
            .str_region()?
            .ok_or_else(|| binvec_err!(TruncatedPayload: "constant vector without a value"))?;
        std::str::from_utf8(&blob[pos..pos + byte_len])?;
        let value = S::from_region(&blob, pos, byte_len);
        Ok(Self { repr: Repr::Const { len, na, value } })
    }
}

impl<S: StrElement> BinaryVector for StringVector<S> {
    type Elem = S;

    fn len(&self) -> usize {
        match &self.repr {
            Repr::Empty(e) => e.len(),
            Repr::Const { len, .. } => *len,
            Repr::Simple(s) => s.len,
            Repr::Dict(d) => d.len(),
        }
    }

    fn is_available(&self, index: usize) -> bool {
        match &self.repr {
            Repr::Empty(_) => false,
            Repr::Const { na, .. } => na.is_present(index),
            Repr::Simple(s) => s.na.is_present(index),
            Repr::Dict(d) => d.is_present(index),
        }
    }

    fn get(&self, index: usize) -> S {
        match &self.repr {
            Repr::Empty(_) => S::default(),
            Repr::Const { value, .. } => value.clone(),
            Repr::Simple(s) => {
                let (pos, len) = s.region(index);
                S::from_region(&s.blob, pos, len)
            }
            Repr::Dict(d) => {
                let (pos, len) = d.region(index);
                S::from_region(d.blob(), pos, len)
            }
        }
    }
}
