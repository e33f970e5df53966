//! Handles over primitive columns: packed integers, floats, and booleans.

use binvec_error::{binvec_bail, binvec_err, BinVecError, BinVecResult};
use binvec_flatbuffers::vector::SimplePrimitiveVector as PrimitiveTable;
use binvec_mask::NaMask;
use bytes::Bytes;

use crate::dtype::Primitive;
use crate::packed::{packed_byte_len, PackedData};
use crate::vector::{parse_len, parse_mask, BinaryVector, EmptyVector};
use crate::wire::{subtype, MajorType, WireHeader, HEADER_LEN};

/// A parsed primitive column of element type `T`.
#[derive(Clone, Debug)]
pub struct PrimitiveVector<T: Primitive> {
    repr: Repr<T>,
}

#[derive(Clone, Debug)]
enum Repr<T> {
    Empty(EmptyVector),
    Const { len: usize, na: NaMask, value: T },
    Packed { len: usize, na: NaMask, data: PackedData },
}

impl<T: Primitive> PrimitiveVector<T> {
    /// An all-missing vector of the given length.
    pub fn empty(len: usize) -> Self {
        Self { repr: Repr::Empty(EmptyVector::new(len)) }
    }

    /// Parse a blob into a handle, validating the header and structural
    /// sizes.
    pub fn parse(blob: Bytes) -> BinVecResult<Self> {
        let header = WireHeader::parse(&blob)?;
        match header.major {
            MajorType::Empty => Ok(Self::empty(header.aux as usize)),
            MajorType::Simple if header.sub == T::SIMPLE_SUB => Self::parse_table(blob, false),
            MajorType::Const if header.sub == subtype::PRIMITIVE => Self::parse_table(blob, true),
            _ => binvec_bail!(
                MalformedHeader: "blob of kind {:?}/{} does not hold a {:?} column",
                header.major,
                header.sub,
                T::DTYPE
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

    fn parse_table(blob: Bytes, constant: bool) -> BinVecResult<Self> {
        let table = PrimitiveTable::root_at(&blob, HEADER_LEN)?;
        let len = parse_len(table.len()?)?;
        let nbits = table.nbits()?;
        if !T::accepts_nbits(nbits) {
            return Err(BinVecError::UnsupportedNBits(nbits));
        }
        let na = parse_mask(&blob, table.na_mask()?)?;
        let data = table
            .data()?
            .ok_or_else(|| binvec_err!(TruncatedPayload: "primitive vector without data"))?;
        let stored = data.bytes(1)?.len();
        let needed = packed_byte_len(if constant { 1 } else { len }, nbits)?;
        if stored < needed {
            binvec_bail!(
                LengthMismatch: "packed data holds {stored} bytes but {needed} are required"
            );
        }

        let packed = PackedData::new(blob.clone(), data.pos(), nbits);
        let repr = if constant {
            Repr::Const { len, na, value: T::load(&packed, 0) }
        } else {
            Repr::Packed { len, na, data: packed }
        };
        Ok(Self { repr })
    }

    /// The stored bit-width, for packed payloads.
    pub fn nbits(&self) -> Option<u8> {
        match &self.repr {
            Repr::Packed { data, .. } => Some(data.nbits()),
            _ => None,
        }
    }
}

impl<T: Primitive> BinaryVector for PrimitiveVector<T> {
    type Elem = T;

    fn len(&self) -> usize {
        match &self.repr {
            Repr::Empty(e) => e.len(),
            Repr::Const { len, .. } | Repr::Packed { len, .. } => *len,
        }
    }

    fn is_available(&self, index: usize) -> bool {
        match &self.repr {
            Repr::Empty(_) => false,
            Repr::Const { na, .. } | Repr::Packed { na, .. } => na.is_present(index),
        }
    }

    #[inline]
    fn get(&self, index: usize) -> T {
        match &self.repr {
            Repr::Empty(_) => T::default(),
            Repr::Const { value, .. } => *value,
            Repr::Packed { data, .. } => T::load(data, index),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::encode_primitive_opt;

    #[test]
    fn rejects_foreign_element_types() {
        let blob = encode_primitive_opt(&[Some(1i64 << 40)]).unwrap();
        // A 64-bit payload cannot be read as i32.
        assert!(matches!(
            PrimitiveVector::<i32>::parse(blob).unwrap_err(),
            BinVecError::UnsupportedNBits(64)
        ));
    }

    #[test]
    fn rejects_string_blobs() {
        let blob = crate::encode::encode_strings_opt(&[Some("a")], &Default::default()).unwrap();
        assert!(matches!(
            PrimitiveVector::<i32>::parse(blob).unwrap_err(),
            BinVecError::MalformedHeader(_)
        ));
    }

    #[test]
    fn absent_region_decodes_as_empty() {
        let v = PrimitiveVector::<i32>::parse_opt(None, 7).unwrap();
        assert_eq!(v.len(), 7);
        assert!(!v.is_available(0));
        assert_eq!(v.get_safe(0), None);
    }

    #[test]
    fn truncated_data_fails_at_parse() {
        let blob = encode_primitive_opt(&[Some(1i32), Some(2), Some(3)]).unwrap();
        // Slicing off the tail of the packed region must fail fast.
        let clipped = blob.slice(0..blob.len() - 2);
        assert!(PrimitiveVector::<i32>::parse(clipped).is_err());
    }
}
