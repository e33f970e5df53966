//! Encoding for primitive columns.

use binvec_error::BinVecResult;
use binvec_flatbuffers::vector::create_simple_primitive_vector;
use binvec_mask::NaMask;
use bytes::Bytes;
use log::debug;

use crate::dtype::Primitive;
use crate::encode::{check_len, empty_blob, finish_blob, scratch, stage_options, write_na_mask};
use crate::wire::{subtype, MajorType, WireHeader};

/// Encode a primitive column. `values` holds one element per row; missing
/// rows carry an arbitrary placeholder and are identified by `na`.
pub fn encode_primitive<T: Primitive>(values: &[T], na: &NaMask) -> BinVecResult<Bytes> {
    let len = values.len();
    let len_i32 = check_len(len)?;
    if len == 0 {
        return Ok(empty_blob(0));
    }
    if matches!(na, NaMask::AllOnes) {
        return encode_all_missing::<T>(len);
    }
    if let Some(value) = constant_value(values, na) {
        debug!("encoding {len} rows as a {:?} constant", T::DTYPE);
        return encode_const(len_i32, na, value);
    }

    let nbits = T::select_nbits(values);
    debug!("encoding {len} rows of {:?} at {nbits} bits", T::DTYPE);
    scratch::with_builder(|b| {
        let mask = write_na_mask(b, na);
        let mut packed = Vec::with_capacity(len * usize::from(nbits.div_ceil(8)));
        T::pack(values, nbits, &mut packed);
        let data = b.create_byte_vector(&packed, usize::from(nbits / 8).max(1));
        let root = create_simple_primitive_vector(b, len_i32, mask, nbits, data);
        b.finish(root);
        Ok(finish_blob(b, WireHeader::new(MajorType::Simple, T::SIMPLE_SUB)))
    })
}

/// Encode from per-row options, staging the mask on the way.
pub fn encode_primitive_opt<T: Primitive>(values: &[Option<T>]) -> BinVecResult<Bytes> {
    let (staged, na) = stage_options(values);
    encode_primitive(&staged, &na)
}

/// The single value shared by every present position, if there is one.
fn constant_value<T: Primitive>(values: &[T], na: &NaMask) -> Option<T> {
    let mut present = (0..values.len()).filter(|&i| na.is_present(i));
    let first = values[present.next()?];
    present.all(|i| values[i] == first).then_some(first)
}

/// An all-missing column: a header-only blob when the length fits the `aux`
/// field, otherwise a constant with an all-ones mask.
fn encode_all_missing<T: Primitive>(len: usize) -> BinVecResult<Bytes> {
    if let Ok(aux) = u16::try_from(len) {
        return Ok(empty_blob(aux));
    }
    encode_const(check_len(len)?, &NaMask::AllOnes, T::default())
}

fn encode_const<T: Primitive>(len: i32, na: &NaMask, value: T) -> BinVecResult<Bytes> {
    scratch::with_builder(|b| {
        let mask = write_na_mask(b, na);
        let mut packed = Vec::with_capacity(8);
        T::pack(std::slice::from_ref(&value), T::NATURAL_NBITS, &mut packed);
        let data = b.create_byte_vector(&packed, usize::from(T::NATURAL_NBITS / 8).max(1));
        let root = create_simple_primitive_vector(b, len, mask, T::NATURAL_NBITS, data);
        b.finish(root);
        Ok(finish_blob(b, WireHeader::new(MajorType::Const, subtype::PRIMITIVE)))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vector::{inspect, BinaryVector, PrimitiveVector};
    use crate::wire::MajorType;

    #[test]
    fn all_missing_encodes_as_a_header_only_blob() {
        let blob = encode_primitive_opt::<i32>(&[None; 12]).unwrap();
        assert!(blob.len() <= 8);
        let v = PrimitiveVector::<i32>::parse(blob).unwrap();
        assert_eq!(v.len(), 12);
        assert!((0..12).all(|i| !v.is_available(i)));
    }

    #[test]
    fn constant_blob_size_is_independent_of_length() {
        let short = encode_primitive(&vec![42i64; 10], &NaMask::AllZeroes).unwrap();
        let long = encode_primitive(&vec![42i64; 100_000], &NaMask::AllZeroes).unwrap();
        assert_eq!(short.len(), long.len());

        let v = PrimitiveVector::<i64>::parse(long).unwrap();
        assert_eq!(v.len(), 100_000);
        assert_eq!(v.get(99_999), 42);
    }

    #[test]
    fn a_unique_present_value_with_missing_stays_simple() {
        let blob = encode_primitive_opt(&[Some(7i32), None]).unwrap();
        let summary = inspect(&blob).unwrap();
        assert_eq!(summary.major, MajorType::Simple);

        let v = PrimitiveVector::<i32>::parse(blob).unwrap();
        assert_eq!(v.get_safe(0), Some(7));
        assert_eq!(v.get_safe(1), None);
    }

    #[test]
    fn equal_present_values_with_missing_become_constant() {
        let blob = encode_primitive_opt(&[Some(5i32), None, Some(5)]).unwrap();
        assert_eq!(inspect(&blob).unwrap().major, MajorType::Const);

        let v = PrimitiveVector::<i32>::parse(blob).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.get_safe(0), Some(5));
        assert_eq!(v.get_safe(1), None);
        assert_eq!(v.get_safe(2), Some(5));
    }

    #[test]
    fn floats_keep_their_natural_width() {
        let blob = encode_primitive_opt(&[Some(1.5f64), Some(-2.25)]).unwrap();
        assert_eq!(inspect(&blob).unwrap().nbits, Some(64));
        let v = PrimitiveVector::<f64>::parse(blob).unwrap();
        assert_eq!(v.get(0), 1.5);
        assert_eq!(v.get(1), -2.25);
    }
}
