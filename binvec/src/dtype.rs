//! Element types and the behavior of natively packable primitives.

use binvec_error::binvec_panic;
use itertools::{Itertools, MinMaxResult};
use num_traits::{AsPrimitive, PrimInt};

use crate::packed::{pack_bits, PackedData};
use crate::wire::subtype;

/// Logical element type of a column, the key of the decoder registry.
///
/// `DateTime` and `SqlTimestamp` columns reduce to 64-bit epoch-millisecond
/// primitives on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Owned UTF-8 strings.
    Utf8,
    /// Zero-copy UTF-8 views into the blob.
    Utf8View,
    DateTime,
    SqlTimestamp,
}

impl DType {
    /// Whether columns of this type use the string encodings.
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::Utf8 | Self::Utf8View)
    }
}

/// A native Rust type that packs into a `SimplePrimitiveVector` payload.
///
/// Implementations define which bit-widths they accept, how the encoder
/// chooses the narrowest one, and how a packed element is loaded back.
/// Integer elements narrower than their natural width are stored as the low
/// `nbits` bits and sign-extended on load.
pub trait Primitive:
    Copy + std::fmt::Debug + Default + PartialEq + Send + Sync + 'static
{
    const DTYPE: DType;
    /// The full width of this type.
    const NATURAL_NBITS: u8;
    /// Wire sub-type under `SIMPLE`.
    const SIMPLE_SUB: u8;

    /// Whether a stored bit-width is readable as this type.
    fn accepts_nbits(nbits: u8) -> bool;

    /// The narrowest accepted width covering the observed values.
    fn select_nbits(values: &[Self]) -> u8;

    /// Append `values` packed at `nbits` bits each.
    fn pack(values: &[Self], nbits: u8, out: &mut Vec<u8>);

    /// Load element `index`. The width was validated at parse time.
    fn load(data: &PackedData, index: usize) -> Self;
}

/// The narrowest two's-complement width in {8, 16, 32, 64} covering
/// `[min, max]`.
fn int_nbits(min: i64, max: i64) -> u8 {
    if min >= i8::MIN as i64 && max <= i8::MAX as i64 {
        8
    } else if min >= i16::MIN as i64 && max <= i16::MAX as i64 {
        16
    } else if min >= i32::MIN as i64 && max <= i32::MAX as i64 {
        32
    } else {
        64
    }
}

fn int_minmax<T>(values: &[T]) -> (i64, i64)
where
    T: PrimInt + AsPrimitive<i64>,
{
    match values.iter().minmax() {
        MinMaxResult::NoElements => (0, 0),
        MinMaxResult::OneElement(v) => ((*v).as_(), (*v).as_()),
        MinMaxResult::MinMax(lo, hi) => ((*lo).as_(), (*hi).as_()),
    }
}

impl Primitive for bool {
    const DTYPE: DType = DType::Bool;
    const NATURAL_NBITS: u8 = 1;
    const SIMPLE_SUB: u8 = subtype::BOOL;

    fn accepts_nbits(nbits: u8) -> bool {
        nbits == 1
    }

    fn select_nbits(_values: &[Self]) -> u8 {
        1
    }

    fn pack(values: &[Self], nbits: u8, out: &mut Vec<u8>) {
        debug_assert_eq!(nbits, 1);
        pack_bits(values.iter().copied(), out);
    }

    #[inline]
    fn load(data: &PackedData, index: usize) -> Self {
        data.bit(index)
    }
}

impl Primitive for i32 {
    const DTYPE: DType = DType::Int32;
    const NATURAL_NBITS: u8 = 32;
    const SIMPLE_SUB: u8 = subtype::PRIMITIVE;

    fn accepts_nbits(nbits: u8) -> bool {
        matches!(nbits, 8 | 16 | 32)
    }

    fn select_nbits(values: &[Self]) -> u8 {
        let (min, max) = int_minmax(values);
        int_nbits(min, max)
    }

    fn pack(values: &[Self], nbits: u8, out: &mut Vec<u8>) {
        match nbits {
            8 => out.extend(values.iter().map(|v| *v as u8)),
            16 => {
                for v in values {
                    out.extend_from_slice(&(*v as i16).to_le_bytes());
                }
            }
            32 => {
                for v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
            n => binvec_panic!("cannot pack i32 at {n} bits"),
        }
    }

    #[inline]
    fn load(data: &PackedData, index: usize) -> Self {
        match data.nbits() {
            8 => data.u8_at(index) as i8 as i32,
            16 => data.u16_at(index) as i16 as i32,
            _ => data.u32_at(index) as i32,
        }
    }
}

impl Primitive for i64 {
    const DTYPE: DType = DType::Int64;
    const NATURAL_NBITS: u8 = 64;
    const SIMPLE_SUB: u8 = subtype::PRIMITIVE;

    fn accepts_nbits(nbits: u8) -> bool {
        matches!(nbits, 8 | 16 | 32 | 64)
    }

    fn select_nbits(values: &[Self]) -> u8 {
        let (min, max) = int_minmax(values);
        int_nbits(min, max)
    }

    fn pack(values: &[Self], nbits: u8, out: &mut Vec<u8>) {
        match nbits {
            8 => out.extend(values.iter().map(|v| *v as u8)),
            16 => {
                for v in values {
                    out.extend_from_slice(&(*v as i16).to_le_bytes());
                }
            }
            32 => {
                for v in values {
                    out.extend_from_slice(&(*v as i32).to_le_bytes());
                }
            }
            64 => {
                for v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
            n => binvec_panic!("cannot pack i64 at {n} bits"),
        }
    }

    #[inline]
    fn load(data: &PackedData, index: usize) -> Self {
        match data.nbits() {
            8 => data.u8_at(index) as i8 as i64,
            16 => data.u16_at(index) as i16 as i64,
            32 => data.u32_at(index) as i32 as i64,
            _ => data.u64_at(index) as i64,
        }
    }
}

impl Primitive for f32 {
    const DTYPE: DType = DType::Float32;
    const NATURAL_NBITS: u8 = 32;
    const SIMPLE_SUB: u8 = subtype::PRIMITIVE;

    fn accepts_nbits(nbits: u8) -> bool {
        nbits == 32
    }

    fn select_nbits(_values: &[Self]) -> u8 {
        32
    }

    fn pack(values: &[Self], nbits: u8, out: &mut Vec<u8>) {
        debug_assert_eq!(nbits, 32);
        for v in values {
            out.extend_from_slice(&v.to_bits().to_le_bytes());
        }
    }

    #[inline]
    fn load(data: &PackedData, index: usize) -> Self {
        f32::from_bits(data.u32_at(index))
    }
}

impl Primitive for f64 {
    const DTYPE: DType = DType::Float64;
    const NATURAL_NBITS: u8 = 64;
    const SIMPLE_SUB: u8 = subtype::PRIMITIVE;

    fn accepts_nbits(nbits: u8) -> bool {
        nbits == 64
    }

    fn select_nbits(_values: &[Self]) -> u8 {
        64
    }

    fn pack(values: &[Self], nbits: u8, out: &mut Vec<u8>) {
        debug_assert_eq!(nbits, 64);
        for v in values {
            out.extend_from_slice(&v.to_bits().to_le_bytes());
        }
    }

    #[inline]
    fn load(data: &PackedData, index: usize) -> Self {
        f64::from_bits(data.u64_at(index))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn width_selection_is_minimal() {
        assert_eq!(i32::select_nbits(&[0, 5, -5]), 8);
        assert_eq!(i32::select_nbits(&[1, 300]), 16);
        assert_eq!(i32::select_nbits(&[-200, 100]), 16);
        assert_eq!(i32::select_nbits(&[70_000]), 32);
        assert_eq!(i64::select_nbits(&[i64::from(i32::MAX) + 1]), 64);
        assert_eq!(i64::select_nbits(&[]), 8);
    }

    #[test]
    fn narrow_pack_round_trips_negative_values() {
        let values = [-128i32, -1, 0, 127];
        assert_eq!(i32::select_nbits(&values), 8);
        let mut out = Vec::new();
        i32::pack(&values, 8, &mut out);
        let data = PackedData::new(bytes::Bytes::from(out), 0, 8);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(i32::load(&data, i), *v);
        }
    }

    #[test]
    fn sixteen_bit_pack_round_trips() {
        let values: Vec<i64> = (-300..300).collect();
        assert_eq!(i64::select_nbits(&values), 16);
        let mut out = Vec::new();
        i64::pack(&values, 16, &mut out);
        let data = PackedData::new(bytes::Bytes::from(out), 0, 16);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(i64::load(&data, i), *v);
        }
    }
}
