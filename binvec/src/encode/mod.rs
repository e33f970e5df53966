//! Encoders: choose the smallest representation that preserves a column and
//! emit the wire format.
//!
//! Selection policy, first match wins: empty, all-missing, constant,
//! dictionary (strings under the cardinality threshold), packed primitive at
//! the minimal bit-width, plain string vector.

use binvec_error::{binvec_err, BinVecResult};
use binvec_flatbuffers::write::{Builder, WIPOffset};
use binvec_flatbuffers::vector::{create_na_mask, MASK_ALL_ONES, MASK_SIMPLE_BIT_MASK};
use binvec_mask::NaMask;
use bytes::Bytes;

use crate::wire::{MajorType, WireHeader};

mod primitive;
pub mod scratch;
mod string;

pub use primitive::{encode_primitive, encode_primitive_opt};
pub use string::{encode_strings, encode_strings_opt};

/// Knobs for the encoding selection policy.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Upper bound on dictionary cardinality. The effective threshold for a
    /// column of `n` rows is `min(n / 2, cap)`.
    pub dict_cardinality_cap: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { dict_cardinality_cap: 255 }
    }
}

impl EncodeOptions {
    /// Largest distinct-value count for which a column of `len` rows is
    /// dictionary-encoded.
    pub(crate) fn dict_threshold(&self, len: usize) -> usize {
        (len / 2).min(self.dict_cardinality_cap)
    }
}

/// Declared lengths travel as `i32`.
pub(crate) fn check_len(len: usize) -> BinVecResult<i32> {
    i32::try_from(len)
        .map_err(|_| binvec_err!(LengthMismatch: "column of {len} rows exceeds the format limit"))
}

/// A header-only blob: no payload, `aux` carries the declared length.
pub(crate) fn empty_blob(len: u16) -> Bytes {
    let header = WireHeader::with_aux(MajorType::Empty, 0, len);
    Bytes::copy_from_slice(&header.encode().to_le_bytes())
}

/// Prefix the finished payload with the wire header into a fresh region.
pub(crate) fn finish_blob(builder: &Builder, header: WireHeader) -> Bytes {
    let payload = builder.finished_data();
    let mut out = Vec::with_capacity(4 + payload.len());
    out.extend_from_slice(&header.encode().to_le_bytes());
    out.extend_from_slice(payload);
    Bytes::from(out)
}

/// Write the NA mask table, or nothing when every position is present.
pub(crate) fn write_na_mask(builder: &mut Builder, na: &NaMask) -> Option<WIPOffset> {
    match na {
        NaMask::AllZeroes => None,
        NaMask::AllOnes => Some(create_na_mask(builder, MASK_ALL_ONES, None)),
        NaMask::Bitmap(words) => {
            Some(create_na_mask(builder, MASK_SIMPLE_BIT_MASK, Some(&words.to_words())))
        }
    }
}

/// Stage `Option` values into a dense value slice plus an NA mask.
pub(crate) fn stage_options<T: Clone + Default>(values: &[Option<T>]) -> (Vec<T>, NaMask) {
    let staged = values
        .iter()
        .map(|v| v.clone().unwrap_or_default())
        .collect();
    let na = values.iter().map(Option::is_none).collect();
    (staged, na)
}
