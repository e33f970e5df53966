//! The dictionary encoding: distinct values plus packed codes.

use binvec_error::{binvec_bail, binvec_err, binvec_panic, BinVecError, BinVecResult};
use binvec_flatbuffers::read::Vector;
use binvec_flatbuffers::vector::DictStringVector;
use binvec_mask::NaMask;
use bytes::Bytes;

use crate::packed::{packed_byte_len, PackedData};
use crate::vector::{parse_len, parse_mask};
use crate::wire::HEADER_LEN;

/// A parsed dictionary column: `get(i) = dict[code(i)]`.
///
/// The code at a missing position is unspecified and never read; reads are
/// guarded by the NA mask.
#[derive(Clone, Debug)]
pub(crate) struct DictStrings {
    blob: Bytes,
    len: usize,
    na: NaMask,
    codes: PackedData,
    dict_pos: usize,
    dict_len: usize,
}

impl DictStrings {
    pub(crate) fn parse(blob: Bytes) -> BinVecResult<Self> {
        let table = DictStringVector::root_at(&blob, HEADER_LEN)?;
        let len = parse_len(table.len()?)?;
        let na = parse_mask(&blob, table.na_mask()?)?;

        let info = table
            .info()?
            .ok_or_else(|| binvec_err!(TruncatedPayload: "dictionary vector without codes"))?;
        let code_len = parse_len(info.len()?)?;
        if code_len != len {
            binvec_bail!(LengthMismatch: "{len} rows but {code_len} codes");
        }
        let nbits = info.nbits()?;
        if !matches!(nbits, 1 | 8 | 16 | 32) {
            return Err(BinVecError::UnsupportedNBits(nbits));
        }
        let data = info
            .data()?
            .ok_or_else(|| binvec_err!(TruncatedPayload: "dictionary codes without data"))?;
        let stored = data.bytes(1)?.len();
        let needed = packed_byte_len(len, nbits)?;
        if stored < needed {
            binvec_bail!(LengthMismatch: "code data holds {stored} bytes but {needed} are required");
        }

        let dict = table
            .dict()?
            .ok_or_else(|| binvec_err!(TruncatedPayload: "dictionary vector without entries"))?;
        dict.bytes(4)?;
        // Dictionaries are small; validate every entry up front so element
        // access cannot fail on the dictionary side.
        for i in 0..dict.len() {
            let (pos, byte_len) = dict.get_str(i)?;
            std::str::from_utf8(&blob[pos..pos + byte_len])?;
        }

        Ok(Self {
            codes: PackedData::new(blob.clone(), data.pos(), nbits),
            dict_pos: dict.pos(),
            dict_len: dict.len(),
            blob,
            len,
            na,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn blob(&self) -> &Bytes {
        &self.blob
    }

    #[inline]
    pub(crate) fn is_present(&self, index: usize) -> bool {
        self.na.is_present(index)
    }

    /// `(position, length)` of the dictionary entry coded at `index`.
    pub(crate) fn region(&self, index: usize) -> (usize, usize) {
        let code = self.codes.uint_at(index) as usize;
        if code >= self.dict_len {
            binvec_panic!("code {code} at {index} exceeds a dictionary of {}", self.dict_len);
        }
        Vector::new(&self.blob, self.dict_pos, self.dict_len)
            .get_str(code)
            .unwrap_or_else(|err| binvec_panic!("corrupt dictionary: {err}"))
    }
}
