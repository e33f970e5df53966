//! Typed accessors for the payload tables of `flatbuffers/vector.fbs`.
//!
//! Field slot numbers are part of the wire format and must not change.

use binvec_error::BinVecResult;

use crate::read::{Table, Vector};
use crate::write::{Builder, WIPOffset};

/// `NaMask.maskType` code: every position present.
pub const MASK_ALL_ZEROES: u8 = 0;
/// `NaMask.maskType` code: every position missing.
pub const MASK_ALL_ONES: u8 = 1;
/// `NaMask.maskType` code: an explicit bitmap follows in `bitMask`.
pub const MASK_SIMPLE_BIT_MASK: u8 = 2;

macro_rules! payload_root {
    ($table:ident) => {
        impl<'a> $table<'a> {
            /// Resolve the root table of a payload starting at `base`.
            pub fn root_at(buf: &'a [u8], base: usize) -> BinVecResult<Self> {
                Ok(Self(Table::root_at(buf, base)?))
            }
        }
    };
}

/// `NaMask` table: slot 0 `maskType`, slot 1 `bitMask: [ulong]`.
#[derive(Clone, Copy, Debug)]
pub struct NaMaskTable<'a>(Table<'a>);

payload_root!(NaMaskTable);

impl<'a> NaMaskTable<'a> {
    pub fn from_table(table: Table<'a>) -> Self {
        Self(table)
    }

    pub fn mask_type(&self) -> BinVecResult<u8> {
        self.0.get_u8(0, MASK_ALL_ZEROES)
    }

    pub fn bit_mask(&self) -> BinVecResult<Option<Vector<'a>>> {
        self.0.get_vector(1)
    }
}

/// `SimplePrimitiveVector` table: slot 0 `len`, slot 1 `naMask`,
/// slot 2 `nbits`, slot 3 `data: [ubyte]`.
#[derive(Clone, Copy, Debug)]
pub struct SimplePrimitiveVector<'a>(Table<'a>);

payload_root!(SimplePrimitiveVector);

impl<'a> SimplePrimitiveVector<'a> {
    pub fn from_table(table: Table<'a>) -> Self {
        Self(table)
    }

    pub fn len(&self) -> BinVecResult<i32> {
        self.0.get_i32(0, 0)
    }

    pub fn na_mask(&self) -> BinVecResult<Option<NaMaskTable<'a>>> {
        Ok(self.0.get_table(1)?.map(NaMaskTable::from_table))
    }

    pub fn nbits(&self) -> BinVecResult<u8> {
        self.0.get_u8(2, 0)
    }

    pub fn data(&self) -> BinVecResult<Option<Vector<'a>>> {
        self.0.get_vector(3)
    }
}

/// `SimpleStringVector` table: slot 0 `dataLen`, slot 1 `naMask`,
/// slot 2 `data: [string]`.
#[derive(Clone, Copy, Debug)]
pub struct SimpleStringVector<'a>(Table<'a>);

payload_root!(SimpleStringVector);

impl<'a> SimpleStringVector<'a> {
    pub fn data_len(&self) -> BinVecResult<i32> {
        self.0.get_i32(0, 0)
    }

    pub fn na_mask(&self) -> BinVecResult<Option<NaMaskTable<'a>>> {
        Ok(self.0.get_table(1)?.map(NaMaskTable::from_table))
    }

    pub fn data(&self) -> BinVecResult<Option<Vector<'a>>> {
        self.0.get_vector(2)
    }
}

/// `ConstStringVector` table: slot 0 `len`, slot 1 `naMask`, slot 2 `str`.
#[derive(Clone, Copy, Debug)]
pub struct ConstStringVector<'a>(Table<'a>);

payload_root!(ConstStringVector);

impl<'a> ConstStringVector<'a> {
    pub fn len(&self) -> BinVecResult<i32> {
        self.0.get_i32(0, 0)
    }

    pub fn na_mask(&self) -> BinVecResult<Option<NaMaskTable<'a>>> {
        Ok(self.0.get_table(1)?.map(NaMaskTable::from_table))
    }

    /// `(position, length)` of the stored value inside the payload.
    pub fn str_region(&self) -> BinVecResult<Option<(usize, usize)>> {
        self.0.get_str(2)
    }
}

/// `DictStringVector` table: slot 0 `len`, slot 1 `naMask`, slot 2 `info`
/// (the codes as a nested `SimplePrimitiveVector`), slot 3 `dict: [string]`.
#[derive(Clone, Copy, Debug)]
pub struct DictStringVector<'a>(Table<'a>);

payload_root!(DictStringVector);

impl<'a> DictStringVector<'a> {
    pub fn len(&self) -> BinVecResult<i32> {
        self.0.get_i32(0, 0)
    }

    pub fn na_mask(&self) -> BinVecResult<Option<NaMaskTable<'a>>> {
        Ok(self.0.get_table(1)?.map(NaMaskTable::from_table))
    }

    pub fn info(&self) -> BinVecResult<Option<SimplePrimitiveVector<'a>>> {
        Ok(self.0.get_table(2)?.map(SimplePrimitiveVector::from_table))
    }

    pub fn dict(&self) -> BinVecResult<Option<Vector<'a>>> {
        self.0.get_vector(3)
    }
}

/// Write an `NaMask` table. `bit_mask` is only meaningful with
/// [`MASK_SIMPLE_BIT_MASK`].
pub fn create_na_mask(b: &mut Builder, mask_type: u8, bit_mask: Option<&[u64]>) -> WIPOffset {
    let words = bit_mask.map(|w| b.create_u64_vector(w));
    b.start_table();
    if let Some(words) = words {
        b.push_slot_offset(1, words);
    }
    b.push_slot_u8(0, mask_type, MASK_ALL_ZEROES);
    b.end_table()
}

/// Write a `SimplePrimitiveVector` table.
pub fn create_simple_primitive_vector(
    b: &mut Builder,
    len: i32,
    na_mask: Option<WIPOffset>,
    nbits: u8,
    data: WIPOffset,
) -> WIPOffset {
    b.start_table();
    b.push_slot_offset(3, data);
    if let Some(mask) = na_mask {
        b.push_slot_offset(1, mask);
    }
    b.push_slot_i32(0, len, 0);
    b.push_slot_u8(2, nbits, 0);
    b.end_table()
}

/// Write a `SimpleStringVector` table.
pub fn create_simple_string_vector(
    b: &mut Builder,
    data_len: i32,
    na_mask: Option<WIPOffset>,
    data: WIPOffset,
) -> WIPOffset {
    b.start_table();
    b.push_slot_offset(2, data);
    if let Some(mask) = na_mask {
        b.push_slot_offset(1, mask);
    }
    b.push_slot_i32(0, data_len, 0);
    b.end_table()
}

/// Write a `ConstStringVector` table.
pub fn create_const_string_vector(
    b: &mut Builder,
    len: i32,
    na_mask: Option<WIPOffset>,
    value: WIPOffset,
) -> WIPOffset {
    b.start_table();
    b.push_slot_offset(2, value);
    if let Some(mask) = na_mask {
        b.push_slot_offset(1, mask);
    }
    b.push_slot_i32(0, len, 0);
    b.end_table()
}

/// Write a `DictStringVector` table.
pub fn create_dict_string_vector(
    b: &mut Builder,
    len: i32,
    na_mask: Option<WIPOffset>,
    info: WIPOffset,
    dict: WIPOffset,
) -> WIPOffset {
    b.start_table();
    b.push_slot_offset(3, dict);
    b.push_slot_offset(2, info);
    if let Some(mask) = na_mask {
        b.push_slot_offset(1, mask);
    }
    b.push_slot_i32(0, len, 0);
    b.end_table()
}
