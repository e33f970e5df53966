//! Bounds-checked reader for the table layout.
//!
//! A [`Table`] resolves fields through its vtable by slot number; absent
//! fields fall back to the schema default. Every accessor validates offsets
//! against the buffer before reading, so a malformed payload surfaces as an
//! error instead of a wild read.

use binvec_error::{binvec_err, BinVecResult};

use crate::bytes::{
    load_f32, load_f64, load_i16, load_i32, load_i64, load_i8, load_u16, load_u32, load_u64,
    load_u8,
};

/// Checked `pos + len` that must land within `buf_len` bytes.
#[inline]
fn checked_end(pos: usize, len: usize, buf_len: usize) -> BinVecResult<usize> {
    let end = pos
        .checked_add(len)
        .ok_or_else(|| binvec_err!(TruncatedPayload: "offset overflow at position {pos}"))?;
    if end > buf_len {
        return Err(
            binvec_err!(TruncatedPayload: "read of {len} bytes at {pos} past buffer of {buf_len}"),
        );
    }
    Ok(end)
}

macro_rules! checked_load {
    ($name:ident, $load:ident, $T:ty) => {
        #[inline]
        fn $name(buf: &[u8], pos: usize) -> BinVecResult<$T> {
            checked_end(pos, size_of::<$T>(), buf.len())?;
            Ok($load(buf, pos))
        }
    };
}

checked_load!(read_u16, load_u16, u16);
checked_load!(read_i32, load_i32, i32);
checked_load!(read_u32, load_u32, u32);
checked_load!(read_u64, load_u64, u64);

/// A table resolved inside a byte region.
#[derive(Clone, Copy, Debug)]
pub struct Table<'a> {
    buf: &'a [u8],
    loc: usize,
}

impl<'a> Table<'a> {
    /// Resolve the root table of a payload that starts at byte 0.
    pub fn root(buf: &'a [u8]) -> BinVecResult<Self> {
        Self::root_at(buf, 0)
    }

    /// Resolve the root table of a payload that starts at `base`.
    pub fn root_at(buf: &'a [u8], base: usize) -> BinVecResult<Self> {
        let uoffset = read_u32(buf, base)? as usize;
        let loc = base
            .checked_add(uoffset)
            .ok_or_else(|| binvec_err!(TruncatedPayload: "root offset overflow"))?;
        let table = Table { buf, loc };
        table.vtable()?;
        Ok(table)
    }

    /// Follow an indirect offset stored at `pos` to the table it references.
    fn indirect(buf: &'a [u8], pos: usize) -> BinVecResult<Self> {
        let uoffset = read_u32(buf, pos)? as usize;
        let loc = pos
            .checked_add(uoffset)
            .ok_or_else(|| binvec_err!(TruncatedPayload: "table offset overflow"))?;
        let table = Table { buf, loc };
        table.vtable()?;
        Ok(table)
    }

    /// Position and byte size of this table's vtable.
    fn vtable(&self) -> BinVecResult<(usize, u16)> {
        let soffset = read_i32(self.buf, self.loc)?;
        let vt = (self.loc as i64) - (soffset as i64);
        if vt < 0 {
            return Err(binvec_err!(TruncatedPayload: "vtable before start of buffer"));
        }
        let vt = vt as usize;
        let vt_size = read_u16(self.buf, vt)?;
        if vt_size < 4 {
            return Err(binvec_err!(TruncatedPayload: "vtable of {vt_size} bytes"));
        }
        checked_end(vt, vt_size as usize, self.buf.len())?;
        Ok((vt, vt_size))
    }

    /// Absolute position of the field stored in `slot`, or `None` when the
    /// field is absent and the schema default applies.
    pub fn field(&self, slot: u16) -> BinVecResult<Option<usize>> {
        let (vt, vt_size) = self.vtable()?;
        let entry = 4 + 2 * slot as usize;
        if entry + 2 > vt_size as usize {
            return Ok(None);
        }
        let voffset = read_u16(self.buf, vt + entry)?;
        if voffset == 0 {
            return Ok(None);
        }
        Ok(Some(self.loc + voffset as usize))
    }

    /// Follow the table stored in `slot`.
    pub fn get_table(&self, slot: u16) -> BinVecResult<Option<Table<'a>>> {
        match self.field(slot)? {
            None => Ok(None),
            Some(pos) => Ok(Some(Self::indirect(self.buf, pos)?)),
        }
    }

    /// Resolve the vector stored in `slot`.
    pub fn get_vector(&self, slot: u16) -> BinVecResult<Option<Vector<'a>>> {
        match self.field(slot)? {
            None => Ok(None),
            Some(pos) => {
                let uoffset = read_u32(self.buf, pos)? as usize;
                let vpos = pos
                    .checked_add(uoffset)
                    .ok_or_else(|| binvec_err!(TruncatedPayload: "vector offset overflow"))?;
                let len = read_u32(self.buf, vpos)? as usize;
                Ok(Some(Vector { buf: self.buf, pos: vpos + 4, len }))
            }
        }
    }

    /// Resolve the string stored in `slot` as a `(position, length)` pair
    /// into the underlying region.
    pub fn get_str(&self, slot: u16) -> BinVecResult<Option<(usize, usize)>> {
        match self.get_vector(slot)? {
            None => Ok(None),
            Some(v) => {
                checked_end(v.pos, v.len, self.buf.len())?;
                Ok(Some((v.pos, v.len)))
            }
        }
    }
}

macro_rules! table_scalar {
    ($name:ident, $load:ident, $T:ty) => {
        impl<'a> Table<'a> {
            /// Inline scalar in `slot`, or `default` when absent.
            pub fn $name(&self, slot: u16, default: $T) -> BinVecResult<$T> {
                match self.field(slot)? {
                    None => Ok(default),
                    Some(pos) => {
                        checked_end(pos, size_of::<$T>(), self.buf.len())?;
                        Ok($load(self.buf, pos))
                    }
                }
            }
        }
    };
}

table_scalar!(get_i8, load_i8, i8);
table_scalar!(get_u8, load_u8, u8);
table_scalar!(get_i16, load_i16, i16);
table_scalar!(get_u16, load_u16, u16);
table_scalar!(get_i32, load_i32, i32);
table_scalar!(get_i64, load_i64, i64);
table_scalar!(get_f32, load_f32, f32);
table_scalar!(get_f64, load_f64, f64);

/// A vector resolved inside a byte region: `pos` is the absolute position of
/// the first element, `len` the element count.
#[derive(Clone, Copy, Debug)]
pub struct Vector<'a> {
    buf: &'a [u8],
    pos: usize,
    len: usize,
}

impl<'a> Vector<'a> {
    /// Re-wrap a previously resolved vector, e.g. one whose position was
    /// stashed in a parsed column handle.
    pub fn new(buf: &'a [u8], pos: usize, len: usize) -> Self {
        Self { buf, pos, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute byte position of the first element.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The elements as one byte slice, for inline elements of `elem_size`
    /// bytes each.
    pub fn bytes(&self, elem_size: usize) -> BinVecResult<&'a [u8]> {
        let byte_len = self
            .len
            .checked_mul(elem_size)
            .ok_or_else(|| binvec_err!(TruncatedPayload: "vector length overflow"))?;
        let end = checked_end(self.pos, byte_len, self.buf.len())?;
        Ok(&self.buf[self.pos..end])
    }

    /// Inline `u64` element at `index`.
    pub fn get_u64(&self, index: usize) -> BinVecResult<u64> {
        self.check_index(index)?;
        read_u64(self.buf, self.pos + index * 8)
    }

    /// Absolute position of the object referenced by the offset element at
    /// `index`.
    pub fn indirect(&self, index: usize) -> BinVecResult<usize> {
        self.check_index(index)?;
        let pos = self.pos + index * 4;
        let uoffset = read_u32(self.buf, pos)? as usize;
        pos.checked_add(uoffset)
            .ok_or_else(|| binvec_err!(TruncatedPayload: "vector element offset overflow"))
    }

    /// `(position, length)` of the string element at `index`.
    pub fn get_str(&self, index: usize) -> BinVecResult<(usize, usize)> {
        let spos = self.indirect(index)?;
        let slen = read_u32(self.buf, spos)? as usize;
        checked_end(spos + 4, slen, self.buf.len())?;
        Ok((spos + 4, slen))
    }

    #[inline]
    fn check_index(&self, index: usize) -> BinVecResult<()> {
        if index >= self.len {
            return Err(
                binvec_err!(TruncatedPayload: "vector index {index} out of {} elements", self.len),
            );
        }
        Ok(())
    }
}
