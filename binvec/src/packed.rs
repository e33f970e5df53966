//! Access to the tightly packed value region of a parsed blob.

use binvec_error::{binvec_err, BinVecResult};
use binvec_flatbuffers::bytes::{load_u16, load_u32, load_u64};
use bytes::Bytes;

/// Packed values inside a shared byte region: element `i` occupies `nbits`
/// bits at bit offset `i * nbits`, little-endian within each element.
///
/// Bounds are validated when the owning vector is constructed; reads here
/// assume `index` is within the declared length.
#[derive(Clone, Debug)]
pub struct PackedData {
    bytes: Bytes,
    pos: usize,
    nbits: u8,
}

impl PackedData {
    pub(crate) fn new(bytes: Bytes, pos: usize, nbits: u8) -> Self {
        Self { bytes, pos, nbits }
    }

    #[inline]
    pub fn nbits(&self) -> u8 {
        self.nbits
    }

    /// Single-bit element at `index`.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        let byte = self.bytes[self.pos + (index >> 3)];
        (byte >> (index & 7)) & 1 == 1
    }

    #[inline]
    pub fn u8_at(&self, index: usize) -> u8 {
        self.bytes[self.pos + index]
    }

    #[inline]
    pub fn u16_at(&self, index: usize) -> u16 {
        load_u16(&self.bytes, self.pos + index * 2)
    }

    #[inline]
    pub fn u32_at(&self, index: usize) -> u32 {
        load_u32(&self.bytes, self.pos + index * 4)
    }

    #[inline]
    pub fn u64_at(&self, index: usize) -> u64 {
        load_u64(&self.bytes, self.pos + index * 8)
    }

    /// Element at `index` zero-extended to 64 bits, e.g. a dictionary code.
    #[inline]
    pub fn uint_at(&self, index: usize) -> u64 {
        match self.nbits {
            1 => self.bit(index) as u64,
            8 => self.u8_at(index) as u64,
            16 => self.u16_at(index) as u64,
            32 => self.u32_at(index) as u64,
            _ => self.u64_at(index),
        }
    }
}

/// Bytes required to pack `len` elements of `nbits` bits each.
pub(crate) fn packed_byte_len(len: usize, nbits: u8) -> BinVecResult<usize> {
    len.checked_mul(nbits as usize)
        .map(|bits| bits.div_ceil(8))
        .ok_or_else(|| binvec_err!(LengthMismatch: "{len} elements of {nbits} bits overflow"))
}

/// Append bits little-endian-first into whole bytes, padding the final byte
/// with zeroes.
pub(crate) fn pack_bits<I: IntoIterator<Item = bool>>(bits: I, out: &mut Vec<u8>) {
    let mut current = 0u8;
    let mut filled = 0;
    for bit in bits {
        if bit {
            current |= 1 << filled;
        }
        filled += 1;
        if filled == 8 {
            out.push(current);
            current = 0;
            filled = 0;
        }
    }
    if filled > 0 {
        out.push(current);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bit_packing_is_little_endian_first() {
        let mut out = Vec::new();
        pack_bits((0..10).map(|i| i % 2 == 0), &mut out);
        assert_eq!(out, vec![0b0101_0101, 0b01]);

        let data = PackedData::new(Bytes::from(out), 0, 1);
        for i in 0..10 {
            assert_eq!(data.bit(i), i % 2 == 0, "bit {i}");
        }
    }

    #[test]
    fn fixed_width_loads() {
        let data = PackedData::new(Bytes::from_static(&[0x01, 0x02, 0x03, 0x04]), 0, 16);
        assert_eq!(data.u16_at(0), 0x0201);
        assert_eq!(data.u16_at(1), 0x0403);
        assert_eq!(data.uint_at(1), 0x0403);
    }

    #[test]
    fn packed_sizes() {
        assert_eq!(packed_byte_len(1000, 1).unwrap(), 125);
        assert_eq!(packed_byte_len(3, 16).unwrap(), 6);
        assert_eq!(packed_byte_len(0, 64).unwrap(), 0);
        assert_eq!(packed_byte_len(10, 1).unwrap(), 2);
    }
}
