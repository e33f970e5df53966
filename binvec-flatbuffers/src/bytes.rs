//! Little-endian scalar loads over a byte region.
//!
//! The `load_*` functions assume the caller has already established that the
//! read is in bounds (the table reader validates ranges before handing out
//! positions); an out-of-range load panics via the slice index.

macro_rules! le_load {
    ($name:ident, $T:ty) => {
        #[inline]
        pub fn $name(buf: &[u8], pos: usize) -> $T {
            let mut le = [0u8; size_of::<$T>()];
            le.copy_from_slice(&buf[pos..pos + size_of::<$T>()]);
            <$T>::from_le_bytes(le)
        }
    };
}

le_load!(load_u16, u16);
le_load!(load_u32, u32);
le_load!(load_u64, u64);
le_load!(load_i16, i16);
le_load!(load_i32, i32);
le_load!(load_i64, i64);

#[inline]
pub fn load_u8(buf: &[u8], pos: usize) -> u8 {
    buf[pos]
}

#[inline]
pub fn load_i8(buf: &[u8], pos: usize) -> i8 {
    buf[pos] as i8
}

#[inline]
pub fn load_f32(buf: &[u8], pos: usize) -> f32 {
    f32::from_bits(load_u32(buf, pos))
}

#[inline]
pub fn load_f64(buf: &[u8], pos: usize) -> f64 {
    f64::from_bits(load_u64(buf, pos))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loads_are_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xff];
        assert_eq!(load_u8(&buf, 0), 0x01);
        assert_eq!(load_u16(&buf, 0), 0x0201);
        assert_eq!(load_u32(&buf, 1), 0x0504_0302);
        assert_eq!(load_u64(&buf, 0), 0x0807_0605_0403_0201);
        assert_eq!(load_i8(&buf, 8), -1);
        assert_eq!(load_f64(&buf, 0), f64::from_bits(0x0807_0605_0403_0201));
    }
}
