//! The four-byte wire prefix that identifies a blob's encoding.
//!
//! ```text
//! blob   := header (4 bytes, little-endian u32) || payload
//! header := u8 major_type || u8 sub_type || u16 aux
//! ```
//!
//! `aux` carries the declared logical length for [`MajorType::Empty`] blobs
//! and is zero otherwise.

use binvec_error::{binvec_bail, BinVecResult};
use binvec_flatbuffers::bytes::load_u32;

/// Byte length of the wire prefix; the table payload starts here.
pub const HEADER_LEN: usize = 4;

/// The major vector kind. The set is closed; codes are stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MajorType {
    /// No payload; `aux` is the declared length and every position missing.
    Empty = 1,
    /// Single-level encoding: packed primitives, strings, or booleans.
    Simple = 2,
    /// A dictionary of distinct values plus packed codes.
    Dict = 3,
    /// One stored value repeated for every present position.
    Const = 4,
}

/// Sub-type codes; interpretation depends on the major type.
pub mod subtype {
    pub const PRIMITIVE: u8 = 0;
    pub const STRING: u8 = 1;
    pub const BOOL: u8 = 2;
}

/// A decoded wire prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireHeader {
    pub major: MajorType,
    pub sub: u8,
    pub aux: u16,
}

impl WireHeader {
    pub fn new(major: MajorType, sub: u8) -> Self {
        Self { major, sub, aux: 0 }
    }

    pub fn with_aux(major: MajorType, sub: u8, aux: u16) -> Self {
        Self { major, sub, aux }
    }

    /// Pack into the little-endian prefix word.
    pub fn encode(&self) -> u32 {
        (self.major as u32) | ((self.sub as u32) << 8) | ((self.aux as u32) << 16)
    }

    /// Unpack a prefix word, rejecting unknown type codes.
    pub fn decode(word: u32) -> BinVecResult<Self> {
        let major = match (word & 0xff) as u8 {
            1 => MajorType::Empty,
            2 => MajorType::Simple,
            3 => MajorType::Dict,
            4 => MajorType::Const,
            code => binvec_bail!(MalformedHeader: "unknown major type {code}"),
        };
        let sub = ((word >> 8) & 0xff) as u8;
        let aux = (word >> 16) as u16;
        let legal = match major {
            MajorType::Empty => sub == 0,
            MajorType::Simple => {
                matches!(sub, subtype::PRIMITIVE | subtype::STRING | subtype::BOOL)
            }
            MajorType::Dict => sub == subtype::STRING,
            MajorType::Const => matches!(sub, subtype::PRIMITIVE | subtype::STRING),
        };
        if !legal {
            binvec_bail!(MalformedHeader: "sub type {sub} is not valid for {major:?}");
        }
        Ok(Self { major, sub, aux })
    }

    /// Decode the prefix of a blob.
    pub fn parse(blob: &[u8]) -> BinVecResult<Self> {
        if blob.len() < HEADER_LEN {
            binvec_bail!(MalformedHeader: "blob of {} bytes is shorter than the header", blob.len());
        }
        Self::decode(load_u32(blob, 0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        for major in [MajorType::Simple, MajorType::Dict, MajorType::Const] {
            let sub = match major {
                MajorType::Dict | MajorType::Const => subtype::STRING,
                _ => subtype::PRIMITIVE,
            };
            let header = WireHeader::new(major, sub);
            assert_eq!(WireHeader::decode(header.encode()).unwrap(), header);
        }
        let empty = WireHeader::with_aux(MajorType::Empty, 0, 1234);
        assert_eq!(WireHeader::decode(empty.encode()).unwrap(), empty);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(WireHeader::decode(0).is_err());
        assert!(WireHeader::decode(9).is_err());
        // BOOL is only meaningful under SIMPLE.
        let bad = (MajorType::Dict as u32) | ((subtype::BOOL as u32) << 8);
        assert!(WireHeader::decode(bad).is_err());
    }

    #[test]
    fn rejects_short_blobs() {
        assert!(WireHeader::parse(&[1, 0]).is_err());
    }
}
