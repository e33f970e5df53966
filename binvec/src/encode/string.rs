//! Encoding for string columns.

use binvec_error::BinVecResult;
use binvec_flatbuffers::vector::{
    create_const_string_vector, create_dict_string_vector, create_simple_primitive_vector,
    create_simple_string_vector,
};
use binvec_flatbuffers::write::Builder;
use binvec_mask::NaMask;
use bytes::Bytes;
use hashbrown::HashMap;
use log::debug;

use crate::encode::{check_len, empty_blob, finish_blob, scratch, write_na_mask, EncodeOptions};
use crate::packed::pack_bits;
use crate::wire::{subtype, MajorType, WireHeader};

/// Encode a string column. `values` holds one entry per row; missing rows
/// carry an arbitrary placeholder and are identified by `na`.
pub fn encode_strings<S: AsRef<str>>(
    values: &[S],
    na: &NaMask,
    options: &EncodeOptions,
) -> BinVecResult<Bytes> {
    let len = values.len();
    let len_i32 = check_len(len)?;
    if len == 0 {
        return Ok(empty_blob(0));
    }
    if matches!(na, NaMask::AllOnes) {
        return encode_all_missing(len);
    }
    if let Some(value) = constant_value(values, na) {
        debug!("encoding {len} rows as a string constant");
        return encode_const(len_i32, na, value);
    }
    if let Some((dict, codes)) = try_dictionary(values, na, options.dict_threshold(len)) {
        debug!("encoding {len} rows against a dictionary of {}", dict.len());
        return encode_dict(len_i32, na, &dict, &codes);
    }

    debug!("encoding {len} rows as a plain string vector");
    scratch::with_builder(|b| {
        let mask = write_na_mask(b, na);
        let offsets = (0..len)
            .map(|i| {
                let s = if na.is_present(i) { values[i].as_ref() } else { "" };
                b.create_string(s)
            })
            .collect::<Vec<_>>();
        let data = b.create_offset_vector(&offsets);
        let root = create_simple_string_vector(b, len_i32, mask, data);
        b.finish(root);
        Ok(finish_blob(b, WireHeader::new(MajorType::Simple, subtype::STRING)))
    })
}

/// Encode from per-row options, staging the mask on the way.
pub fn encode_strings_opt(
    values: &[Option<&str>],
    options: &EncodeOptions,
) -> BinVecResult<Bytes> {
    let staged: Vec<&str> = values.iter().map(|v| v.unwrap_or("")).collect();
    let na: NaMask = values.iter().map(Option::is_none).collect();
    encode_strings(&staged, &na, options)
}

fn constant_value<'a, S: AsRef<str>>(values: &'a [S], na: &NaMask) -> Option<&'a str> {
    let mut present = (0..values.len()).filter(|&i| na.is_present(i));
    let first = values[present.next()?].as_ref();
    present.all(|i| values[i].as_ref() == first).then_some(first)
}

fn encode_all_missing(len: usize) -> BinVecResult<Bytes> {
    if let Ok(aux) = u16::try_from(len) {
        return Ok(empty_blob(aux));
    }
    encode_const(check_len(len)?, &NaMask::AllOnes, "")
}

fn encode_const(len: i32, na: &NaMask, value: &str) -> BinVecResult<Bytes> {
    scratch::with_builder(|b| {
        let mask = write_na_mask(b, na);
        let value = b.create_string(value);
        let root = create_const_string_vector(b, len, mask, value);
        b.finish(root);
        Ok(finish_blob(b, WireHeader::new(MajorType::Const, subtype::STRING)))
    })
}

/// Collect the distinct present values in first-appearance order, bailing
/// out once the cardinality threshold is exceeded. Missing positions keep
/// code zero.
fn try_dictionary<'a, S: AsRef<str>>(
    values: &'a [S],
    na: &NaMask,
    threshold: usize,
) -> Option<(Vec<&'a str>, Vec<u32>)> {
    if threshold == 0 {
        return None;
    }
    let mut lookup: HashMap<&str, u32> = HashMap::with_capacity(threshold + 1);
    let mut dict: Vec<&str> = Vec::new();
    let mut codes = vec![0u32; values.len()];

    for (i, value) in values.iter().enumerate() {
        if na.is_missing(i) {
            continue;
        }
        let value = value.as_ref();
        let code = match lookup.get(value) {
            Some(code) => *code,
            None => {
                if dict.len() >= threshold {
                    return None;
                }
                let code = dict.len() as u32;
                lookup.insert(value, code);
                dict.push(value);
                code
            }
        };
        codes[i] = code;
    }
    Some((dict, codes))
}

/// The narrowest code width for a dictionary of `dict_len` entries:
/// `ceil(log2(dict_len))` rounded up into {1, 8, 16, 32}.
fn code_nbits(dict_len: usize) -> u8 {
    let needed = if dict_len <= 1 {
        0
    } else {
        (usize::BITS - (dict_len - 1).leading_zeros()) as u8
    };
    match needed {
        0..=1 => 1,
        2..=8 => 8,
        9..=16 => 16,
        _ => 32,
    }
}

fn pack_codes(codes: &[u32], nbits: u8, out: &mut Vec<u8>) {
    match nbits {
        1 => pack_bits(codes.iter().map(|c| c & 1 == 1), out),
        8 => out.extend(codes.iter().map(|c| *c as u8)),
        16 => {
            for c in codes {
                out.extend_from_slice(&(*c as u16).to_le_bytes());
            }
        }
        _ => {
            for c in codes {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
    }
}

fn encode_dict(len: i32, na: &NaMask, dict: &[&str], codes: &[u32]) -> BinVecResult<Bytes> {
    scratch::with_builder(|b| {
        let mask = write_na_mask(b, na);
        let entries = dict.iter().map(|s| b.create_string(s)).collect::<Vec<_>>();
        let dict_vec = b.create_offset_vector(&entries);
        let info = write_codes(b, len, codes, code_nbits(dict.len()));
        let root = create_dict_string_vector(b, len, mask, info, dict_vec);
        b.finish(root);
        Ok(finish_blob(b, WireHeader::new(MajorType::Dict, subtype::STRING)))
    })
}

fn write_codes(
    b: &mut Builder,
    len: i32,
    codes: &[u32],
    nbits: u8,
) -> binvec_flatbuffers::write::WIPOffset {
    let mut packed = Vec::with_capacity(codes.len() * usize::from(nbits.div_ceil(8)));
    pack_codes(codes, nbits, &mut packed);
    let data = b.create_byte_vector(&packed, usize::from(nbits / 8).max(1));
    create_simple_primitive_vector(b, len, None, nbits, data)
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;
    use crate::vector::{inspect, BinaryVector, StringVector};
    use crate::wire::MajorType;

    fn roundtrip(values: &[Option<&str>]) -> StringVector {
        let blob = encode_strings_opt(values, &EncodeOptions::default()).unwrap();
        StringVector::parse(blob).unwrap()
    }

    #[test]
    fn plain_vector_round_trips() {
        let values = [Some("rose"), None, Some("thorn"), Some("rose-bud")];
        let v = roundtrip(&values);
        assert_eq!(v.len(), 4);
        for (i, expected) in values.iter().enumerate() {
            assert_eq!(v.get_safe(i).as_deref(), *expected);
        }
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(3, 8)]
    #[case(250, 8)]
    #[case(257, 16)]
    #[case(70_000, 32)]
    fn code_widths(#[case] dict_len: usize, #[case] expected: u8) {
        assert_eq!(code_nbits(dict_len), expected);
    }

    #[test]
    fn low_cardinality_selects_dictionary() {
        let palette = ["north", "south", "east", "west"];
        let values: Vec<Option<&str>> = (0..100).map(|i| Some(palette[i % 4])).collect();
        let blob = encode_strings_opt(&values, &EncodeOptions::default()).unwrap();
        let summary = inspect(&blob).unwrap();
        assert_eq!(summary.major, MajorType::Dict);
        assert_eq!(summary.nbits, Some(8));

        let v = StringVector::<String>::parse(blob).unwrap();
        for (i, value) in values.iter().enumerate() {
            assert_eq!(v.get_safe(i).as_deref(), *value);
        }
    }

    #[test]
    fn threshold_edge_flips_to_plain_strings() {
        let strings: Vec<String> = (0..256).map(|i| format!("value-{i}")).collect();
        // 512 rows over 255 distinct values sits exactly on the default
        // threshold; one more distinct value tips it over.
        let at: Vec<Option<&str>> =
            (0..512).map(|i| Some(strings[i % 255].as_str())).collect();
        let over: Vec<Option<&str>> =
            (0..512).map(|i| Some(strings[i % 256].as_str())).collect();

        let options = EncodeOptions::default();
        let at_blob = encode_strings_opt(&at, &options).unwrap();
        let over_blob = encode_strings_opt(&over, &options).unwrap();
        assert_eq!(inspect(&at_blob).unwrap().major, MajorType::Dict);
        assert_eq!(inspect(&over_blob).unwrap().major, MajorType::Simple);
    }

    #[test]
    fn two_entry_dictionary_packs_single_bit_codes() {
        let values: Vec<Option<&str>> =
            (0..64).map(|i| Some(if i % 2 == 0 { "on" } else { "off" })).collect();
        let blob = encode_strings_opt(&values, &EncodeOptions::default()).unwrap();
        let summary = inspect(&blob).unwrap();
        assert_eq!(summary.major, MajorType::Dict);
        assert_eq!(summary.nbits, Some(1));

        let v = StringVector::<String>::parse(blob).unwrap();
        assert_eq!(v.get(0), "on");
        assert_eq!(v.get(63), "off");
    }
}
