//! End-to-end round trips through the encoder, the wire format, and the
//! column handles.

use std::sync::Arc;

use binvec::{
    encode_primitive_opt, encode_strings_opt, inspect, pack_rows, BinaryVector, ColumnDef, DType,
    EncodeOptions, MajorType, PrimitiveVector, Registry, StringVector, TupleRowReader, Utf8Str,
};

fn person(name: Option<&str>, age: Option<i32>) -> TupleRowReader {
    TupleRowReader::new(vec![name.map(Into::into), age.map(Into::into)])
}

#[test]
fn rows_round_trip_across_both_columns() {
    let schema = vec![
        ColumnDef::new("name", DType::Utf8),
        ColumnDef::new("age", DType::Int32),
    ];
    let rows = vec![
        person(Some("Matthew Perry"), Some(18)),
        person(Some("Michelle Pfeiffer"), None),
        person(Some("George C"), Some(59)),
        person(Some("Rich Sherman"), Some(26)),
        person(None, None),
    ];
    let columns = pack_rows(schema, rows).unwrap();

    let names = StringVector::<String>::parse(columns["name"].clone()).unwrap();
    assert_eq!(names.len(), 5);
    let expected = ["Matthew Perry", "Michelle Pfeiffer", "George C", "Rich Sherman"];
    for (i, name) in expected.iter().enumerate() {
        assert_eq!(names.get_safe(i).as_deref(), Some(*name));
    }
    assert!(!names.is_available(4));

    let ages = PrimitiveVector::<i32>::parse(columns["age"].clone()).unwrap();
    assert_eq!(ages.len(), 5);
    assert_eq!(ages.get(0), 18);
    assert_eq!(ages.get(2), 59);
    assert_eq!(ages.get(3), 26);
    assert!(!ages.is_available(1));
    assert!(!ages.is_available(4));
    assert_eq!(ages.nbits(), Some(8));
}

#[test]
fn three_hundred_ints_pack_at_sixteen_bits() {
    let values: Vec<Option<i32>> = (1..=300).map(Some).collect();
    let blob = encode_primitive_opt(&values).unwrap();
    assert_eq!(inspect(&blob).unwrap().nbits, Some(16));

    let v = PrimitiveVector::<i32>::parse(blob).unwrap();
    assert_eq!(v.len(), 300);
    for (i, expected) in (1..=300).enumerate() {
        assert_eq!(v.get(i), expected);
    }
}

#[test]
fn a_thousand_booleans_pack_one_bit_each() {
    let values: Vec<Option<bool>> = (0..1000).map(|i| Some(i % 2 == 0)).collect();
    let blob = encode_primitive_opt(&values).unwrap();
    let summary = inspect(&blob).unwrap();
    assert_eq!(summary.nbits, Some(1));
    assert_eq!(summary.len, 1000);
    // 1000 bits pack into 125 bytes; the blob stays within a few table
    // frames of that.
    assert!(blob.len() < 125 + 100, "blob of {} bytes", blob.len());

    let v = PrimitiveVector::<bool>::parse(blob).unwrap();
    assert_eq!(v.len(), 1000);
    for i in 0..1000 {
        assert_eq!(v.get(i), i % 2 == 0, "index {i}");
    }
}

#[test]
fn repeated_strings_collapse_to_a_constant() {
    let values: Vec<Option<&str>> = vec![Some("abc"); 100];
    let blob = encode_strings_opt(&values, &EncodeOptions::default()).unwrap();
    assert_eq!(inspect(&blob).unwrap().major, MajorType::Const);
    assert!(blob.len() <= 48, "blob of {} bytes", blob.len());

    let v = StringVector::<String>::parse(blob).unwrap();
    assert_eq!(v.len(), 100);
    assert!(v.iter().all(|s| s == "abc"));
    assert_eq!(v.iter().count(), 100);
}

#[test]
fn palette_strings_round_trip_through_a_dictionary() {
    let palette = ["spring", "summer", "autumn", "winter"];
    let values: Vec<Option<&str>> = (0..100).map(|i| Some(palette[i % 4])).collect();
    let blob = encode_strings_opt(&values, &EncodeOptions::default()).unwrap();

    let summary = inspect(&blob).unwrap();
    assert_eq!(summary.major, MajorType::Dict);
    assert_eq!(summary.nbits, Some(8));

    let v = StringVector::<String>::parse(blob).unwrap();
    for (i, expected) in values.iter().enumerate() {
        assert_eq!(v.get_safe(i).as_deref(), *expected);
    }
}

#[test]
fn zero_copy_views_order_and_hash() {
    let apple = Utf8Str::from("apple");
    let apricot = Utf8Str::from("apricot");
    let banana = Utf8Str::from("banana");

    assert!(apple < apricot);
    assert_eq!(apple.hash32(), Utf8Str::from("apple").hash32());
    assert_ne!(apple.hash32(), banana.hash32());
    assert_ne!(apple.hash64(), banana.hash64());
}

#[test]
fn zero_length_columns_are_empty_blobs() {
    let blob = encode_primitive_opt::<i64>(&[]).unwrap();
    assert_eq!(blob.len(), 4);
    let summary = inspect(&blob).unwrap();
    assert_eq!(summary.major, MajorType::Empty);
    assert_eq!(summary.len, 0);

    let v = PrimitiveVector::<i64>::parse(blob).unwrap();
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
}

#[test]
fn single_row_columns_round_trip_on_every_path() {
    let int = PrimitiveVector::<i64>::parse(encode_primitive_opt(&[Some(-9i64)]).unwrap()).unwrap();
    assert_eq!(int.get_safe(0), Some(-9));

    let float =
        PrimitiveVector::<f32>::parse(encode_primitive_opt(&[Some(0.5f32)]).unwrap()).unwrap();
    assert_eq!(float.get_safe(0), Some(0.5));

    let boolean =
        PrimitiveVector::<bool>::parse(encode_primitive_opt(&[Some(true)]).unwrap()).unwrap();
    assert_eq!(boolean.get_safe(0), Some(true));

    let string = StringVector::<String>::parse(
        encode_strings_opt(&[Some("only")], &EncodeOptions::default()).unwrap(),
    )
    .unwrap();
    assert_eq!(string.get_safe(0).as_deref(), Some("only"));

    let missing = StringVector::<String>::parse(
        encode_strings_opt(&[None], &EncodeOptions::default()).unwrap(),
    )
    .unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing.get_safe(0), None);
}

#[test]
fn option_iteration_matches_the_input() {
    let values = [Some(3i32), None, Some(-40), None, Some(512)];
    let v = PrimitiveVector::<i32>::parse(encode_primitive_opt(&values).unwrap()).unwrap();
    assert_eq!(v.iter_opt().collect::<Vec<_>>(), values.to_vec());
    assert_eq!(v.iter().collect::<Vec<_>>(), vec![3, -40, 512]);
}

#[test]
fn views_read_straight_out_of_the_blob() {
    let values = [Some("left"), None, Some("right")];
    let blob = encode_strings_opt(&values, &EncodeOptions::default()).unwrap();
    let v = StringVector::<Utf8Str>::parse(blob).unwrap();

    let left = v.get_safe(0).unwrap();
    assert_eq!(left, "left");
    assert_eq!(left.hash64(), left.clone().hash64());
    assert_eq!(v.get_safe(1), None);
    assert_eq!(v.get_safe(2).unwrap(), "right");
}

#[test]
fn handles_are_shareable_across_threads() {
    let values: Vec<Option<i64>> = (0..4096).map(|i| Some(i * 3)).collect();
    let v = Arc::new(
        PrimitiveVector::<i64>::parse(encode_primitive_opt(&values).unwrap()).unwrap(),
    );

    let workers: Vec<_> = (0..4)
        .map(|w| {
            let v = Arc::clone(&v);
            std::thread::spawn(move || {
                for i in (w..4096).step_by(4) {
                    assert_eq!(v.get(i), i as i64 * 3);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn registry_covers_every_default_type() {
    let registry = Registry::with_defaults();
    let schema = vec![
        ColumnDef::new("flag", DType::Bool),
        ColumnDef::new("small", DType::Int32),
        ColumnDef::new("big", DType::Int64),
        ColumnDef::new("ratio", DType::Float64),
        ColumnDef::new("label", DType::Utf8),
    ];
    let rows = vec![
        TupleRowReader::new(vec![
            Some(true.into()),
            Some(7i32.into()),
            Some(7_000_000_000i64.into()),
            Some(0.25f64.into()),
            Some("seven".into()),
        ]),
        TupleRowReader::new(vec![None, None, None, None, None]),
    ];
    let columns = pack_rows(schema.clone(), rows).unwrap();

    for def in &schema {
        let column = registry
            .open(def.dtype, Some(columns[&def.name].clone()), 0)
            .unwrap();
        assert_eq!(column.len(), 2, "column {}", def.name);
        assert!(column.is_available(0));
        assert!(!column.is_available(1));
        assert!(column.get_boxed(0).is_some());
        assert!(column.get_boxed(1).is_none());
    }
}
