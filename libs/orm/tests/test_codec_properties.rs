//! The round-trip law `decode(encode(v, f), f) == v`, checked for every
//! codec over the native set, text mode, containers and nested objects.

mod common;

use std::collections::{BTreeMap, HashMap};

use cellmap::codec::SERIALIZE_AS_STRING;
use cellmap::{BestFitCodec, BinaryCodec, Codec, CodecError, CodecFlags, ColumnValue, JsonCodec};
use common::Address;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn plain() -> CodecFlags {
    CodecFlags::new()
}

fn as_string() -> CodecFlags {
    CodecFlags::new().with(SERIALIZE_AS_STRING, "true")
}

/// Asserts the law for `value` under every codec and both flag sets.
fn check_all<V>(value: &V) -> Result<(), TestCaseError>
where
    V: ColumnValue + PartialEq + std::fmt::Debug,
{
    check(&BestFitCodec, value, &plain())?;
    check(&BestFitCodec, value, &as_string())?;
    check(&JsonCodec, value, &plain())?;
    check(&JsonCodec, value, &as_string())?;
    check(&BinaryCodec, value, &plain())?;
    check(&BinaryCodec, value, &as_string())
}

fn check<C, V>(codec: &C, value: &V, flags: &CodecFlags) -> Result<(), TestCaseError>
where
    C: Codec,
    V: ColumnValue + PartialEq + std::fmt::Debug,
{
    prop_assert!(codec.can_deserialize::<V>());
    let bytes = codec
        .serialize(Some(value), flags)
        .map_err(|e| TestCaseError::fail(format!("{} encode: {e}", codec.name())))?;
    let back: Option<V> = codec
        .deserialize(bytes.as_deref(), flags)
        .map_err(|e| TestCaseError::fail(format!("{} decode: {e}", codec.name())))?;
    prop_assert_eq!(back.as_ref(), Some(value), "codec {} flags {}", codec.name(), flags);
    Ok(())
}

fn arb_address() -> impl Strategy<Value = Address> {
    (
        "\\PC{0,24}",
        proptest::option::of(any::<u32>()),
        proptest::collection::vec("\\PC{0,8}", 0..4),
    )
        .prop_map(|(line1, pin, tags)| Address { line1, pin, tags })
}

proptest! {
    #[test]
    fn prop_bool(v in any::<bool>()) {
        check_all(&v)?;
    }

    #[test]
    fn prop_i16(v in any::<i16>()) {
        check_all(&v)?;
    }

    #[test]
    fn prop_i32(v in any::<i32>()) {
        check_all(&v)?;
    }

    #[test]
    fn prop_i64(v in any::<i64>()) {
        check_all(&v)?;
    }

    #[test]
    fn prop_finite_f32(v in proptest::num::f32::NORMAL | proptest::num::f32::ZERO) {
        check_all(&v)?;
    }

    #[test]
    fn prop_finite_f64(v in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        check_all(&v)?;
    }

    #[test]
    fn prop_string(v in "\\PC{0,64}") {
        check_all(&v)?;
    }

    #[test]
    fn prop_decimal(mantissa in any::<i64>(), scale in 0u32..=28) {
        check_all(&Decimal::new(mantissa, scale))?;
    }

    #[test]
    fn prop_unsigned_and_small_ints(a in any::<u8>(), b in any::<u64>(), c in any::<i8>()) {
        check_all(&a)?;
        check_all(&b)?;
        check_all(&c)?;
    }

    #[test]
    fn prop_nested_object(address in arb_address()) {
        check_all(&address)?;
    }

    #[test]
    fn prop_containers(
        list in proptest::collection::vec(any::<i32>(), 0..8),
        by_name in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..6),
        by_id in proptest::collection::hash_map(any::<u16>(), "\\PC{0,6}", 0..6),
    ) {
        check_all(&list)?;
        check_all(&by_name)?;
        check_all(&by_id)?;
    }
}

#[test]
fn test_absent_value_has_no_bytes() {
    assert_eq!(BestFitCodec.serialize::<i32>(None, &plain()).unwrap(), None);
    assert_eq!(JsonCodec.serialize::<String>(None, &plain()).unwrap(), None);
    assert_eq!(BinaryCodec.serialize::<Address>(None, &plain()).unwrap(), None);
    assert_eq!(BestFitCodec.deserialize::<i32>(None, &plain()).unwrap(), None);
}

#[test]
fn test_non_finite_floats_survive_native_and_binary() {
    for v in [f64::INFINITY, f64::NEG_INFINITY] {
        let bytes = BestFitCodec.encode(&v, &plain()).unwrap();
        assert_eq!(BestFitCodec.decode::<f64>(&bytes, &plain()).unwrap(), v);
        let bytes = BinaryCodec.encode(&v, &plain()).unwrap();
        assert_eq!(BinaryCodec.decode::<f64>(&bytes, &plain()).unwrap(), v);
    }
    let bytes = BestFitCodec.encode(&f64::NAN, &plain()).unwrap();
    assert!(BestFitCodec.decode::<f64>(&bytes, &plain()).unwrap().is_nan());
}

#[test]
fn test_best_fit_layouts() {
    assert_eq!(BestFitCodec.encode(&true, &plain()).unwrap(), vec![0xFF]);
    assert_eq!(BestFitCodec.encode(&7i16, &plain()).unwrap(), vec![0, 7]);
    assert_eq!(BestFitCodec.encode(&"IND".to_string(), &plain()).unwrap(), b"IND".to_vec());
    assert_eq!(
        BestFitCodec.encode(&Decimal::new(12345, 2), &plain()).unwrap(),
        b"123.45".to_vec()
    );
    assert_eq!(BestFitCodec.encode(&true, &as_string()).unwrap(), b"true".to_vec());

    let map: BTreeMap<String, i32> = BTreeMap::from([("a".to_string(), 1)]);
    assert_eq!(BestFitCodec.encode(&map, &plain()).unwrap(), br#"{"a":1}"#.to_vec());
}

#[test]
fn test_decode_failures_are_codec_errors() {
    assert!(matches!(
        BestFitCodec.decode::<i32>(&[1, 2, 3], &plain()),
        Err(CodecError::Width { expected: 4, found: 3, .. })
    ));
    assert!(matches!(
        BestFitCodec.decode::<i32>(b"12x", &as_string()),
        Err(CodecError::Text { .. })
    ));
    assert!(matches!(
        BestFitCodec.decode::<String>(&[0xFF, 0xFE], &plain()),
        Err(CodecError::Utf8 { .. })
    ));
    assert!(matches!(
        JsonCodec.decode::<HashMap<String, i32>>(b"[1]", &plain()),
        Err(CodecError::Json(_))
    ));
    assert!(matches!(
        BinaryCodec.decode::<i32>(b"", &plain()),
        Err(CodecError::Compression { .. })
    ));
}
