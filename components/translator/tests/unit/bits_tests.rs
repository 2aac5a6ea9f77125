//! Tests for BitSource and BitSink

use translator::{BitSink, BitSource, Number, WireTag};

fn encode(write: impl FnOnce(&mut BitSink)) -> Vec<u8> {
    let mut sink = BitSink::new();
    write(&mut sink);
    sink.into_bytes()
}

#[test]
fn test_byte_layout() {
    assert_eq!(encode(|s| s.write_null()), vec![0]);
    assert_eq!(encode(|s| s.write_boolean(true)), vec![1, 1]);
    assert_eq!(encode(|s| s.write_int(-1)), vec![2, 0xff, 0xff, 0xff, 0xff]);
    assert_eq!(
        encode(|s| s.write_string("hi").unwrap()),
        vec![4, 2, 0, 0, 0, b'h', b'i']
    );

    let double = encode(|s| s.write_double(1.0));
    assert_eq!(double[0], WireTag::Double.as_byte());
    assert_eq!(&double[1..], &1.0f64.to_le_bytes());
}

#[test]
fn test_sequence_of_values() {
    let bytes = encode(|s| {
        s.write_boolean(false);
        s.write_string("quickjs").unwrap();
        s.write_double(2.5);
        s.write_null();
    });

    let mut source = BitSource::new(&bytes);
    assert!(!source.next_boolean().unwrap());
    assert_eq!(source.next_string().unwrap(), "quickjs");
    assert_eq!(source.next_number().unwrap(), Number::Double(2.5));
    source.next_null().unwrap();
    assert!(source.is_exhausted());
}

#[test]
fn test_tag_mismatch_names_expected_and_actual() {
    let bytes = encode(|s| s.write_int(1));
    let err = BitSource::new(&bytes).next_boolean().unwrap_err();
    assert_eq!(
        err.message(),
        "Invalid pickle tag for boolean: expected BOOLEAN, got INT (2)"
    );

    let bytes = encode(|s| s.write_boolean(true));
    let err = BitSource::new(&bytes).next_string().unwrap_err();
    assert_eq!(
        err.message(),
        "Invalid pickle tag for string: expected STRING, got BOOLEAN (1)"
    );
}

#[test]
fn test_integral_double_narrows() {
    let bytes = encode(|s| s.write_double(120.0));
    assert_eq!(BitSource::new(&bytes).next_byte().unwrap(), 120);
    assert_eq!(BitSource::new(&bytes).next_int().unwrap(), 120);
    assert_eq!(BitSource::new(&bytes).next_long().unwrap(), 120);
}

#[test]
fn test_out_of_range_narrowing_fails() {
    let bytes = encode(|s| s.write_int(300));
    let err = BitSource::new(&bytes).next_byte().unwrap_err();
    assert_eq!(err.message(), "Number out of range for byte: 300");

    let bytes = encode(|s| s.write_double(123.1));
    let err = BitSource::new(&bytes).next_int().unwrap_err();
    assert_eq!(err.message(), "Number out of range for int: 123.1");

    let bytes = encode(|s| s.write_double(f64::NAN));
    assert!(BitSource::new(&bytes).next_long().is_err());
}

#[test]
fn test_float_accepts_int() {
    let bytes = encode(|s| s.write_int(3));
    assert_eq!(BitSource::new(&bytes).next_float().unwrap(), 3.0);
    assert_eq!(BitSource::new(&bytes).next_double().unwrap(), 3.0);
}

#[test]
fn test_float_rejects_numbers_beyond_f32() {
    let bytes = encode(|s| s.write_double(1e300));
    let mut source = BitSource::new(&bytes);
    let err = source.next_float().unwrap_err();
    assert_eq!(err.message(), format!("Number out of range for float: {}", 1e300));
    assert_eq!(source.position(), 0);
    assert_eq!(source.next_double().unwrap(), 1e300);

    let bytes = encode(|s| s.write_double(f64::INFINITY));
    assert_eq!(BitSource::new(&bytes).next_float().unwrap(), f32::INFINITY);
}

#[test]
fn test_char_requires_single_character() {
    let bytes = encode(|s| s.write_string("ab").unwrap());
    let err = BitSource::new(&bytes).next_char().unwrap_err();
    assert_eq!(err.message(), "Expected a single character, got 2 characters");

    let bytes = encode(|s| s.write_string("é").unwrap());
    assert_eq!(BitSource::new(&bytes).next_char().unwrap(), 'é');
}

#[test]
fn test_invalid_utf8() {
    let bytes = [4, 1, 0, 0, 0, 0xff];
    let err = BitSource::new(&bytes).next_string().unwrap_err();
    assert!(err.message().starts_with("Invalid UTF-8 in pickled string"));
}

#[test]
fn test_invalid_boolean_payload() {
    let err = BitSource::new(&[1, 2]).next_boolean().unwrap_err();
    assert_eq!(err.message(), "Invalid boolean payload: 2");
}

#[test]
fn test_empty_stream() {
    let err = BitSource::new(&[]).next_int().unwrap_err();
    assert_eq!(err.message(), "Unexpected end of pickle stream");
}
