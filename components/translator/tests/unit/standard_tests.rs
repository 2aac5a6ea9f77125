//! Tests for the built-in translators served by a depot

use std::sync::Arc;
use translator::{BitSink, BitSource, Depot, PickleFlag, Translator};

fn assert_idempotent<T: 'static>(depot: &Depot) {
    let first = depot.resolve::<T>().unwrap();
    let second = depot.resolve::<T>().unwrap();
    assert!(
        Arc::ptr_eq(&first, &second),
        "{} resolved to two translators",
        first.type_name()
    );
}

#[test]
fn test_resolution_is_idempotent_for_every_standard_type() {
    let depot = Depot::new();

    assert_idempotent::<()>(&depot);
    assert_idempotent::<bool>(&depot);
    assert_idempotent::<i8>(&depot);
    assert_idempotent::<char>(&depot);
    assert_idempotent::<i16>(&depot);
    assert_idempotent::<i32>(&depot);
    assert_idempotent::<i64>(&depot);
    assert_idempotent::<f32>(&depot);
    assert_idempotent::<f64>(&depot);
    assert_idempotent::<String>(&depot);

    assert_idempotent::<Option<()>>(&depot);
    assert_idempotent::<Option<bool>>(&depot);
    assert_idempotent::<Option<i8>>(&depot);
    assert_idempotent::<Option<char>>(&depot);
    assert_idempotent::<Option<i16>>(&depot);
    assert_idempotent::<Option<i32>>(&depot);
    assert_idempotent::<Option<i64>>(&depot);
    assert_idempotent::<Option<f32>>(&depot);
    assert_idempotent::<Option<f64>>(&depot);
    assert_idempotent::<Option<String>>(&depot);

    assert_eq!(depot.cached_len(), 20);
}

#[test]
fn test_primitive_translators_are_process_wide() {
    let a = Depot::new().resolve::<bool>().unwrap();
    let b = Depot::new().resolve::<bool>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_signatures() {
    let depot = Depot::new();
    let flag = |f: PickleFlag| vec![f.as_byte()];
    let nullable = |f: PickleFlag| vec![f.nullable()];

    assert_eq!(depot.resolve::<()>().unwrap().signature(), flag(PickleFlag::Null));
    assert_eq!(depot.resolve::<bool>().unwrap().signature(), flag(PickleFlag::Boolean));
    assert_eq!(depot.resolve::<i8>().unwrap().signature(), flag(PickleFlag::Number));
    assert_eq!(depot.resolve::<char>().unwrap().signature(), flag(PickleFlag::String));
    assert_eq!(depot.resolve::<i64>().unwrap().signature(), flag(PickleFlag::Number));
    assert_eq!(depot.resolve::<f32>().unwrap().signature(), flag(PickleFlag::Number));
    assert_eq!(depot.resolve::<String>().unwrap().signature(), flag(PickleFlag::String));

    assert_eq!(depot.resolve::<Option<bool>>().unwrap().signature(), nullable(PickleFlag::Boolean));
    assert_eq!(depot.resolve::<Option<f64>>().unwrap().signature(), nullable(PickleFlag::Number));
    assert_eq!(depot.resolve::<Option<String>>().unwrap().signature(), nullable(PickleFlag::String));
}

fn round_trip_bytes<T: 'static>(translator: &Translator<T>, write: impl FnOnce(&mut BitSink)) {
    let mut sink = BitSink::new();
    write(&mut sink);
    let original = sink.into_bytes();

    let value = translator.decode_bytes(&original).unwrap();
    let encoded = translator.encode_to_bytes(&value).unwrap();
    assert_eq!(encoded, original);
}

#[test]
fn test_boolean_round_trips_exactly() {
    let depot = Depot::new();
    let boolean = depot.resolve::<bool>().unwrap();
    round_trip_bytes(&boolean, |s| s.write_boolean(true));
    round_trip_bytes(&boolean, |s| s.write_boolean(false));
}

#[test]
fn test_int_round_trips_exactly() {
    let depot = Depot::new();
    let int = depot.resolve::<i32>().unwrap();
    for n in [0, 1, -1, i32::MAX, i32::MIN] {
        round_trip_bytes(&int, |s| s.write_int(n));
    }

    let long = depot.resolve::<i64>().unwrap();
    for n in [0, 1, -1, i32::MAX] {
        round_trip_bytes(&long, |s| s.write_int(n));
    }
}

#[test]
fn test_string_and_double_round_trip() {
    let depot = Depot::new();
    round_trip_bytes(&depot.resolve::<String>().unwrap(), |s| s.write_string("héllo").unwrap());
    round_trip_bytes(&depot.resolve::<f64>().unwrap(), |s| s.write_double(123.1));
    round_trip_bytes(&depot.resolve::<Option<i32>>().unwrap(), |s| s.write_null());
}

#[test]
fn test_mismatched_tag_fails_with_data_error() {
    let depot = Depot::new();
    let mut sink = BitSink::new();
    sink.write_int(0);
    let bytes = sink.into_bytes();

    let err = depot.resolve::<bool>().unwrap().decode_bytes(&bytes).unwrap_err();
    assert!(err.message().contains("boolean"));
    assert!(err.message().contains("BOOLEAN"));
    assert!(err.message().contains("INT (2)"));

    let err = depot.resolve::<String>().unwrap().decode_bytes(&bytes).unwrap_err();
    assert!(err.message().contains("expected STRING"));
}

#[test]
fn test_non_nullable_rejects_null() {
    let depot = Depot::new();
    let err = depot.resolve::<i32>().unwrap().decode_bytes(&[0]).unwrap_err();
    assert_eq!(err.message(), "Invalid pickle tag for int: expected NUMBER, got NULL (0)");
}

#[test]
fn test_nullable_forms_accept_null() {
    let depot = Depot::new();
    assert_eq!(depot.resolve::<Option<bool>>().unwrap().decode_bytes(&[0]).unwrap(), None);
    assert_eq!(depot.resolve::<Option<String>>().unwrap().decode_bytes(&[0]).unwrap(), None);
    assert_eq!(depot.resolve::<Option<char>>().unwrap().decode_bytes(&[0]).unwrap(), None);

    let mut sink = BitSink::new();
    sink.write_boolean(true);
    assert_eq!(
        depot.resolve::<Option<bool>>().unwrap().decode_bytes(sink.as_bytes()).unwrap(),
        Some(true)
    );
}

#[test]
fn test_void_reads_null() {
    let depot = Depot::new();
    let void = depot.resolve::<()>().unwrap();
    let mut source = BitSource::new(&[0]);
    void.decode(&mut source).unwrap();
    assert!(source.is_exhausted());
    assert_eq!(void.encode_to_bytes(&()).unwrap(), vec![0]);
}

#[test]
fn test_encode_narrow_types_as_int() {
    let depot = Depot::new();
    let bytes = depot.resolve::<i8>().unwrap().encode_to_bytes(&-5).unwrap();
    assert_eq!(depot.resolve::<i32>().unwrap().decode_bytes(&bytes).unwrap(), -5);

    let bytes = depot.resolve::<Option<i16>>().unwrap().encode_to_bytes(&Some(300)).unwrap();
    assert_eq!(depot.resolve::<i64>().unwrap().decode_bytes(&bytes).unwrap(), 300);
}
