//! Evaluate -> pickle -> translate round trips across the three crates

use core_types::{BindingError, Tag};
use integration_tests::with_context;
use translator::Depot;

#[test]
fn test_numbers_translate_to_each_width() {
    let depot = Depot::new();
    with_context(|context| {
        assert_eq!(context.evaluate_as::<i32>(&depot, "6 * 7", "n.js").unwrap(), 42);
        assert_eq!(context.evaluate_as::<i8>(&depot, "-128", "n.js").unwrap(), -128);
        assert_eq!(context.evaluate_as::<i16>(&depot, "1 << 14", "n.js").unwrap(), 16384);
        assert_eq!(context.evaluate_as::<f64>(&depot, "0.5 + 0.25", "n.js").unwrap(), 0.75);
        assert_eq!(context.evaluate_as::<f32>(&depot, "1.5", "n.js").unwrap(), 1.5);
    });
}

#[test]
fn test_large_integers_arrive_as_doubles_and_read_as_long() {
    let depot = Depot::new();
    with_context(|context| {
        let value = context.evaluate("Math.pow(2, 40)", "big.js").unwrap();
        assert_eq!(value.tag().unwrap(), Tag::Float64);
        assert_eq!(value.get::<i64>(&depot).unwrap(), 1i64 << 40);
    });
}

#[test]
fn test_int_reads_double_only_when_integral() {
    let depot = Depot::new();
    with_context(|context| {
        let err = context.evaluate_as::<i32>(&depot, "2.5", "f.js").unwrap_err();
        assert!(matches!(err, BindingError::Data(_)), "unexpected error: {:?}", err);
    });
}

#[test]
fn test_strings_and_chars() {
    let depot = Depot::new();
    with_context(|context| {
        let text: String = context
            .evaluate_as(&depot, "['héllo', 'wörld'].join(' ')", "s.js")
            .unwrap();
        assert_eq!(text, "héllo wörld");
        assert_eq!(context.evaluate_as::<char>(&depot, "'x'", "c.js").unwrap(), 'x');
    });
}

#[test]
fn test_nullable_forms_accept_null_and_undefined() {
    let depot = Depot::new();
    with_context(|context| {
        assert_eq!(context.evaluate_as::<Option<i32>>(&depot, "null", "n.js").unwrap(), None);
        assert_eq!(
            context.evaluate_as::<Option<String>>(&depot, "undefined", "n.js").unwrap(),
            None
        );
        assert_eq!(context.evaluate_as::<Option<bool>>(&depot, "!0", "n.js").unwrap(), Some(true));
        context.evaluate_as::<()>(&depot, "null", "n.js").unwrap();
    });
}

#[test]
fn test_non_nullable_rejects_null() {
    let depot = Depot::new();
    with_context(|context| {
        let err = context.evaluate_as::<bool>(&depot, "null", "n.js").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSValue tag for boolean: 2");
    });
}

#[test]
fn test_objects_have_no_wire_encoding() {
    let depot = Depot::new();
    with_context(|context| {
        let err = context.evaluate_as::<String>(&depot, "({})", "o.js").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSValue tag for string: -1");
    });
}

#[test]
fn test_to_js_values_are_usable_from_accessors() {
    let depot = Depot::new();
    with_context(|context| {
        let number = context.to_js(&depot, &12i64).unwrap();
        assert_eq!(number.tag().unwrap(), Tag::Int);
        assert_eq!(number.as_int().unwrap(), 12);

        let wide = context.to_js(&depot, &(1i64 << 33)).unwrap();
        assert_eq!(wide.tag().unwrap(), Tag::Float64);
        assert_eq!(wide.as_double().unwrap(), 8589934592.0);

        let text = context.to_js(&depot, &String::from("round trip")).unwrap();
        assert_eq!(text.as_string().unwrap(), "round trip");
        assert_eq!(text.get::<String>(&depot).unwrap(), "round trip");

        let missing = context.to_js(&depot, &None::<f64>).unwrap();
        assert_eq!(missing.tag().unwrap(), Tag::Null);
    });
}

#[test]
fn test_inexact_long_never_reaches_the_engine() {
    let depot = Depot::new();
    with_context(|context| {
        let err = context.to_js(&depot, &i64::MAX).unwrap_err();
        assert!(matches!(err, BindingError::Data(_)), "unexpected error: {:?}", err);

        let exact = context.to_js(&depot, &(1i64 << 53)).unwrap();
        assert_eq!(exact.get::<i64>(&depot).unwrap(), 1i64 << 53);
    });
}

#[test]
fn test_depot_is_shared_across_contexts() {
    let depot = Depot::new();
    with_context(|context| {
        context.evaluate_as::<i32>(&depot, "1", "a.js").unwrap();
    });
    with_context(|context| {
        context.evaluate_as::<i32>(&depot, "2", "b.js").unwrap();
    });
    assert!(depot.is_cached::<i32>());
    assert_eq!(depot.cached_len(), 1);
}
