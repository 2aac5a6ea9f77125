//! Unit tests for engine-side marshaling

use crate::common::run_js;
use core_types::Tag;
use quickjs::{EvalFlags, QuickJs};
use translator::{BitSink, BitSource, PickleFlag, WireTag};

fn flag(f: PickleFlag) -> Vec<u8> {
    vec![f.as_byte()]
}

#[cfg(test)]
mod pickle_tests {
    use super::*;

    #[test]
    fn test_pickle_primitives() {
        run_js("true", |js, _, context, value| {
            let bytes = js.pickle_value(context, value, &flag(PickleFlag::Boolean)).unwrap();
            assert_eq!(bytes, vec![WireTag::Boolean.as_byte(), 1]);
        });
        run_js("-7", |js, _, context, value| {
            let bytes = js.pickle_value(context, value, &flag(PickleFlag::Number)).unwrap();
            assert_eq!(BitSource::new(&bytes).next_int().unwrap(), -7);
        });
        run_js("0.5", |js, _, context, value| {
            let bytes = js.pickle_value(context, value, &flag(PickleFlag::Number)).unwrap();
            assert_eq!(bytes[0], WireTag::Double.as_byte());
            assert_eq!(BitSource::new(&bytes).next_double().unwrap(), 0.5);
        });
        run_js("'h\u{e9}llo'", |js, _, context, value| {
            let bytes = js.pickle_value(context, value, &flag(PickleFlag::String)).unwrap();
            assert_eq!(BitSource::new(&bytes).next_string().unwrap(), "h\u{e9}llo");
        });
    }

    #[test]
    fn test_pickle_tag_mismatch() {
        run_js("1", |js, _, context, value| {
            let err = js
                .pickle_value(context, value, &flag(PickleFlag::Boolean))
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid JSValue tag for boolean: 0");
        });
        run_js("'1'", |js, _, context, value| {
            let err = js
                .pickle_value(context, value, &flag(PickleFlag::Number))
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid JSValue tag for number: -7");
        });
    }

    #[test]
    fn test_pickle_null_needs_nullable_flag() {
        run_js("null", |js, _, context, value| {
            let err = js
                .pickle_value(context, value, &flag(PickleFlag::String))
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid JSValue tag for string: 2");

            let bytes = js
                .pickle_value(context, value, &[PickleFlag::String.nullable()])
                .unwrap();
            assert_eq!(bytes, vec![WireTag::Null.as_byte()]);

            let bytes = js.pickle_value(context, value, &flag(PickleFlag::Null)).unwrap();
            assert_eq!(bytes, vec![WireTag::Null.as_byte()]);
        });
    }

    #[test]
    fn test_pickle_bad_signatures() {
        run_js("({})", |js, _, context, value| {
            assert_eq!(
                js.pickle_value(context, value, &[]).unwrap_err().to_string(),
                "Empty pickle signature"
            );
            assert_eq!(
                js.pickle_value(context, value, &[0x7f]).unwrap_err().to_string(),
                "Unknown pickle flag: 0x7f"
            );
            assert_eq!(
                js.pickle_value(context, value, &flag(PickleFlag::Object))
                    .unwrap_err()
                    .to_string(),
                "No wire encoding for pickle flag OBJECT"
            );
        });
    }

    #[test]
    fn test_pickle_exception_value() {
        run_js("throw 1", |js, _, context, value| {
            let err = js
                .pickle_value(context, value, &[PickleFlag::Number.nullable()])
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid JSValue tag for number: 6");
        });
    }
}

#[cfg(test)]
mod create_value_tests {
    use super::*;

    #[test]
    fn test_create_each_wire_type() {
        let js = QuickJs::new();
        let runtime = js.create_runtime().unwrap();
        let context = js.create_context(runtime).unwrap();

        let mut sink = BitSink::new();
        sink.write_null();
        let null = js.create_value(context, sink.as_bytes()).unwrap();
        assert_eq!(js.get_value_tag(null).unwrap(), Tag::Null);

        let mut sink = BitSink::new();
        sink.write_boolean(true);
        let boolean = js.create_value(context, sink.as_bytes()).unwrap();
        assert!(js.get_value_boolean(boolean).unwrap());

        let mut sink = BitSink::new();
        sink.write_int(i32::MAX);
        let int = js.create_value(context, sink.as_bytes()).unwrap();
        assert_eq!(js.get_value_int(int).unwrap(), i32::MAX);

        let mut sink = BitSink::new();
        sink.write_double(-2.25);
        let double = js.create_value(context, sink.as_bytes()).unwrap();
        assert_eq!(js.get_value_double(double).unwrap(), -2.25);

        let mut sink = BitSink::new();
        sink.write_string("from rust").unwrap();
        let string = js.create_value(context, sink.as_bytes()).unwrap();
        assert_eq!(js.get_value_tag(string).unwrap(), Tag::String);
        assert_eq!(js.get_value_string(context, string).unwrap(), "from rust");

        assert_eq!(js.live_handles().values, 5);
        js.destroy_context(context).unwrap();
        js.destroy_runtime(runtime).unwrap();
    }

    #[test]
    fn test_created_string_pickles_back() {
        let js = QuickJs::new();
        let runtime = js.create_runtime().unwrap();
        let context = js.create_context(runtime).unwrap();

        let mut sink = BitSink::new();
        sink.write_string("round").unwrap();
        let original = sink.into_bytes();
        let value = js.create_value(context, &original).unwrap();
        let pickled = js
            .pickle_value(context, value, &flag(PickleFlag::String))
            .unwrap();
        assert_eq!(pickled, original);

        js.destroy_runtime(runtime).unwrap();
    }

    #[test]
    fn test_create_value_rejects_bad_input() {
        let js = QuickJs::new();
        let runtime = js.create_runtime().unwrap();
        let context = js.create_context(runtime).unwrap();

        assert_eq!(
            js.create_value(context, &[]).unwrap_err().to_string(),
            "Unexpected end of pickle stream"
        );
        assert_eq!(
            js.create_value(context, &[0x42]).unwrap_err().to_string(),
            "Unknown pickle tag: 0x42"
        );
        assert_eq!(js.live_handles().values, 0);

        let value = js.evaluate(context, "1", "a.js", EvalFlags::empty()).unwrap();
        assert_eq!(js.get_value_int(value).unwrap(), 1);
        js.destroy_runtime(runtime).unwrap();
    }
}
