//! Unit tests for JsException, StackFrame and stack parsing

use core_types::{parse_stack, JsException, StackFrame};

#[cfg(test)]
mod stack_parse_tests {
    use super::*;

    #[test]
    fn test_parse_nested_calls() {
        let text = "    at f1 (source.js:3:15)\n\
                    \x20   at f2 (source.js:6:9)\n\
                    \x20   at f3 (source.js:9:9)\n\
                    \x20   at <anonymous> (source.js:11:5)\n\
                    \x20   at <eval> (source.js:12:3)\n";
        let frames = parse_stack(text);

        let names: Vec<&str> = frames.iter().map(|f| f.function_name.as_str()).collect();
        assert_eq!(names, vec!["f1", "f2", "f3", "<anonymous>", "<eval>"]);

        let lines: Vec<Option<u32>> = frames.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![Some(3), Some(6), Some(9), Some(11), Some(12)]);
    }

    #[test]
    fn test_parse_without_line() {
        let frames = parse_stack("    at <eval> (source.js)\n");
        assert_eq!(frames, vec![StackFrame::new("<eval>", "source.js", None)]);
    }

    #[test]
    fn test_parse_line_without_column() {
        let frames = parse_stack("    at f1 (source.js:3)");
        assert_eq!(frames[0].line, Some(3));
        assert_eq!(frames[0].file_name, "source.js");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_stack("").is_empty());
    }
}

#[cfg(test)]
mod exception_tests {
    use super::*;

    #[test]
    fn test_rendered_stack_matches_engine_layout() {
        let exception = JsException::error(
            "Error",
            vec![
                StackFrame::new("f1", "source.js", Some(3)),
                StackFrame::new("f2", "source.js", Some(6)),
                StackFrame::new("<eval>", "source.js", Some(12)),
            ],
        );

        assert_eq!(
            exception.stack_trace().unwrap(),
            "    at f1 (source.js:3)\n    at f2 (source.js:6)\n    at <eval> (source.js:12)\n"
        );
    }

    #[test]
    fn test_value_throw_has_no_stack() {
        let exception = JsException::value("1");
        assert!(!exception.is_error());
        assert_eq!(exception.exception(), "1");
        assert_eq!(exception.stack(), None);
    }

    #[test]
    fn test_none_differs_from_thrown_null() {
        let none = JsException::none();
        let thrown_null = JsException::value("null");

        assert_eq!(none.exception(), thrown_null.exception());
        assert!(!none.was_pending());
        assert!(thrown_null.was_pending());
        assert_ne!(none, thrown_null);
    }
}
