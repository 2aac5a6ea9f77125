//! Turning a thrown engine value into a [`JsException`].

use crate::engine::engine_error;
use core_types::{parse_stack, BindingResult, JsException, StackFrame};
use rquickjs::convert::Coerced;
use rquickjs::Value;

/// Classifies a thrown value.
///
/// Error instances keep their string form (`"Error"`, `"TypeError: x is not
/// defined"`) and their parsed stack. Any other thrown value keeps only its
/// string form; no stack is synthesized for it.
pub(crate) fn materialize(thrown: Value<'_>) -> BindingResult<JsException> {
    let text = thrown
        .get::<Coerced<String>>()
        .map_err(engine_error)?
        .0;

    match thrown.as_exception() {
        Some(error) => {
            let frames = error
                .stack()
                .map(|stack| parse_stack(&stack))
                .unwrap_or_default()
                .into_iter()
                .map(drop_entry_line)
                .collect::<Vec<_>>();
            log::debug!("materialized {} with {} frame(s)", text, frames.len());
            Ok(JsException::error(text, frames))
        }
        None => Ok(JsException::value(text)),
    }
}

/// Top-level code still on the first line of the script has no line-table
/// entry of its own; the engine reports the script's entry line for it.
/// Such a frame renders without a line number.
fn drop_entry_line(frame: StackFrame) -> StackFrame {
    if frame.is_eval() && frame.line == Some(1) {
        StackFrame { line: None, ..frame }
    } else {
        frame
    }
}
