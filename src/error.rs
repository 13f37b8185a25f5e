//! This module defines errors caused by misusing an adapter.

use js_sys::Reflect;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// A configuration fault, raised synchronously to the immediate caller. Faults
/// of the wrapped function itself never show up here: they are delivered
/// through the callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The value given to be wrapped is not a function.
    #[error("an input function was expected")]
    NotCallable,
    /// A strict adapter was called without a function at the callback
    /// position.
    #[error("callback expected at position {position}")]
    MissingCallback {
        /// Index of the callback slot in the arguments.
        position: u32,
    },
    /// A strict adapter was called with an argument list the configured
    /// callback position does not fall into, such as no arguments at all.
    #[error("callback expected as an argument, got {supplied} arguments")]
    NoCallbackSlot {
        /// Number of arguments the call supplied.
        supplied: u32,
    },
}

impl UsageError {
    /// Name given to the JS `Error` this converts into.
    pub const NAME: &'static str = "UsageError";
}

impl From<UsageError> for JsValue {
    fn from(error: UsageError) -> Self {
        let js_error = js_sys::Error::new(&error.to_string());
        js_error.set_name(UsageError::NAME);
        if let UsageError::MissingCallback { position } = error {
            // Only fails on frozen objects, which a fresh error is not.
            let _ = Reflect::set(
                &js_error,
                &JsValue::from_str("position"),
                &JsValue::from(position),
            );
        }
        js_error.into()
    }
}

#[cfg(test)]
mod test {
    use super::UsageError;

    #[test]
    fn messages() {
        assert_eq!(
            UsageError::NotCallable.to_string(),
            "an input function was expected"
        );
        assert_eq!(
            UsageError::MissingCallback { position: 0 }.to_string(),
            "callback expected at position 0"
        );
        assert_eq!(
            UsageError::NoCallbackSlot { supplied: 0 }.to_string(),
            "callback expected as an argument, got 0 arguments"
        );
    }
}
