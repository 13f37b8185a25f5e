//! This module turns the outcome of a call into the arguments of an
//! error-first callback, and guards the callback against being settled twice.

use crate::options::Options;
use js_sys::{Array, JsString, Reflect};
use std::{cell::Cell, fmt};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_name = "String")]
    fn to_js_string(value: &JsValue) -> Result<JsString, JsValue>;
}

/// The outcome of one call of a wrapped function.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// The call returned a value, or its deferred value fulfilled.
    Fulfilled(JsValue),
    /// The call threw, or its deferred value rejected.
    Rejected(JsValue),
}

impl Settlement {
    /// Builds the arguments the callback receives for this outcome.
    pub fn into_callback_args(self, options: &Options) -> Array {
        match self {
            Settlement::Fulfilled(_)
                if options.callback_on_success_takes_no_args =>
            {
                Array::new()
            },
            Settlement::Fulfilled(value)
                if options.spread_array_result && Array::is_array(&value) =>
            {
                Array::of1(&JsValue::NULL).concat(value.unchecked_ref::<Array>())
            },
            Settlement::Fulfilled(value) => Array::of2(&JsValue::NULL, &value),
            Settlement::Rejected(reason) => Array::of1(&normalize_reason(
                reason,
                options.wrap_non_error_rejections,
            )),
        }
    }
}

/// Makes sure the error channel of a callback carries something truthy. Falsy
/// reasons, and any non-`Error` reason when `wrap_non_errors` is set, become
/// `new Error(String(reason))` with the reason kept as `cause`.
pub fn normalize_reason(reason: JsValue, wrap_non_errors: bool) -> JsValue {
    let already_error = reason.is_instance_of::<js_sys::Error>();
    if reason.is_truthy() && (already_error || !wrap_non_errors) {
        return reason;
    }

    let message = match to_js_string(&reason) {
        Ok(message) => String::from(message),
        Err(_) => format!("{:?}", reason),
    };
    let wrapper = js_sys::Error::new(&message);
    // Setting a property on a fresh error cannot fail.
    let _ = Reflect::set(&wrapper, &JsValue::from_str("cause"), &reason);
    wrapper.into()
}

/// A slot holding the callback of one invocation until it settles. Taking it
/// succeeds only once, so at most one settlement ever reaches the callback.
pub struct SettleOnce<C> {
    callback: Cell<Option<C>>,
}

impl<C> SettleOnce<C> {
    /// Creates a pending slot.
    pub fn new(callback: C) -> Self {
        Self { callback: Cell::new(Some(callback)) }
    }

    /// Takes the callback for settling. Returns `None` if the invocation
    /// already settled.
    pub fn take(&self) -> Option<C> {
        self.callback.take()
    }

    /// Tests whether the callback was already taken.
    pub fn is_settled(&self) -> bool {
        let callback = self.callback.take();
        let settled = callback.is_none();
        self.callback.set(callback);
        settled
    }
}

impl<C> fmt::Debug for SettleOnce<C>
where
    C: fmt::Debug,
{
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        let callback = self.callback.take();
        let result = fmtr
            .debug_struct("settle::SettleOnce")
            .field("callback", &callback)
            .finish();
        self.callback.set(callback);
        result
    }
}

#[cfg(test)]
mod test {
    use super::SettleOnce;

    #[test]
    fn settles_once() {
        let slot = SettleOnce::new(7u32);
        assert!(!slot.is_settled());
        assert_eq!(slot.take(), Some(7));
        assert!(slot.is_settled());
        assert_eq!(slot.take(), None);
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn debug_does_not_settle() {
        let slot = SettleOnce::new("callback");
        let rendered = format!("{:?}", slot);
        assert!(rendered.contains("callback"));
        assert_eq!(slot.take(), Some("callback"));
    }
}
