//! Duck-typed detection of deferred values.

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

/// Returns the `then` method of `value` if `value` is a thenable: an object or
/// function whose `then` property is callable. The method must be called with
/// `value` as its receiver.
///
/// Reading `then` may run a getter; if that throws, the exception is returned
/// as `Err` so that it can reject the surrounding call.
pub fn then_of(value: &JsValue) -> Result<Option<Function>, JsValue> {
    if !value.is_object() && !value.is_function() {
        return Ok(None);
    }
    let then = Reflect::get(value, &JsValue::from_str("then"))?;
    Ok(then.dyn_into::<Function>().ok())
}

/// Tests whether `value` should be treated as a deferred computation. A
/// throwing `then` getter counts as a thenable here, since reading it is
/// already a rejection.
pub fn is_thenable(value: &JsValue) -> bool {
    !matches!(then_of(value), Ok(None))
}
