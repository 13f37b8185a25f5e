#![allow(dead_code)]

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(function: &Function, milliseconds: i32) -> JsValue;
}

/// Evaluates a JS expression.
pub fn js(expression: &str) -> JsValue {
    Function::new_no_args(&format!("return ({});", expression))
        .call0(&JsValue::UNDEFINED)
        .unwrap()
}

/// Evaluates a JS function expression.
pub fn js_fn(expression: &str) -> Function {
    js(expression).unchecked_into()
}

/// Waits until every pending microtask has run.
pub async fn next_turn() {
    let promise = Promise::new(&mut |resolve, _reject| {
        set_timeout(&resolve, 0);
    });
    JsFuture::from(promise).await.unwrap();
}

/// An error-first callback that records the arguments of every call.
pub struct Recorder {
    calls: Array,
    callback: Function,
}

impl Recorder {
    pub fn new() -> Self {
        let calls = Array::new();
        let callback = js_fn(
            "(calls) => function recorded() { \
                calls.push(Array.prototype.slice.call(arguments)); \
            }",
        )
        .call1(&JsValue::UNDEFINED, &calls)
        .unwrap()
        .unchecked_into();
        Self { calls, callback }
    }

    /// A callback that records its calls and then throws.
    pub fn throwing() -> Self {
        let calls = Array::new();
        let callback = js_fn(
            "(calls) => function recorded() { \
                calls.push(Array.prototype.slice.call(arguments)); \
                throw new Error('callback failure'); \
            }",
        )
        .call1(&JsValue::UNDEFINED, &calls)
        .unwrap()
        .unchecked_into();
        Self { calls, callback }
    }

    pub fn callback(&self) -> &Function {
        &self.callback
    }

    pub fn count(&self) -> u32 {
        self.calls.length()
    }

    pub fn args(&self, call: u32) -> Array {
        self.calls.get(call).unchecked_into()
    }

    /// Arguments of the one and only call.
    pub fn single(&self) -> Array {
        assert_eq!(self.count(), 1, "expected exactly one callback call");
        self.args(0)
    }
}

/// A function running `body` that counts its calls in the returned state
/// object.
pub fn spy(params: &str, body: &str) -> (Function, Object) {
    let state = Object::new();
    let function = js_fn(&format!(
        "(state) => function spied({}) {{ \
            state.count = (state.count || 0) + 1; \
            {} \
        }}",
        params, body
    ))
    .call1(&JsValue::UNDEFINED, &state)
    .unwrap()
    .unchecked_into();
    (function, state)
}

pub fn call_count(state: &Object) -> u32 {
    Reflect::get(state, &JsValue::from_str("count"))
        .unwrap()
        .as_f64()
        .unwrap_or(0.0) as u32
}

pub fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap()
}

pub fn message(error: &JsValue) -> String {
    get(error, "message").as_string().unwrap()
}

/// Collects exceptions thrown uncaught while it is alive, under Node or in a
/// browser.
pub struct Uncaught {
    errors: Array,
    release: Function,
}

impl Uncaught {
    pub fn catch() -> Self {
        let errors = Array::new();
        let release = js_fn(
            "(errors) => { \
                if (typeof process !== 'undefined' && process.on) { \
                    const handler = (error) => errors.push(error); \
                    process.on('uncaughtException', handler); \
                    return () => process.removeListener('uncaughtException', handler); \
                } \
                const handler = (event) => { \
                    event.preventDefault(); \
                    errors.push(event.error); \
                }; \
                globalThis.addEventListener('error', handler); \
                return () => globalThis.removeEventListener('error', handler); \
            }",
        )
        .call1(&JsValue::UNDEFINED, &errors)
        .unwrap()
        .unchecked_into();
        Self { errors, release }
    }

    pub fn errors(&self) -> &Array {
        &self.errors
    }
}

impl Drop for Uncaught {
    fn drop(&mut self) {
        self.release.call0(&JsValue::UNDEFINED).unwrap();
    }
}
