//! Adapts JS functions that return promises (or any thenable) into functions
//! taking a Node-style error-first callback.
//!
//! Calling the adapted function with a trailing callback calls the original
//! without it and delivers the outcome as `callback(null, value)` or
//! `callback(error)`, whether the original returned a plain value, threw, or
//! returned a thenable. Calling it without a callback falls back to the
//! original, so promise-based call sites keep working.
//!
//! From JS:
//!
//! ```js
//! import { nodeify, factory } from "nodeify";
//!
//! const read = nodeify(async (path) => fetchText(path));
//! read("a.txt", (error, text) => { /* ... */ });
//! read("a.txt").then((text) => { /* ... */ });
//!
//! const strict = factory({ strict: true }).withDefaults({ spread: true });
//! ```

#![warn(missing_docs)]

mod macros;

pub mod adapter;
pub mod args;
pub mod error;
pub mod future;
pub mod options;
pub mod settle;
pub mod task;
pub mod thenable;

pub use adapter::{Adapter, Factory};
pub use error::UsageError;
pub use future::settle_future;
pub use options::{Options, Overrides};
pub use settle::Settlement;

use js_sys::Function;
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};

/// Adapts `target` with the built-in defaults plus `overrides`, returning the
/// JS function to hand out.
pub fn nodeify(
    target: &JsValue,
    overrides: &Overrides,
) -> Result<Function, UsageError> {
    Ok(Factory::new().wrap(target, overrides)?.into_function())
}

/// JS entry point: `nodeify(fn, options?)`. Throws a `UsageError` if `fn` is
/// not a function.
#[wasm_bindgen(js_name = "nodeify")]
pub fn nodeify_js(target: JsValue, options: JsValue) -> Result<Function, JsValue> {
    Ok(nodeify(&target, &Overrides::from_js(&options))?)
}

/// JS entry point: `factory(options?)`, a `wrap(fn, options?)` function with
/// the built-in defaults layered with `options`. The result has a
/// `withDefaults(options)` property for further layering.
#[wasm_bindgen(js_name = "factory")]
pub fn factory_js(options: JsValue) -> Function {
    Factory::new().with_defaults(&Overrides::from_js(&options)).into_function()
}
