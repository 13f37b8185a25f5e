#![cfg(target_arch = "wasm32")]

mod common;

use common::{get, js, js_fn, message, next_turn, Recorder};
use js_sys::Function;
use nodeify::{factory_js, nodeify_js, Factory, Overrides};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::wasm_bindgen_test;

fn with_defaults(wrap: &Function, options: &JsValue) -> Function {
    get(wrap, "withDefaults")
        .unchecked_into::<Function>()
        .call1(&JsValue::UNDEFINED, options)
        .unwrap()
        .unchecked_into()
}

#[wasm_bindgen_test]
fn js_nodeify_rejects_non_functions() {
    let error = nodeify_js(JsValue::from("nope"), JsValue::UNDEFINED).unwrap_err();
    assert_eq!(get(&error, "name").as_string().unwrap(), "UsageError");
    assert_eq!(message(&error), "an input function was expected");
}

#[wasm_bindgen_test]
async fn layered_defaults() {
    let base = factory_js(JsValue::UNDEFINED);
    let layered = with_defaults(
        &with_defaults(&base, &js("{ spread: true, sync: false }")),
        &js("{ sync: true }"),
    );
    let wrapped: Function = layered
        .call1(&JsValue::UNDEFINED, &js_fn("() => [1, 2]"))
        .unwrap()
        .unchecked_into();

    let recorder = Recorder::new();
    wrapped.call1(&JsValue::UNDEFINED, recorder.callback()).unwrap();
    let args = recorder.single();
    assert_eq!(args.length(), 3);
    assert_eq!(args.get(2).as_f64(), Some(2.0));

    // The base factory is untouched.
    let plain: Function = base
        .call1(&JsValue::UNDEFINED, &js_fn("() => [1, 2]"))
        .unwrap()
        .unchecked_into();
    let recorder = Recorder::new();
    plain.call1(&JsValue::UNDEFINED, recorder.callback()).unwrap();
    assert_eq!(recorder.count(), 0);
    next_turn().await;
    assert_eq!(recorder.single().length(), 2);
}

#[wasm_bindgen_test]
fn call_options_override_defaults() {
    let strict = factory_js(js("{ strict: true }"));
    let wrapped: Function = strict
        .call2(&JsValue::UNDEFINED, &js_fn("() => 1"), &js("{ strict: false }"))
        .unwrap()
        .unchecked_into();
    let returned = wrapped.call0(&JsValue::UNDEFINED).unwrap();
    assert_eq!(returned.as_f64(), Some(1.0));

    let wrapped: Function = strict
        .call1(&JsValue::UNDEFINED, &js_fn("() => 1"))
        .unwrap()
        .unchecked_into();
    assert!(wrapped.call0(&JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn js_wrap_rejects_non_functions() {
    let wrap = factory_js(JsValue::UNDEFINED);
    let error = wrap.call1(&JsValue::UNDEFINED, &JsValue::NULL).unwrap_err();
    assert_eq!(get(&error, "name").as_string().unwrap(), "UsageError");
}

#[wasm_bindgen_test]
fn rust_factory_wrap() {
    let factory = Factory::new().with_defaults(&Overrides::new().sync(true));
    let adapter = factory
        .wrap(&js_fn("(x) => x + 1"), &Overrides::new().spread(true))
        .unwrap();
    assert!(!adapter.options().invoke_async);
    assert!(adapter.options().spread_array_result);

    let recorder = Recorder::new();
    let args = js_sys::Array::of2(&JsValue::from(1), recorder.callback());
    adapter.call(&JsValue::UNDEFINED, &args).unwrap();
    assert_eq!(recorder.single().get(1).as_f64(), Some(2.0));
}
