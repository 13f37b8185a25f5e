//! This module implements the adapter itself: calling the wrapped function,
//! resolving whatever it produced and delivering the outcome to an error-first
//! callback.

use crate::{
    args::extract,
    error::UsageError,
    macros::console_warn,
    options::{Options, Overrides},
    settle::{SettleOnce, Settlement},
    task::Schedule,
    thenable,
};
use js_sys::{Array, Function, Object, Reflect};
use std::{cell::Cell, rc::Rc};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};

#[wasm_bindgen(inline_js = "
export function bindDispatcher(dispatch) {
    return function nodeified() {
        return dispatch(this, Array.prototype.slice.call(arguments));
    };
}
")]
extern "C" {
    #[wasm_bindgen(js_name = "bindDispatcher")]
    fn bind_dispatcher(dispatch: &JsValue) -> Function;
}

/// A function adapted to take an error-first callback.
///
/// # Examples
///
/// ```no_run
/// use js_sys::{Array, Function};
/// use nodeify::{Adapter, Options};
/// use wasm_bindgen::JsValue;
///
/// # fn main() -> Result<(), JsValue> {
/// let double = Function::new_with_args("x", "return x * 2");
/// let callback = Function::new_with_args("error, value", "console.log(value)");
/// let adapter = Adapter::new(&double, Options::default())?;
///
/// let args = Array::of2(&JsValue::from(5), &callback);
/// adapter.call(&JsValue::UNDEFINED, &args)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Adapter {
    target: Function,
    options: Options,
}

impl Adapter {
    /// Adapts `target` with the given options. Fails if `target` is not a
    /// function.
    pub fn new(target: &JsValue, options: Options) -> Result<Self, UsageError> {
        let target = target
            .dyn_ref::<Function>()
            .cloned()
            .ok_or(UsageError::NotCallable)?;
        Ok(Self { target, options })
    }

    /// The original function.
    pub fn target(&self) -> &Function {
        &self.target
    }

    /// The options this adapter was resolved with.
    pub fn options(&self) -> Options {
        self.options
    }

    /// Calls the adapted function with receiver `this` and arguments `args`.
    ///
    /// If `args` holds a callback at the configured position, the original
    /// function is called without it, `undefined` is returned and the outcome
    /// goes to the callback. Otherwise the call either falls back to the
    /// original function, returning (or throwing) whatever it does, or fails
    /// with a [`UsageError`] if fallback is disabled.
    pub fn call(&self, this: &JsValue, args: &Array) -> Result<JsValue, JsValue> {
        let extracted = extract(args, self.target.length(), &self.options);

        let callback = match extracted.callback {
            Some(callback) => callback,
            None if self.options.fallback_on_missing_callback => {
                return self.target.apply(this, args);
            },
            None => {
                let error = match extracted.slot.index() {
                    Some(position) => UsageError::MissingCallback { position },
                    None => {
                        UsageError::NoCallbackSlot { supplied: args.length() }
                    },
                };
                return Err(error.into());
            },
        };

        let invocation = Rc::new(Invocation::new(callback, self.options));
        match self.target.apply(this, &extracted.rest) {
            Ok(result) => invocation.resolve(result)?,
            Err(thrown) => invocation.settle(Settlement::Rejected(thrown))?,
        }
        Ok(JsValue::UNDEFINED)
    }

    /// Turns this adapter into a JS function. The function carries the name
    /// and declared parameter count of the original.
    pub fn into_function(self) -> Function {
        let name = JsValue::from(self.target.name());
        let length = JsValue::from(self.target.length());

        let adapter = self;
        let dispatch =
            Closure::<dyn Fn(JsValue, Array) -> Result<JsValue, JsValue>>::new(
                move |this: JsValue, args: Array| adapter.call(&this, &args),
            );
        let wrapper = bind_dispatcher(&dispatch.into_js_value());

        // Cosmetic only; engines that refuse the redefinition keep the
        // wrapper's own values.
        let _ = define_value(&wrapper, "name", &name);
        let _ = define_value(&wrapper, "length", &length);

        wrapper
    }
}

fn define_value(
    target: &Object,
    key: &str,
    value: &JsValue,
) -> Result<bool, JsValue> {
    let descriptor = Object::new();
    Reflect::set(&descriptor, &JsValue::from_str("value"), value)?;
    Reflect::define_property(target, &JsValue::from_str(key), &descriptor)
}

/// A factory of adapters sharing a set of defaults. Factories are immutable:
/// layering further defaults produces a new factory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Factory {
    defaults: Options,
}

impl Factory {
    /// A factory with the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory with the given defaults.
    pub fn with_options(defaults: Options) -> Self {
        Self { defaults }
    }

    /// The defaults adapters of this factory start from.
    pub fn defaults(&self) -> Options {
        self.defaults
    }

    /// Returns a new factory whose defaults are this factory's defaults with
    /// `overrides` applied. This factory is left untouched.
    pub fn with_defaults(&self, overrides: &Overrides) -> Self {
        Self { defaults: self.defaults.with(overrides) }
    }

    /// Adapts `target` with this factory's defaults plus `overrides`.
    pub fn wrap(
        &self,
        target: &JsValue,
        overrides: &Overrides,
    ) -> Result<Adapter, UsageError> {
        Adapter::new(target, self.defaults.with(overrides))
    }

    /// Turns this factory into a JS `wrap(fn, options?)` function. The
    /// function also has a `withDefaults(options)` property returning the
    /// function of a further-layered factory.
    pub fn into_function(self) -> Function {
        let factory = self;
        let wrap = Closure::<
            dyn Fn(JsValue, JsValue) -> Result<Function, JsValue>,
        >::new(move |target: JsValue, options: JsValue| {
            let overrides = Overrides::from_js(&options);
            Ok(factory.wrap(&target, &overrides)?.into_function())
        });
        let with_defaults = Closure::<dyn Fn(JsValue) -> Function>::new(
            move |options: JsValue| {
                let overrides = Overrides::from_js(&options);
                factory.with_defaults(&overrides).into_function()
            },
        );

        let wrap: Function = wrap.into_js_value().unchecked_into();
        // A fresh function object is extensible, so this cannot fail.
        let _ = Reflect::set(
            &wrap,
            &JsValue::from_str("withDefaults"),
            &with_defaults.into_js_value(),
        );
        wrap
    }
}

/// One call of an adapted function with a callback.
#[derive(Debug)]
pub(crate) struct Invocation {
    callback: SettleOnce<Function>,
    callback_threw: Cell<bool>,
    options: Options,
}

impl Invocation {
    pub(crate) fn new(callback: Function, options: Options) -> Self {
        Self {
            callback: SettleOnce::new(callback),
            callback_threw: Cell::new(false),
            options,
        }
    }

    /// Settles with `result`, or with the outcome of `result` if it is a
    /// thenable.
    fn resolve(self: &Rc<Self>, result: JsValue) -> Result<(), JsValue> {
        match thenable::then_of(&result) {
            Ok(None) => self.settle(Settlement::Fulfilled(result)),
            Ok(Some(then)) => {
                let on_fulfilled = self.continuation(Settlement::Fulfilled);
                let on_rejected = self.continuation(Settlement::Rejected);
                match then.call2(&result, &on_fulfilled, &on_rejected) {
                    Ok(_) => Ok(()),
                    // The callback ran synchronously inside `then` and its
                    // exception escaped.
                    Err(thrown) if self.callback_threw.get() => Err(thrown),
                    // Any other throw after settling is ignored, as with
                    // promises.
                    Err(_) if self.callback.is_settled() => Ok(()),
                    Err(thrown) => self.settle(Settlement::Rejected(thrown)),
                }
            },
            Err(thrown) => self.settle(Settlement::Rejected(thrown)),
        }
    }

    fn continuation(
        self: &Rc<Self>,
        settlement: fn(JsValue) -> Settlement,
    ) -> JsValue {
        let invocation = Rc::clone(self);
        Closure::<dyn FnMut(JsValue) -> Result<(), JsValue>>::new(
            move |value: JsValue| invocation.settle(settlement(value)),
        )
        .into_js_value()
    }

    /// Delivers `settlement` to the callback according to the schedule. Only
    /// the first settlement is delivered; later ones are reported and
    /// dropped.
    pub(crate) fn settle(&self, settlement: Settlement) -> Result<(), JsValue> {
        let callback = match self.callback.take() {
            Some(callback) => callback,
            None => {
                console_warn!(
                    "nodeify: ignoring a second settlement of the same call"
                );
                return Ok(());
            },
        };

        let args = settlement.into_callback_args(&self.options);
        let outcome = Schedule::new(self.options.invoke_async).run(move || {
            callback.apply(&JsValue::UNDEFINED, &args).map(drop)
        });
        self.callback_threw.set(outcome.is_err());
        outcome
    }
}
