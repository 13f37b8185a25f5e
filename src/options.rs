//! This module defines the adapter configuration and how partial overrides are
//! layered on top of defaults.

use js_sys::Reflect;
use serde::{
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
    Deserialize,
    Deserializer,
};
use std::fmt;
use wasm_bindgen::JsValue;

/// Fully resolved configuration of an adapter. Resolved once when a function is
/// wrapped and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Number of positional arguments the wrapped function expects, callback
    /// included. `0` means "infer".
    pub arity: u32,
    /// Position of the callback. Negative values count from the end of the
    /// effective argument list.
    pub callback_index: i32,
    /// Whether a call without a callback falls back to returning whatever the
    /// original function returns, instead of failing.
    pub fallback_on_missing_callback: bool,
    /// Whether the callback is called on a later turn of the task queue.
    pub invoke_async: bool,
    /// Whether rejection reasons that are not `Error` instances get wrapped
    /// into one.
    pub wrap_non_error_rejections: bool,
    /// Whether success calls the callback without any arguments.
    pub callback_on_success_takes_no_args: bool,
    /// Whether an array success value is spread over the callback arguments.
    pub spread_array_result: bool,
    /// Whether an unset arity is inferred from the declared parameter count
    /// of the original function (plus one for the callback) instead of from
    /// the number of arguments supplied at call time.
    pub infer_arity_from_declaration: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            arity: 0,
            callback_index: -1,
            fallback_on_missing_callback: true,
            invoke_async: true,
            wrap_non_error_rejections: false,
            callback_on_success_takes_no_args: false,
            spread_array_result: false,
            infer_arity_from_declaration: false,
        }
    }
}

impl Options {
    /// Returns these options with `overrides` applied on top.
    pub fn with(self, overrides: &Overrides) -> Self {
        overrides.apply(self)
    }
}

/// A partial configuration. Every field that is set replaces the corresponding
/// field of the options it is applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    /// See [`Options::arity`].
    pub arity: Option<u32>,
    /// See [`Options::callback_index`].
    pub callback_index: Option<i32>,
    /// See [`Options::fallback_on_missing_callback`].
    pub fallback_on_missing_callback: Option<bool>,
    /// See [`Options::invoke_async`].
    pub invoke_async: Option<bool>,
    /// See [`Options::wrap_non_error_rejections`].
    pub wrap_non_error_rejections: Option<bool>,
    /// See [`Options::callback_on_success_takes_no_args`].
    pub callback_on_success_takes_no_args: Option<bool>,
    /// See [`Options::spread_array_result`].
    pub spread_array_result: Option<bool>,
    /// See [`Options::infer_arity_from_declaration`].
    pub infer_arity_from_declaration: Option<bool>,
}

macro_rules! setter {
    ($(#[$attr:meta])* $name:ident: $ty:ty) => {
        $(#[$attr])*
        pub fn $name(mut self, value: $ty) -> Self {
            self.$name = Some(value);
            self
        }
    };
}

impl Overrides {
    /// Overrides that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    setter!(
        /// Sets the expected arity.
        arity: u32
    );
    setter!(
        /// Sets the callback position.
        callback_index: i32
    );
    setter!(
        /// Sets whether a missing callback falls back to promise mode.
        fallback_on_missing_callback: bool
    );
    setter!(
        /// Sets whether the callback is deferred to a later turn.
        invoke_async: bool
    );
    setter!(
        /// Sets whether non-error rejection reasons are wrapped.
        wrap_non_error_rejections: bool
    );
    setter!(
        /// Sets whether success calls the callback without arguments.
        callback_on_success_takes_no_args: bool
    );
    setter!(
        /// Sets whether array results are spread.
        spread_array_result: bool
    );
    setter!(
        /// Sets how an unset arity is inferred.
        infer_arity_from_declaration: bool
    );

    /// Legacy `spread` option.
    pub fn spread(self, spread: bool) -> Self {
        self.spread_array_result(spread)
    }

    /// Legacy `strict` option: a strict adapter requires a callback.
    pub fn strict(self, strict: bool) -> Self {
        self.fallback_on_missing_callback(!strict)
    }

    /// Legacy `sync` option: a sync adapter calls the callback before
    /// returning.
    pub fn sync(self, sync: bool) -> Self {
        self.invoke_async(!sync)
    }

    /// Applies these overrides on top of `base`.
    pub fn apply(&self, base: Options) -> Options {
        Options {
            arity: self.arity.unwrap_or(base.arity),
            callback_index: self.callback_index.unwrap_or(base.callback_index),
            fallback_on_missing_callback: self
                .fallback_on_missing_callback
                .unwrap_or(base.fallback_on_missing_callback),
            invoke_async: self.invoke_async.unwrap_or(base.invoke_async),
            wrap_non_error_rejections: self
                .wrap_non_error_rejections
                .unwrap_or(base.wrap_non_error_rejections),
            callback_on_success_takes_no_args: self
                .callback_on_success_takes_no_args
                .unwrap_or(base.callback_on_success_takes_no_args),
            spread_array_result: self
                .spread_array_result
                .unwrap_or(base.spread_array_result),
            infer_arity_from_declaration: self
                .infer_arity_from_declaration
                .unwrap_or(base.infer_arity_from_declaration),
        }
    }

    /// Combines two layers of overrides. Fields set in `later` win.
    pub fn merge(self, later: Overrides) -> Overrides {
        Overrides {
            arity: later.arity.or(self.arity),
            callback_index: later.callback_index.or(self.callback_index),
            fallback_on_missing_callback: later
                .fallback_on_missing_callback
                .or(self.fallback_on_missing_callback),
            invoke_async: later.invoke_async.or(self.invoke_async),
            wrap_non_error_rejections: later
                .wrap_non_error_rejections
                .or(self.wrap_non_error_rejections),
            callback_on_success_takes_no_args: later
                .callback_on_success_takes_no_args
                .or(self.callback_on_success_takes_no_args),
            spread_array_result: later
                .spread_array_result
                .or(self.spread_array_result),
            infer_arity_from_declaration: later
                .infer_arity_from_declaration
                .or(self.infer_arity_from_declaration),
        }
    }

    /// Reads overrides from a JS options object. Never fails: values that are
    /// not objects yield no overrides, unknown keys are ignored, flags follow
    /// JS truthiness and integer keys holding something other than a number
    /// are skipped.
    ///
    /// Each key is read on its own, so a key holding an unexpected value never
    /// affects the others.
    pub fn from_js(options: &JsValue) -> Self {
        if !options.is_object() {
            return Self::default();
        }
        Self::from(RawOverrides::read(options))
    }
}

/// The shape of a JS options object, legacy keys included.
#[derive(Debug, Default)]
struct RawOverrides {
    arity: Option<Integer>,
    callback_index: Option<Integer>,
    fallback_on_missing_callback: Option<Flag>,
    invoke_async: Option<Flag>,
    wrap_non_error_rejections: Option<Flag>,
    callback_on_success_takes_no_args: Option<Flag>,
    spread_array_result: Option<Flag>,
    infer_arity_from_declaration: Option<Flag>,
    spread: Option<Flag>,
    strict: Option<Flag>,
    sync: Option<Flag>,
}

impl RawOverrides {
    fn read(options: &JsValue) -> Self {
        Self {
            arity: read_integer(options, "arity"),
            callback_index: read_integer(options, "callbackIndex"),
            fallback_on_missing_callback: read_flag(
                options,
                "fallbackOnMissingCallback",
            ),
            invoke_async: read_flag(options, "invokeAsync"),
            wrap_non_error_rejections: read_flag(
                options,
                "wrapNonErrorRejections",
            ),
            callback_on_success_takes_no_args: read_flag(
                options,
                "callbackOnSuccessTakesNoArgs",
            ),
            spread_array_result: read_flag(options, "spreadArrayResult"),
            infer_arity_from_declaration: read_flag(
                options,
                "inferArityFromDeclaration",
            ),
            spread: read_flag(options, "spread"),
            strict: read_flag(options, "strict"),
            sync: read_flag(options, "sync"),
        }
    }
}

/// Reads `key` of `options`. Missing keys, `undefined`, `null` and throwing
/// getters all count as absent.
fn read_key(options: &JsValue, key: &str) -> Option<JsValue> {
    let value = Reflect::get(options, &JsValue::from_str(key)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn read_flag(options: &JsValue, key: &str) -> Option<Flag> {
    let value = read_key(options, key)?;
    // Functions, symbols and bigints have no serde form.
    let flag = serde_wasm_bindgen::from_value::<Flag>(value.clone())
        .unwrap_or_else(|_| Flag(value.is_truthy()));
    Some(flag)
}

fn read_integer(options: &JsValue, key: &str) -> Option<Integer> {
    serde_wasm_bindgen::from_value::<Integer>(read_key(options, key)?).ok()
}

impl From<RawOverrides> for Overrides {
    fn from(raw: RawOverrides) -> Self {
        let flag = |value: Option<Flag>| value.map(|Flag(flag)| flag);
        let integer = |value: Option<Integer>| value.and_then(|Integer(n)| n);

        let legacy = Overrides {
            spread_array_result: flag(raw.spread),
            fallback_on_missing_callback: flag(raw.strict).map(|strict| !strict),
            invoke_async: flag(raw.sync).map(|sync| !sync),
            ..Overrides::default()
        };

        let full = Overrides {
            arity: integer(raw.arity).map(|arity| {
                u32::try_from(arity.max(0)).unwrap_or(u32::MAX)
            }),
            callback_index: integer(raw.callback_index).map(|index| {
                index.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
            }),
            fallback_on_missing_callback: flag(
                raw.fallback_on_missing_callback,
            ),
            invoke_async: flag(raw.invoke_async),
            wrap_non_error_rejections: flag(raw.wrap_non_error_rejections),
            callback_on_success_takes_no_args: flag(
                raw.callback_on_success_takes_no_args,
            ),
            spread_array_result: flag(raw.spread_array_result),
            infer_arity_from_declaration: flag(
                raw.infer_arity_from_declaration,
            ),
        };

        legacy.merge(full)
    }
}

/// A JS value read with JS truthiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flag(bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FlagVisitor)
    }
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = Flag;

    fn expecting(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        write!(fmtr, "any value")
    }

    fn visit_bool<E>(self, value: bool) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(value != 0))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(value != 0))
    }

    fn visit_i128<E>(self, value: i128) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(value != 0))
    }

    fn visit_u128<E>(self, value: u128) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(value != 0))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(value != 0.0 && !value.is_nan()))
    }

    fn visit_str<E>(self, value: &str) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(!value.is_empty()))
    }

    fn visit_bytes<E>(self, _value: &[u8]) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(true))
    }

    fn visit_unit<E>(self) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(false))
    }

    fn visit_none<E>(self) -> Result<Flag, E>
    where
        E: de::Error,
    {
        Ok(Flag(false))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Flag, D::Error>
    where
        D: Deserializer<'de>,
    {
        Flag::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Flag, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Flag(true))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Flag, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Flag(true))
    }
}

/// A JS value read as an integer, if it is a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Integer(Option<i64>);

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IntegerVisitor)
    }
}

struct IntegerVisitor;

impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = Integer;

    fn expecting(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        write!(fmtr, "any value")
    }

    fn visit_bool<E>(self, _value: bool) -> Result<Integer, E>
    where
        E: de::Error,
    {
        Ok(Integer(None))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Integer, E>
    where
        E: de::Error,
    {
        Ok(Integer(Some(value)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Integer, E>
    where
        E: de::Error,
    {
        Ok(Integer(Some(i64::try_from(value).unwrap_or(i64::MAX))))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Integer, E>
    where
        E: de::Error,
    {
        if value.is_finite() {
            Ok(Integer(Some(value.trunc() as i64)))
        } else {
            Ok(Integer(None))
        }
    }

    fn visit_str<E>(self, _value: &str) -> Result<Integer, E>
    where
        E: de::Error,
    {
        Ok(Integer(None))
    }

    fn visit_bytes<E>(self, _value: &[u8]) -> Result<Integer, E>
    where
        E: de::Error,
    {
        Ok(Integer(None))
    }

    fn visit_unit<E>(self) -> Result<Integer, E>
    where
        E: de::Error,
    {
        Ok(Integer(None))
    }

    fn visit_none<E>(self) -> Result<Integer, E>
    where
        E: de::Error,
    {
        Ok(Integer(None))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Integer, D::Error>
    where
        D: Deserializer<'de>,
    {
        Integer::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Integer, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Integer(None))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Integer, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Integer(None))
    }
}
