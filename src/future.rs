//! This module delivers Rust futures into error-first callbacks, so that async
//! Rust code can serve callback-based JS call sites.

use crate::{
    adapter::Invocation,
    options::Options,
    settle::Settlement,
    task,
};
use futures::future::TryFuture;
use js_sys::Function;
use pin_project::pin_project;
use std::{future::Future, pin::Pin, task::Context, task::Poll};
use wasm_bindgen::JsValue;

/// A future that completes with the [`Settlement`] of an inner fallible
/// future.
#[pin_project]
#[derive(Debug)]
pub struct Settled<A> {
    #[pin]
    inner: A,
}

impl<A> Settled<A> {
    /// Wraps `inner`.
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    /// Gives back the inner future.
    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A> Future for Settled<A>
where
    A: TryFuture<Ok = JsValue, Error = JsValue>,
{
    type Output = Settlement;

    fn poll(self: Pin<&mut Self>, ctx: &mut Context<'_>) -> Poll<Settlement> {
        self.project().inner.try_poll(ctx).map(|result| match result {
            Ok(value) => Settlement::Fulfilled(value),
            Err(reason) => Settlement::Rejected(reason),
        })
    }
}

/// Drives `future` on the JS event loop and calls `callback` with its outcome,
/// following the same conventions as an adapted function: `(null, value)` on
/// success (subject to `options`), `(error)` on failure, with falsy or
/// non-`Error` reasons normalized as configured. An exception thrown by the
/// callback is thrown uncaught, as there is no caller to receive it.
///
/// # Examples
///
/// ```no_run
/// use js_sys::Function;
/// use nodeify::{settle_future, Options};
/// use wasm_bindgen::JsValue;
///
/// # fn main() {
/// let callback = Function::new_with_args("error, value", "console.log(value)");
/// settle_future(
///     async { Ok::<_, JsValue>(JsValue::from(42)) },
///     callback,
///     Options::default(),
/// );
/// # }
/// ```
pub fn settle_future<A>(future: A, callback: Function, options: Options)
where
    A: TryFuture<Ok = JsValue, Error = JsValue> + 'static,
{
    let invocation = Invocation::new(callback, options);
    task::detach(async move {
        let settlement = Settled::new(future).await;
        if let Err(thrown) = invocation.settle(settlement) {
            task::throw_uncaught(&thrown);
        }
    });
}
