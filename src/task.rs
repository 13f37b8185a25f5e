//! This module exports items related to scheduling work on the JS event loop.

use std::future::Future;
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use wasm_bindgen_futures::spawn_local;

#[wasm_bindgen(inline_js = "
export function throwLater(error) {
    queueMicrotask(() => { throw error; });
}
")]
extern "C" {
    #[wasm_bindgen(js_name = "throwLater")]
    fn throw_later(error: &JsValue);
}

/// Runs a future to completion on the JS event loop, detached from the
/// caller. The future starts on a later turn, after the current synchronous
/// code has returned.
pub fn detach<A>(future: A)
where
    A: Future<Output = ()> + 'static,
{
    spawn_local(future);
}

/// Throws `error` on a fresh microtask, outside of any caller, so that it
/// surfaces as an uncaught exception (`uncaughtException` in Node, the `error`
/// event in browsers).
pub fn throw_uncaught(error: &JsValue) {
    throw_later(error);
}

/// When a callback runs relative to the code that settled its invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Right away, inside the settling call. Exceptions thrown by the job go
    /// back to whoever settled.
    Immediate,
    /// On a later turn of the task queue. Exceptions thrown by the job have
    /// no caller to reach and are thrown uncaught.
    NextTurn,
}

impl Schedule {
    /// Picks the schedule for the given `invoke_async` setting.
    pub fn new(invoke_async: bool) -> Self {
        if invoke_async {
            Schedule::NextTurn
        } else {
            Schedule::Immediate
        }
    }

    /// Runs `job` according to this schedule.
    pub fn run<F>(self, job: F) -> Result<(), JsValue>
    where
        F: FnOnce() -> Result<(), JsValue> + 'static,
    {
        match self {
            Schedule::Immediate => job(),
            Schedule::NextTurn => {
                detach(async move {
                    if let Err(thrown) = job() {
                        throw_uncaught(&thrown);
                    }
                });
                Ok(())
            },
        }
    }
}
