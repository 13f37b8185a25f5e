//! This module defines the console macros used for diagnostics.

/// Warns to the JavaScript/browser/node console. Syntax:
/// ```ignore
/// console_warn!($($arguments),*)
/// ```
/// Each argument is converted into a `JsValue` using `From`.
macro_rules! console_warn {
    ($($arguments:tt)*) => {
        ::nodeify_macros::console!(warn; $($arguments)*)
    };
}

pub(crate) use console_warn;
