use proc_macro::TokenStream;
use syn::parse_macro_input;

mod console;

/// Calls a `web_sys::console` method with any number of arguments. Syntax:
/// ```ignore
/// console!(method; $($arguments),*)
/// ```
///
/// Up to seven arguments are passed through the fixed-arity bindings
/// (`warn_0` ..= `warn_7`), anything longer is collected into a `js_sys::Array`.
/// Every argument is converted with `wasm_bindgen::JsValue::from`.
#[proc_macro]
pub fn console(raw_input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(raw_input as console::Input);
    match input.expand() {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
