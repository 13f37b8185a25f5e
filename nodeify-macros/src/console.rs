use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    token,
    Expr,
};

const METHODS: &[&str] = &["log", "debug", "info", "warn", "error"];

const MAX_FIXED_ARITY: usize = 7;

#[derive(Debug, Clone)]
pub struct Input {
    pub method: Ident,
    pub arguments: Vec<Expr>,
}

impl Parse for Input {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let method = input.parse()?;
        let mut arguments = Vec::new();
        if input.peek(token::Semi) {
            input.parse::<token::Semi>()?;
            arguments.extend(
                input.parse_terminated(Expr::parse, token::Comma)?.into_iter(),
            );
        }
        Ok(Self { method, arguments })
    }
}

impl Input {
    pub fn expand(&self) -> syn::Result<TokenStream> {
        let method = &self.method;
        if !METHODS.iter().any(|name| method == name) {
            return Err(syn::Error::new(
                method.span(),
                format!(
                    "unknown console method `{}`, expected one of: {}",
                    method,
                    METHODS.join(", ")
                ),
            ));
        }

        let arguments = &self.arguments;
        let expanded = if arguments.len() <= MAX_FIXED_ARITY {
            let fixed = Ident::new(
                &format!("{}_{}", method, arguments.len()),
                method.span(),
            );
            quote! {
                ::web_sys::console::#fixed(
                    #(&::wasm_bindgen::JsValue::from(#arguments)),*
                )
            }
        } else {
            quote! {
                {
                    let arguments = ::js_sys::Array::new();
                    #(arguments.push(&::wasm_bindgen::JsValue::from(#arguments));)*
                    ::web_sys::console::#method(&arguments)
                }
            }
        };
        Ok(expanded)
    }
}
