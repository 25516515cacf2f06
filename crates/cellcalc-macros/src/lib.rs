use proc_macro::TokenStream;
use quote::quote;
use syn::{Ident, Token, parse::Parser, punctuated::Punctuated};

/* ────────────────────────── func_caps!(…) ─────────────────────────── */

/// Expands `func_caps!(PURE, REDUCTION)` inside an `impl Function for …`
/// block into the matching `fn caps(&self) -> FnCaps`.
///
/// Every identifier must name an associated constant of
/// `crate::function::FnCaps`; typos surface as ordinary compile errors.
#[proc_macro]
pub fn func_caps(input: TokenStream) -> TokenStream {
    let parser = Punctuated::<Ident, Token![,]>::parse_terminated;
    let flags = match parser.parse(input) {
        Ok(flags) => flags,
        Err(e) => return e.to_compile_error().into(),
    };

    if flags.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "func_caps! needs at least one capability",
        )
        .to_compile_error()
        .into();
    }

    let flags = flags.iter();
    let expanded = quote! {
        fn caps(&self) -> crate::function::FnCaps {
            crate::function::FnCaps::empty()
                #( | crate::function::FnCaps::#flags )*
        }
    };

    TokenStream::from(expanded)
}
