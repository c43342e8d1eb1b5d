use proc_macro::TokenStream;

mod bit_enum;
pub(crate) mod common;

fn wrap_imp(res: syn::Result<TokenStream>) -> TokenStream {
    match res {
        Ok(ts) => ts,
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derives `avr_periph::field::BitEnum` for a fieldless enum.
///
/// Every variant maps to its discriminant (explicit or implicit), so a
/// bitfield holding that value decodes to the variant. Use
/// `#[bit_enum(crate = path)]` when the runtime crate is renamed.
#[proc_macro_derive(BitEnum, attributes(bit_enum))]
pub fn bit_enum(input: TokenStream) -> TokenStream {
    wrap_imp(bit_enum::imp(input))
}
