use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields};

use crate::common::CrateOnlyAttributes;

pub fn imp(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse(input)?;
    let krate = CrateOnlyAttributes::from_attributes(&input.attrs, "bit_enum")?
        .krate_or("::avr_periph")?;

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "BitEnum can only be derived for enums",
            ))
        }
    };

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "BitEnum needs at least one variant",
        ));
    }

    let mut decode = quote!();
    let mut encode = quote!();

    // Implicit discriminants count up from the last explicit one, like rustc.
    let mut last: Option<Expr> = None;
    let mut offset = 0u64;

    for variant in data.variants.iter() {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "BitEnum variants cannot carry data",
            ));
        }

        let value = if let Some((_, expr)) = &variant.discriminant {
            last = Some(expr.clone());
            offset = 0;
            quote!(((#expr) as u64))
        } else if let Some(expr) = &last {
            quote!((((#expr) as u64) + #offset))
        } else {
            quote!(#offset)
        };
        offset += 1;

        let ident = &variant.ident;
        decode = quote! {
            #decode
            if bits == #value {
                return ::core::option::Option::Some(Self::#ident);
            }
        };
        encode = quote! {
            #encode
            Self::#ident => #value,
        };
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::field::BitEnum for #ident #ty_generics #where_clause {
            #[inline]
            fn from_bits(bits: u64) -> ::core::option::Option<Self> {
                #decode
                ::core::option::Option::None
            }

            #[inline]
            fn into_bits(self) -> u64 {
                match self {
                    #encode
                }
            }
        }
    }
    .into())
}
