use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    token::Crate,
    Attribute, Ident, Path, Token,
};

pub struct AttributeName {
    pub span: Span,
    pub name: String,
}

impl Parse for AttributeName {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Ident) {
            input.parse::<Ident>().map(|x| AttributeName {
                span: x.span(),
                name: unraw(&x),
            })
        } else if input.peek(Crate) {
            input.parse::<Crate>().map(|x| AttributeName {
                span: x.span,
                name: "crate".to_string(),
            })
        } else {
            Err(input.error("Expected ident"))
        }
    }
}

/// `crate = some::path`, the only option our attributes understand.
#[derive(Default)]
pub struct CrateOnlyAttributes {
    pub krate: Option<Path>,
}

impl Parse for CrateOnlyAttributes {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut attrs = Self::default();

        while !input.is_empty() {
            let name: AttributeName = input.parse()?;
            if name.name != "crate" {
                return Err(syn::Error::new(
                    name.span,
                    format!("Unknown attribute `{}`", name.name),
                ));
            }
            if attrs.krate.is_some() {
                return Err(syn::Error::new(name.span, "Duplicated `crate` attribute"));
            }
            input.parse::<Token![=]>()?;
            attrs.krate = Some(input.parse()?);

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(attrs)
    }
}

impl CrateOnlyAttributes {
    pub fn from_attributes(attrs: &[Attribute], name: &str) -> syn::Result<Self> {
        let mut res = Self::default();
        for attr in attrs.iter().filter(|a| a.path.is_ident(name)) {
            let parsed: Self = attr.parse_args()?;
            if parsed.krate.is_some() {
                res.krate = parsed.krate;
            }
        }
        Ok(res)
    }

    pub fn krate_or(self, default: &str) -> syn::Result<Path> {
        self.krate.map_or_else(|| syn::parse_str(default), Ok)
    }
}

pub fn unraw(ident: &Ident) -> String {
    ident.to_string().trim_start_matches("r#").to_owned()
}
