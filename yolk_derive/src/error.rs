//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations from a
//! `#[error("...")]` message on every enum variant (or on the struct itself).
//!
//! # Usage
//!
//! ```ignore
//! use yolk_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum DecodeError {
//!     #[error("invalid opcode {opcode} at offset {offset}")]
//!     InvalidOpcode { opcode: u8, offset: usize },
//!
//!     #[error("{0}")]
//!     Other(String),
//!
//!     #[error("empty buffer")]
//!     Empty,
//! }
//! ```
//!
//! Positional placeholders (`{0}`) address tuple fields, named placeholders
//! address struct fields. Fields the message does not mention are left
//! unbound, so a variant may carry data that only shows up through accessors.

use std::collections::BTreeSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_error_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_error_derive(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data_enum) => {
            let arms = data_enum
                .variants
                .iter()
                .map(|variant| {
                    let message = error_message(&variant.attrs, &variant.ident, "variant")?;
                    let variant_name = &variant.ident;
                    let parts = display_parts(&variant.fields, &message);
                    let (pattern, format, args) = (parts.pattern, parts.format, parts.args);
                    Ok(quote! {
                        Self::#variant_name #pattern => ::std::write!(__formatter, #format #args),
                    })
                })
                .collect::<syn::Result<Vec<_>>>()?;

            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Struct(data_struct) => {
            let message = error_message(&input.attrs, &input.ident, "type")?;
            let parts = display_parts(&data_struct.fields, &message);
            let (pattern, format, args) = (parts.pattern, parts.format, parts.args);
            quote! {
                let Self #pattern = self;
                ::std::write!(__formatter, #format #args)
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error derive does not support unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, __formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Destructuring pattern, rewritten format string and named format arguments
/// for one variant or struct.
struct DisplayParts {
    pattern: TokenStream2,
    format: LitStr,
    args: TokenStream2,
}

fn display_parts(fields: &Fields, message: &LitStr) -> DisplayParts {
    let (format, used) = rewrite_placeholders(&message.value());
    let format = LitStr::new(&format, message.span());

    let mut bound: Vec<Ident> = Vec::new();
    let pattern = match fields {
        Fields::Unit => TokenStream2::new(),
        Fields::Named(named) => {
            bound = named
                .named
                .iter()
                .filter_map(|field| field.ident.clone())
                .filter(|ident| used.contains(&ident.to_string()))
                .collect();
            quote!({ #(#bound,)* .. })
        }
        Fields::Unnamed(unnamed) => {
            let mut slots = Vec::with_capacity(unnamed.unnamed.len());
            for index in 0..unnamed.unnamed.len() {
                let ident = format_ident!("f{}", index);
                if used.contains(&ident.to_string()) {
                    slots.push(ident.to_token_stream());
                    bound.push(ident);
                } else {
                    slots.push(quote!(_));
                }
            }
            quote!(( #(#slots),* ))
        }
    };

    let args = quote!( #(, #bound = #bound)* );
    DisplayParts {
        pattern,
        format,
        args,
    }
}

/// Returns the message from the `#[error("...")]` attribute.
fn error_message(attrs: &[Attribute], target: &Ident, what: &str) -> syn::Result<LitStr> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                target,
                format!(
                    "missing #[error(\"...\")] attribute on {what} `{target}`; every error must declare a display message"
                ),
            )
        })?;

    attr.parse_args::<LitStr>().map_err(|_| {
        syn::Error::new_spanned(
            attr,
            "invalid #[error] attribute: expected a string literal like #[error(\"invalid opcode {opcode}\")]",
        )
    })
}

/// Renames positional placeholders `{0}` to `{f0}` and collects every
/// placeholder name the message uses. Escaped braces are kept as-is.
fn rewrite_placeholders(message: &str) -> (String, BTreeSet<String>) {
    let mut out = String::with_capacity(message.len() + 4);
    let mut used = BTreeSet::new();
    let mut chars = message.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push_str("{{");
            }
            '{' => {
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    inner.push(c);
                }

                let (name, spec) = match inner.split_once(':') {
                    Some((name, spec)) => (name, Some(spec)),
                    None => (inner.as_str(), None),
                };
                let name = if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
                    format!("f{name}")
                } else {
                    name.to_string()
                };

                out.push('{');
                out.push_str(&name);
                if let Some(spec) = spec {
                    out.push(':');
                    out.push_str(spec);
                }
                out.push('}');

                if !name.is_empty() {
                    used.insert(name);
                }
            }
            _ => out.push(c),
        }
    }

    (out, used)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_placeholders_are_renamed() {
        let (format, used) = rewrite_placeholders("io error: {0} ({1:?})");
        assert_eq!(format, "io error: {f0} ({f1:?})");
        assert!(used.contains("f0"));
        assert!(used.contains("f1"));
    }

    #[test]
    fn named_placeholders_are_collected() {
        let (format, used) = rewrite_placeholders("Instruction {line}: Unknown instruction {mnemonic}.");
        assert_eq!(format, "Instruction {line}: Unknown instruction {mnemonic}.");
        assert_eq!(
            used.into_iter().collect::<Vec<_>>(),
            vec!["line".to_string(), "mnemonic".to_string()]
        );
    }

    #[test]
    fn escaped_braces_are_not_placeholders() {
        let (format, used) = rewrite_placeholders("literal {{braces}} only");
        assert_eq!(format, "literal {{braces}} only");
        assert!(used.is_empty());
    }
}
