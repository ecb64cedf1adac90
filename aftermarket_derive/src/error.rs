//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations.
//! Replacement for `thiserror` crate.
//!
//! # Usage
//!
//! ```ignore
//! use aftermarket_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum CodecError {
//!     #[error("schema mismatch: expected {expected}, found {found}")]
//!     SchemaMismatch { expected: &'static str, found: String },
//!
//!     #[error("data error: {0}")]
//!     Data(#[from] DataError),
//!
//!     #[error("invalid credential")]
//!     InvalidCredential,
//! }
//! ```
//!
//! # Supported Features
//!
//! - Unit variants: `#[error("message")]`
//! - Tuple variants with positional args: `#[error("error: {0}")]`
//! - Struct variants with named args: `#[error("expected {expected}")]`
//! - `#[from]` on the only field of a variant: generates `From<Field>` and
//!   reports the field as the error source
//! - `#[source]` on any field: reports the field as the error source
//!
//! Only the fields a message mentions are passed to `write!`, so a variant may
//! carry data that its message does not print.

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Fields, Lit, Meta, parse_macro_input};

/// Derives `Display` and `Error` for an enum or struct.
///
/// Each variant must have an `#[error("...")]` attribute specifying
/// the display message. Supports field interpolation using `{0}`, `{1}`
/// for tuple fields or `{field_name}` for struct fields.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_error_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_error_derive(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    match &input.data {
        Data::Enum(data_enum) => {
            let mut display_arms = Vec::with_capacity(data_enum.variants.len());
            let mut source_arms = Vec::with_capacity(data_enum.variants.len());
            let mut from_impls = Vec::new();

            for variant in &data_enum.variants {
                let variant_name = &variant.ident;
                let error_msg = extract_error_message(variant)?;
                let source_field = find_source_field(&variant.fields)?;

                match &variant.fields {
                    Fields::Unit => {
                        display_arms.push(quote! {
                            Self::#variant_name => write!(f, #error_msg),
                        });
                        source_arms.push(quote! {
                            Self::#variant_name => ::std::option::Option::None,
                        });
                    }
                    Fields::Unnamed(fields) => {
                        let count = fields.unnamed.len();
                        let format_str = convert_positional_to_named(&error_msg, count);
                        let used = referenced_args(&format_str);

                        let bindings: Vec<_> = (0..count)
                            .map(|i| {
                                let ident = quote::format_ident!("f{}", i);
                                if used.contains(&ident.to_string()) {
                                    quote! { #ident }
                                } else {
                                    quote! { _ }
                                }
                            })
                            .collect();
                        let args: Vec<_> = (0..count)
                            .map(|i| quote::format_ident!("f{}", i))
                            .filter(|ident| used.contains(&ident.to_string()))
                            .collect();

                        display_arms.push(quote! {
                            Self::#variant_name(#(#bindings),*) => write!(f, #format_str #(, #args = #args)*),
                        });

                        match source_field {
                            Some(SourceField { position, .. }) => {
                                let source_bindings: Vec<_> = (0..count)
                                    .map(|i| {
                                        if i == position {
                                            quote! { source }
                                        } else {
                                            quote! { _ }
                                        }
                                    })
                                    .collect();
                                source_arms.push(quote! {
                                    Self::#variant_name(#(#source_bindings),*) => ::std::option::Option::Some(
                                        source as &(dyn ::std::error::Error + 'static)
                                    ),
                                });
                            }
                            None => source_arms.push(quote! {
                                Self::#variant_name(..) => ::std::option::Option::None,
                            }),
                        }
                    }
                    Fields::Named(fields) => {
                        let used = referenced_args(&error_msg);
                        let mentioned: Vec<_> = fields
                            .named
                            .iter()
                            .filter_map(|f| f.ident.as_ref())
                            .filter(|ident| used.contains(&ident.to_string()))
                            .collect();

                        display_arms.push(quote! {
                            Self::#variant_name { #(#mentioned,)* .. } => write!(f, #error_msg #(, #mentioned = #mentioned)*),
                        });

                        match source_field {
                            Some(SourceField { position, .. }) => {
                                let field_ident = &fields.named[position].ident;
                                source_arms.push(quote! {
                                    Self::#variant_name { #field_ident: source, .. } => ::std::option::Option::Some(
                                        source as &(dyn ::std::error::Error + 'static)
                                    ),
                                });
                            }
                            None => source_arms.push(quote! {
                                Self::#variant_name { .. } => ::std::option::Option::None,
                            }),
                        }
                    }
                }

                if let Some(SourceField { from: true, .. }) = source_field {
                    from_impls.push(expand_from_impl(input, variant)?);
                }
            }

            Ok(quote! {
                impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
                    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                        match self {
                            #(#display_arms)*
                        }
                    }
                }

                impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {
                    fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                        match self {
                            #(#source_arms)*
                        }
                    }
                }

                #(#from_impls)*
            })
        }
        Data::Struct(data_struct) => {
            let error_msg = extract_error_message_from_attrs(
                &input.attrs,
                &input.ident,
                &format!("type `{}`", input.ident),
            )?;

            let display_body = match &data_struct.fields {
                Fields::Unit => {
                    quote! {
                        write!(f, #error_msg)
                    }
                }
                Fields::Named(fields) => {
                    let used = referenced_args(&error_msg);
                    let mentioned: Vec<_> = fields
                        .named
                        .iter()
                        .filter_map(|f| f.ident.as_ref())
                        .filter(|ident| used.contains(&ident.to_string()))
                        .collect();
                    quote! {
                        write!(f, #error_msg #(, #mentioned = self.#mentioned)*)
                    }
                }
                Fields::Unnamed(fields) => {
                    let format_str = convert_positional_to_named(&error_msg, fields.unnamed.len());
                    let used = referenced_args(&format_str);
                    let (field_idents, field_indices): (Vec<_>, Vec<_>) = (0..fields.unnamed.len())
                        .filter(|i| used.contains(&format!("f{}", i)))
                        .map(|i| (quote::format_ident!("f{}", i), syn::Index::from(i)))
                        .unzip();
                    quote! {
                        write!(f, #format_str #(, #field_idents = self.#field_indices)*)
                    }
                }
            };

            let source_body = match find_source_field(&data_struct.fields)? {
                Some(SourceField { position, .. }) => {
                    let accessor = match &data_struct.fields {
                        Fields::Named(fields) => {
                            let ident = &fields.named[position].ident;
                            quote! { self.#ident }
                        }
                        _ => {
                            let index = syn::Index::from(position);
                            quote! { self.#index }
                        }
                    };
                    quote! {
                        ::std::option::Option::Some(&#accessor as &(dyn ::std::error::Error + 'static))
                    }
                }
                None => quote! { ::std::option::Option::None },
            };

            Ok(quote! {
                impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
                    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                        #display_body
                    }
                }

                impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {
                    fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                        #source_body
                    }
                }
            })
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            input,
            "Error derive does not support unions",
        )),
    }
}

/// Field that `source()` reports, and whether it also gets a `From` impl.
#[derive(Clone, Copy)]
struct SourceField {
    position: usize,
    from: bool,
}

/// Finds the field marked `#[from]` or `#[source]`, if any.
fn find_source_field(fields: &Fields) -> syn::Result<Option<SourceField>> {
    let mut found: Option<SourceField> = None;

    for (position, field) in fields.iter().enumerate() {
        let from = field.attrs.iter().any(|a| a.path().is_ident("from"));
        let source = field.attrs.iter().any(|a| a.path().is_ident("source"));
        if !from && !source {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "only one field per variant may be marked #[from] or #[source]",
            ));
        }
        if from && fields.len() != 1 {
            return Err(syn::Error::new_spanned(
                field,
                "#[from] requires the variant to have exactly one field",
            ));
        }
        found = Some(SourceField { position, from });
    }

    Ok(found)
}

/// Generates `impl From<Field> for Error` for a `#[from]` variant.
fn expand_from_impl(
    input: &DeriveInput,
    variant: &syn::Variant,
) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let variant_name = &variant.ident;

    let (ty, construct) = match &variant.fields {
        Fields::Unnamed(fields) => {
            let ty = &fields.unnamed[0].ty;
            (ty, quote! { Self::#variant_name(value) })
        }
        Fields::Named(fields) => {
            let field = &fields.named[0];
            let ident = &field.ident;
            (&field.ty, quote! { Self::#variant_name { #ident: value } })
        }
        Fields::Unit => {
            return Err(syn::Error::new_spanned(
                variant,
                "#[from] requires a field to convert from",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::convert::From<#ty> for #name #ty_generics #where_clause {
            fn from(value: #ty) -> Self {
                #construct
            }
        }
    })
}

/// Extracts the error message from a variant's `#[error("...")]` attribute.
fn extract_error_message(variant: &syn::Variant) -> syn::Result<String> {
    let variant_name = variant.ident.to_string();
    extract_error_message_from_attrs(
        &variant.attrs,
        &variant.ident,
        &format!("variant `{}`", variant_name),
    )
}

/// Extracts the error message from attributes.
fn extract_error_message_from_attrs<T: ToTokens>(
    attrs: &[syn::Attribute],
    target: &T,
    target_desc: &str,
) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("error") {
            if let Meta::List(meta_list) = &attr.meta {
                let tokens = meta_list.tokens.clone();
                let lit = syn::parse2::<Lit>(tokens).map_err(|_| {
                    syn::Error::new_spanned(
                        &attr.meta,
                        "failed to parse #[error] attribute; expected a string literal like #[error(\"unknown script type: {0}\")]",
                    )
                })?;

                if let Lit::Str(lit_str) = lit {
                    return Ok(lit_str.value());
                }

                return Err(syn::Error::new_spanned(
                    &attr.meta,
                    "invalid #[error] attribute: message must be a string literal",
                ));
            }

            return Err(syn::Error::new_spanned(
                &attr.meta,
                "invalid #[error] attribute; use #[error(\"message\")] to describe the error",
            ));
        }
    }

    Err(syn::Error::new_spanned(
        target,
        format!(
            "missing #[error(\"...\")] attribute on {}; every error variant must declare a display message",
            target_desc
        ),
    ))
}

/// Converts positional format args `{0}`, `{1:?}` to named args `{f0}`, `{f1:?}`.
fn convert_positional_to_named(format_str: &str, field_count: usize) -> String {
    let mut result = format_str.to_string();
    for i in (0..field_count).rev() {
        for terminator in ['}', ':'] {
            let positional = format!("{{{}{}", i, terminator);
            let named = format!("{{f{}{}", i, terminator);
            result = result.replace(&positional, &named);
        }
    }
    result
}

/// Collects the argument names a format string interpolates.
///
/// `{{` escapes are skipped; `{name}` and `{name:spec}` both count.
fn referenced_args(format_str: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = format_str.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next == '}' || next == ':' {
                break;
            }
            name.push(next);
            chars.next();
        }
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }

    names
}
