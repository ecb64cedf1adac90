//! Derive macro for constructor-indexed ledger data.
//!
//! Generates `ToData` and `FromData` implementations for structs and enums.
//!
//! # Supported Types
//!
//! - **Named structs**: `struct Price { symbol: CurrencySymbol, amount: u64 }`
//! - **Tuple structs**: `struct Prices(Vec<PriceEntry>)`
//! - **Unit structs**: `struct Marker`
//! - **Enums**: `enum Redeemer { Create, Close { id: TxHash } }`
//!
//! Unions are not supported.
//!
//! # Data Layout
//!
//! A struct becomes a single constructor whose fields are the struct fields in
//! declaration order. The constructor index defaults to 0 and can be set with
//! `#[data(constructor = N)]`. Each enum variant becomes its own constructor,
//! indexed by the variant discriminant (explicit `= N` values are honoured).
//!
//! Decoding checks both the constructor index and the field count, and reports
//! a schema mismatch naming the target type when either differs.

use proc_macro::TokenStream;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields, parse_macro_input};

/// Derives `ToData` and `FromData` for a type.
///
/// # Example
///
/// ```ignore
/// use aftermarket_derive::DataCodec;
///
/// #[derive(DataCodec)]
/// pub struct PriceEntry {
///     pub currency_symbol: CurrencySymbol,
///     pub token_name: AssetName,
///     pub amount: NonZeroU64,
/// }
/// ```
///
/// # Generated Code
///
/// ```ignore
/// impl ToData for PriceEntry {
///     fn to_data(&self) -> BinaryNode {
///         BinaryNode::constructor(0, vec![
///             ToData::to_data(&self.currency_symbol),
///             ToData::to_data(&self.token_name),
///             ToData::to_data(&self.amount),
///         ])
///     }
/// }
///
/// impl FromData for PriceEntry {
///     fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
///         let fields = constructor_fields(node, 0, 3, "PriceEntry")?;
///         Ok(Self {
///             currency_symbol: FromData::from_data(&fields[0])?,
///             token_name: FromData::from_data(&fields[1])?,
///             amount: FromData::from_data(&fields[2])?,
///         })
///     }
/// }
/// ```
pub fn derive_data_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_data_codec(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_data_codec(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let type_name = name.to_string();

    let (to_body, from_body) = match &input.data {
        syn::Data::Struct(data_struct) => {
            let index = constructor_attr(&input.attrs)?.unwrap_or(0);
            struct_bodies(&data_struct.fields, index, &type_name)
        }
        syn::Data::Enum(data_enum) => {
            if let Some(attr) = input.attrs.iter().find(|a| a.path().is_ident("data")) {
                return Err(syn::Error::new_spanned(
                    attr,
                    "#[data(constructor = N)] applies to structs; enum variants are indexed by their discriminant",
                ));
            }
            enum_bodies(data_enum, &type_name)?
        }
        syn::Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "DataCodec derive does not support unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics crate::codec::ToData for #name #ty_generics #where_clause {
            fn to_data(&self) -> crate::data::BinaryNode {
                #to_body
            }
        }

        impl #impl_generics crate::codec::FromData for #name #ty_generics #where_clause {
            fn from_data(
                node: &crate::data::BinaryNode,
            ) -> ::std::result::Result<Self, crate::codec::CodecError> {
                #from_body
            }
        }
    })
}

/// Builds the `to_data` and `from_data` bodies for a struct.
fn struct_bodies(
    fields: &Fields,
    index: u64,
    type_name: &str,
) -> (proc_macro2::TokenStream, proc_macro2::TokenStream) {
    match fields {
        Fields::Named(named) => {
            let names: Vec<_> = named.named.iter().map(|f| &f.ident).collect();
            let arity = names.len();
            let positions: Vec<_> = (0..arity).map(syn::Index::from).collect();

            let to_body = quote! {
                crate::data::BinaryNode::constructor(
                    #index,
                    vec![#(crate::codec::ToData::to_data(&self.#names)),*],
                )
            };
            let from_body = quote! {
                let fields = crate::codec::constructor_fields(node, #index, #arity, #type_name)?;
                Ok(Self {
                    #(#names: crate::codec::FromData::from_data(&fields[#positions])?,)*
                })
            };
            (to_body, from_body)
        }
        Fields::Unnamed(unnamed) => {
            let arity = unnamed.unnamed.len();
            let positions: Vec<_> = (0..arity).map(syn::Index::from).collect();

            let to_body = quote! {
                crate::data::BinaryNode::constructor(
                    #index,
                    vec![#(crate::codec::ToData::to_data(&self.#positions)),*],
                )
            };
            let from_body = quote! {
                let fields = crate::codec::constructor_fields(node, #index, #arity, #type_name)?;
                Ok(Self(
                    #(crate::codec::FromData::from_data(&fields[#positions])?,)*
                ))
            };
            (to_body, from_body)
        }
        Fields::Unit => {
            let to_body = quote! {
                crate::data::BinaryNode::constructor(#index, ::std::vec::Vec::new())
            };
            let from_body = quote! {
                crate::codec::constructor_fields(node, #index, 0usize, #type_name)?;
                Ok(Self)
            };
            (to_body, from_body)
        }
    }
}

/// Builds the `to_data` and `from_data` bodies for an enum.
///
/// Every variant maps to one constructor; the decoder dispatches on the
/// constructor index and rejects indices that name no variant.
fn enum_bodies(
    data_enum: &DataEnum,
    type_name: &str,
) -> syn::Result<(proc_macro2::TokenStream, proc_macro2::TokenStream)> {
    let discriminants = compute_discriminants(data_enum)?;

    let to_arms = data_enum.variants.iter().zip(discriminants.iter()).map(|(variant, &idx)| {
        let variant_name = &variant.ident;

        match &variant.fields {
            Fields::Unit => quote! {
                Self::#variant_name => crate::data::BinaryNode::constructor(#idx, ::std::vec::Vec::new()),
            },
            Fields::Unnamed(fields) => {
                let bindings: Vec<_> = (0..fields.unnamed.len())
                    .map(|i| quote::format_ident!("f{}", i))
                    .collect();
                quote! {
                    Self::#variant_name(#(#bindings),*) => crate::data::BinaryNode::constructor(
                        #idx,
                        vec![#(crate::codec::ToData::to_data(#bindings)),*],
                    ),
                }
            }
            Fields::Named(fields) => {
                let bindings: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
                quote! {
                    Self::#variant_name { #(#bindings),* } => crate::data::BinaryNode::constructor(
                        #idx,
                        vec![#(crate::codec::ToData::to_data(#bindings)),*],
                    ),
                }
            }
        }
    });

    let from_arms = data_enum.variants.iter().zip(discriminants.iter()).map(|(variant, &idx)| {
        let variant_name = &variant.ident;

        match &variant.fields {
            Fields::Unit => quote! {
                #idx => {
                    crate::codec::expect_arity(fields, 0usize, #type_name)?;
                    Ok(Self::#variant_name)
                }
            },
            Fields::Unnamed(fields) => {
                let arity = fields.unnamed.len();
                let positions: Vec<_> = (0..arity).map(syn::Index::from).collect();
                quote! {
                    #idx => {
                        crate::codec::expect_arity(fields, #arity, #type_name)?;
                        Ok(Self::#variant_name(
                            #(crate::codec::FromData::from_data(&fields[#positions])?,)*
                        ))
                    }
                }
            }
            Fields::Named(fields) => {
                let arity = fields.named.len();
                let names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
                let positions: Vec<_> = (0..arity).map(syn::Index::from).collect();
                quote! {
                    #idx => {
                        crate::codec::expect_arity(fields, #arity, #type_name)?;
                        Ok(Self::#variant_name {
                            #(#names: crate::codec::FromData::from_data(&fields[#positions])?,)*
                        })
                    }
                }
            }
        }
    });

    let to_body = quote! {
        match self {
            #(#to_arms)*
        }
    };
    let from_body = quote! {
        let (index, fields) = crate::codec::constructor_parts(node, #type_name)?;
        match index {
            #(#from_arms)*
            other => Err(crate::codec::CodecError::SchemaMismatch {
                expected: #type_name,
                found: format!("constructor {}", other),
            }),
        }
    };

    Ok((to_body, from_body))
}

/// Reads the optional `#[data(constructor = N)]` attribute.
fn constructor_attr(attrs: &[syn::Attribute]) -> syn::Result<Option<u64>> {
    let mut index = None;

    for attr in attrs {
        if !attr.path().is_ident("data") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                let lit: syn::LitInt = meta.value()?.parse()?;
                index = Some(lit.base10_parse::<u64>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported #[data] key; expected #[data(constructor = N)]"))
            }
        })?;
    }

    Ok(index)
}

/// Computes constructor indices for each enum variant.
///
/// Follows Rust's discriminant rules:
/// - If explicit value provided (e.g., `Variant = 5`), use it
/// - Otherwise, increment from the previous variant's index
/// - First variant defaults to 0 if no explicit value
fn compute_discriminants(data_enum: &DataEnum) -> syn::Result<Vec<u64>> {
    let mut discriminants = Vec::with_capacity(data_enum.variants.len());
    let mut next_discriminant: u64 = 0;

    for variant in &data_enum.variants {
        let discriminant = match &variant.discriminant {
            Some((_, expr)) => parse_discriminant_expr(expr)?,
            None => next_discriminant,
        };

        if discriminants.contains(&discriminant) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("constructor index {discriminant} is used by more than one variant"),
            ));
        }

        discriminants.push(discriminant);
        next_discriminant = discriminant.checked_add(1).ok_or_else(|| {
            syn::Error::new_spanned(variant, "constructor index overflows u64")
        })?;
    }

    Ok(discriminants)
}

/// Parses a discriminant expression to extract its constructor index.
fn parse_discriminant_expr(expr: &syn::Expr) -> syn::Result<u64> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(lit_int),
            ..
        }) => lit_int.base10_parse::<u64>(),
        _ => Err(syn::Error::new_spanned(
            expr,
            "constructor index must be a non-negative integer literal",
        )),
    }
}
