//! Derive macros for the aftermarket crate.
//!
//! Provides:
//! - `#[derive(DataCodec)]` - constructor-indexed ledger data mapping
//! - `#[derive(Error)]` - error type boilerplate (thiserror replacement)

mod data_codec;
mod error;

use proc_macro::TokenStream;

/// Implements `ToData` and `FromData` by mapping fields, in declaration order,
/// onto the fields of a data constructor.
#[proc_macro_derive(DataCodec, attributes(data))]
pub fn derive_data_codec(input: TokenStream) -> TokenStream {
    data_codec::derive_data_codec(input)
}

/// Automatically implements `Display` and `Error` traits for error types.
#[proc_macro_derive(Error, attributes(error, from, source))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
