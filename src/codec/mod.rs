//! Mapping between domain values and ledger data.
//!
//! Every on-chain structure implements [`ToData`] and [`FromData`]. Plain
//! records derive both with `#[derive(DataCodec)]`, which lays the fields out
//! as one constructor in declaration order; shapes that are not records
//! (credentials, the staking option, non-empty lists) are written by hand.
//!
//! Decoders are pure: they borrow the node, never partially succeed, and
//! report a [`CodecError`] naming the type whose layout did not match.

pub mod address;
pub mod credential;
pub mod price;
pub mod redeemer;
pub mod sale;

pub use address::Address;
pub use credential::Credential;
pub use price::{CurrencySymbol, PriceEntry, Prices};
pub use redeemer::BeaconRedeemer;
pub use sale::{NftNames, SpotDatum};

use crate::data::{self, BinaryNode, DataError, Integer};
use crate::types::asset::AssetName;
use crate::types::encoding::Encode;
use crate::types::hash::{KeyHash, PolicyId, ScriptHash, TxHash};
use aftermarket_derive::Error;
use std::num::NonZeroU64;

/// Errors raised while mapping ledger data to domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: &'static str, found: String },

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("{0}")]
    Data(#[from] DataError),
}

impl CodecError {
    fn mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            expected,
            found: found.into(),
        }
    }
}

/// Conversion of a domain value into ledger data.
pub trait ToData {
    fn to_data(&self) -> BinaryNode;

    /// Canonical CBOR of the value's data.
    fn to_cbor(&self) -> Vec<u8> {
        self.to_data().to_bytes()
    }

    /// Canonical CBOR as lowercase hex.
    fn to_cbor_hex(&self) -> String {
        hex::encode(self.to_cbor())
    }
}

/// Conversion of ledger data back into a domain value.
pub trait FromData: Sized {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError>;

    /// Decodes CBOR and maps the result.
    fn from_cbor(bytes: &[u8]) -> Result<Self, CodecError> {
        let node = data::decode(bytes)?;
        Self::from_data(&node)
    }
}

/// Splits a constructor node into its index and fields.
pub fn constructor_parts<'a>(
    node: &'a BinaryNode,
    expected: &'static str,
) -> Result<(u64, &'a [BinaryNode]), CodecError> {
    node.as_constructor()
        .ok_or_else(|| CodecError::mismatch(expected, node.kind()))
}

/// Checks that a constructor carries exactly `arity` fields.
pub fn expect_arity(
    fields: &[BinaryNode],
    arity: usize,
    expected: &'static str,
) -> Result<(), CodecError> {
    if fields.len() != arity {
        return Err(CodecError::mismatch(
            expected,
            format!("{} fields instead of {}", fields.len(), arity),
        ));
    }
    Ok(())
}

/// Returns the fields of a constructor with the given index and arity.
pub fn constructor_fields<'a>(
    node: &'a BinaryNode,
    index: u64,
    arity: usize,
    expected: &'static str,
) -> Result<&'a [BinaryNode], CodecError> {
    let (found, fields) = constructor_parts(node, expected)?;
    if found != index {
        return Err(CodecError::mismatch(
            expected,
            format!("constructor {} instead of {}", found, index),
        ));
    }
    expect_arity(fields, arity, expected)?;
    Ok(fields)
}

/// Returns the payload of a bytes node.
pub fn expect_bytes<'a>(node: &'a BinaryNode, expected: &'static str) -> Result<&'a [u8], CodecError> {
    node.as_bytes()
        .ok_or_else(|| CodecError::mismatch(expected, node.kind()))
}

/// Returns the items of a list node.
pub fn expect_list<'a>(
    node: &'a BinaryNode,
    expected: &'static str,
) -> Result<&'a [BinaryNode], CodecError> {
    node.as_list()
        .ok_or_else(|| CodecError::mismatch(expected, node.kind()))
}

impl ToData for BinaryNode {
    fn to_data(&self) -> BinaryNode {
        self.clone()
    }
}

impl FromData for BinaryNode {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        Ok(node.clone())
    }
}

impl ToData for Integer {
    fn to_data(&self) -> BinaryNode {
        BinaryNode::Integer(self.clone())
    }
}

impl FromData for Integer {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        node.as_integer()
            .cloned()
            .ok_or_else(|| CodecError::mismatch("Integer", node.kind()))
    }
}

impl ToData for u64 {
    fn to_data(&self) -> BinaryNode {
        BinaryNode::integer(*self)
    }
}

impl FromData for u64 {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        let value = Integer::from_data(node)?;
        value
            .to_u64()
            .ok_or_else(|| CodecError::mismatch("u64", format!("integer {}", value)))
    }
}

impl ToData for NonZeroU64 {
    fn to_data(&self) -> BinaryNode {
        BinaryNode::integer(self.get())
    }
}

impl FromData for NonZeroU64 {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        let value = Integer::from_data(node)?;
        value
            .to_u64()
            .and_then(NonZeroU64::new)
            .ok_or_else(|| CodecError::mismatch("positive amount", format!("integer {}", value)))
    }
}

impl<T: ToData> ToData for Vec<T> {
    fn to_data(&self) -> BinaryNode {
        BinaryNode::List(self.iter().map(ToData::to_data).collect())
    }
}

impl<T: FromData> FromData for Vec<T> {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        expect_list(node, "list")?
            .iter()
            .map(T::from_data)
            .collect()
    }
}

impl ToData for AssetName {
    fn to_data(&self) -> BinaryNode {
        BinaryNode::bytes(self.as_bytes())
    }
}

impl FromData for AssetName {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        let bytes = expect_bytes(node, "AssetName")?;
        AssetName::new(bytes).map_err(|e| CodecError::mismatch("AssetName", e.to_string()))
    }
}

macro_rules! impl_hash_data {
    ($($name:ident),*) => {
        $(
            impl ToData for $name {
                fn to_data(&self) -> BinaryNode {
                    BinaryNode::bytes(self.as_slice())
                }
            }

            impl FromData for $name {
                fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
                    let bytes = expect_bytes(node, stringify!($name))?;
                    $name::from_slice(bytes)
                        .map_err(|e| CodecError::mismatch(stringify!($name), e.to_string()))
                }
            }
        )*
    };
}

impl_hash_data!(KeyHash, ScriptHash, PolicyId, TxHash);

#[cfg(test)]
mod tests {
    use super::*;
    use aftermarket_derive::DataCodec;

    #[derive(Debug, PartialEq, DataCodec)]
    struct Pair {
        left: u64,
        right: Vec<u64>,
    }

    #[derive(Debug, PartialEq, DataCodec)]
    #[data(constructor = 3)]
    struct Tagged(u64);

    #[derive(Debug, PartialEq, DataCodec)]
    struct Marker;

    #[derive(Debug, PartialEq, DataCodec)]
    #[repr(u8)]
    enum Action {
        Open,
        Close { at: u64 },
        Move(u64, u64),
        Far = 9,
    }

    #[test]
    fn derived_struct_layout() {
        let pair = Pair {
            left: 1,
            right: vec![2, 3],
        };
        assert_eq!(
            pair.to_data(),
            BinaryNode::constructor(
                0,
                vec![
                    BinaryNode::integer(1u64),
                    BinaryNode::list(vec![BinaryNode::integer(2u64), BinaryNode::integer(3u64)]),
                ]
            )
        );
        assert_eq!(Pair::from_data(&pair.to_data()).unwrap(), pair);
    }

    #[test]
    fn derived_struct_honours_constructor_attribute() {
        let tagged = Tagged(5);
        assert_eq!(
            tagged.to_data(),
            BinaryNode::constructor(3, vec![BinaryNode::integer(5u64)])
        );
        assert_eq!(hex::encode(tagged.to_cbor()), "d87c9f05ff");
        assert_eq!(Tagged::from_cbor(&tagged.to_cbor()).unwrap(), tagged);
    }

    #[test]
    fn derived_unit_struct() {
        assert_eq!(Marker.to_cbor_hex(), "d87980");
        assert_eq!(Marker::from_data(&BinaryNode::constructor(0, vec![])).unwrap(), Marker);
    }

    #[test]
    fn derived_struct_rejects_wrong_index_and_arity() {
        let wrong_index = BinaryNode::constructor(1, vec![BinaryNode::integer(1u64), BinaryNode::list(vec![])]);
        assert!(matches!(
            Pair::from_data(&wrong_index),
            Err(CodecError::SchemaMismatch { expected: "Pair", .. })
        ));

        let wrong_arity = BinaryNode::constructor(0, vec![BinaryNode::integer(1u64)]);
        assert!(matches!(
            Pair::from_data(&wrong_arity),
            Err(CodecError::SchemaMismatch { expected: "Pair", .. })
        ));

        assert!(matches!(
            Pair::from_data(&BinaryNode::integer(0u64)),
            Err(CodecError::SchemaMismatch { expected: "Pair", .. })
        ));
    }

    #[test]
    fn derived_enum_variants() {
        let cases = [
            (Action::Open, BinaryNode::constructor(0, vec![])),
            (
                Action::Close { at: 7 },
                BinaryNode::constructor(1, vec![BinaryNode::integer(7u64)]),
            ),
            (
                Action::Move(1, 2),
                BinaryNode::constructor(2, vec![BinaryNode::integer(1u64), BinaryNode::integer(2u64)]),
            ),
            (Action::Far, BinaryNode::constructor(9, vec![])),
        ];
        for (action, node) in cases {
            assert_eq!(action.to_data(), node);
            assert_eq!(Action::from_data(&node).unwrap(), action);
        }
    }

    #[test]
    fn derived_enum_rejects_unknown_constructor() {
        let err = Action::from_data(&BinaryNode::constructor(4, vec![])).unwrap_err();
        assert_eq!(
            err,
            CodecError::SchemaMismatch {
                expected: "Action",
                found: "constructor 4".to_string()
            }
        );
    }

    #[test]
    fn primitive_mismatches() {
        assert!(u64::from_data(&BinaryNode::integer(-1i64)).is_err());
        assert!(NonZeroU64::from_data(&BinaryNode::integer(0u64)).is_err());
        assert!(ScriptHash::from_data(&BinaryNode::bytes(vec![0u8; 27])).is_err());
        assert!(AssetName::from_data(&BinaryNode::bytes(vec![0u8; 33])).is_err());
        assert!(Vec::<u64>::from_data(&BinaryNode::bytes(vec![])).is_err());
    }

    #[test]
    fn from_cbor_reports_malformed_input() {
        assert!(matches!(
            Pair::from_cbor(&[0xd8, 0x79]),
            Err(CodecError::Data(DataError::MalformedEncoding(_)))
        ));
    }
}
