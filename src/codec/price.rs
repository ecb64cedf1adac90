//! Asking prices of a sale.

use crate::codec::{CodecError, FromData, ToData, expect_bytes};
use crate::data::BinaryNode;
use crate::types::asset::AssetName;
use crate::types::hash::{ParseHashError, PolicyId, decode_lower_hex};
use aftermarket_derive::DataCodec;
use serde::{Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU64;

/// Currency of a price: the native coin or a native asset policy.
///
/// The native coin has the empty currency symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CurrencySymbol {
    Ada,
    Policy(PolicyId),
}

impl CurrencySymbol {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Ada => &[],
            Self::Policy(policy) => policy.as_slice(),
        }
    }

    /// Parses the hex form; the empty string is the native coin.
    pub fn from_hex(s: &str) -> Result<Self, ParseHashError> {
        if s.is_empty() {
            return Ok(Self::Ada);
        }
        PolicyId::from_slice(&decode_lower_hex(s)?).map(Self::Policy)
    }
}

impl fmt::Display for CurrencySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ada => Ok(()),
            Self::Policy(policy) => write!(f, "{}", policy),
        }
    }
}

impl Serialize for CurrencySymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl ToData for CurrencySymbol {
    fn to_data(&self) -> BinaryNode {
        BinaryNode::bytes(self.as_bytes())
    }
}

impl FromData for CurrencySymbol {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        let bytes = expect_bytes(node, "CurrencySymbol")?;
        if bytes.is_empty() {
            return Ok(Self::Ada);
        }
        PolicyId::from_slice(bytes)
            .map(Self::Policy)
            .map_err(|e| CodecError::SchemaMismatch {
                expected: "CurrencySymbol",
                found: e.to_string(),
            })
    }
}

/// One acceptable payment: `amount` units of `currency_symbol.token_name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, DataCodec)]
pub struct PriceEntry {
    pub currency_symbol: CurrencySymbol,
    pub token_name: AssetName,
    pub amount: NonZeroU64,
}

impl PriceEntry {
    pub fn new(currency_symbol: CurrencySymbol, token_name: AssetName, amount: NonZeroU64) -> Self {
        Self {
            currency_symbol,
            token_name,
            amount,
        }
    }

    /// Builds an entry from the hex forms of the symbol and token name.
    pub fn from_hex(
        currency_symbol: &str,
        token_name: &str,
        amount: NonZeroU64,
    ) -> Result<Self, ParseHashError> {
        Ok(Self {
            currency_symbol: CurrencySymbol::from_hex(currency_symbol)?,
            token_name: AssetName::from_hex(token_name)?,
            amount,
        })
    }
}

/// Ordered list of acceptable prices, wrapped in constructor 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, DataCodec)]
pub struct Prices(pub Vec<PriceEntry>);

impl Prices {
    pub fn new(entries: Vec<PriceEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.0
    }
}
