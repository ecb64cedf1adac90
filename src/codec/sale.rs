//! The spot sale datum locked with every listing.

use crate::codec::address::Address;
use crate::codec::price::Prices;
use crate::codec::{CodecError, FromData, ToData, expect_list};
use crate::data::BinaryNode;
use crate::types::asset::AssetName;
use crate::types::hash::{PolicyId, ScriptHash};
use aftermarket_derive::DataCodec;
use serde::Serialize;

/// Asset names of the NFTs in a sale. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NftNames(Vec<AssetName>);

impl NftNames {
    /// Returns `None` when `names` is empty.
    pub fn new(names: Vec<AssetName>) -> Option<Self> {
        if names.is_empty() {
            None
        } else {
            Some(Self(names))
        }
    }

    pub fn as_slice(&self) -> &[AssetName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl ToData for NftNames {
    fn to_data(&self) -> BinaryNode {
        self.0.to_data()
    }
}

impl FromData for NftNames {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        if expect_list(node, "NftNames")?.is_empty() {
            return Err(CodecError::SchemaMismatch {
                expected: "NftNames",
                found: "empty list".to_string(),
            });
        }
        Ok(Self(Vec::<AssetName>::from_data(node)?))
    }
}

/// Datum of a spot sale output.
///
/// Seven fields in constructor 0, in this order: beacon currency symbol,
/// observer script hash, NFT policy id, NFT names, seller payment address,
/// deposit in lovelace, asking prices.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, DataCodec)]
pub struct SpotDatum {
    pub beacon_id: PolicyId,
    pub observer_hash: ScriptHash,
    pub nft_policy_id: PolicyId,
    pub nft_names: NftNames,
    pub payment_address: Address,
    pub deposit: u64,
    pub price: Prices,
}
