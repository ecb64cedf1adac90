//! Addresses as they appear inside datums.

use crate::codec::credential::Credential;
use crate::codec::{CodecError, FromData, ToData, constructor_fields, constructor_parts};
use crate::data::BinaryNode;
use serde::Serialize;

/// Payment credential plus an optional staking credential.
///
/// Layout: `Constructor(0, [payment, staking])` where the staking option is
/// `Constructor(0, [])` when absent and
/// `Constructor(1, [Constructor(0, [credential])])` when present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    pub payment: Credential,
    pub stake: Option<Credential>,
}

impl Address {
    pub fn new(payment: Credential, stake: Option<Credential>) -> Self {
        Self { payment, stake }
    }
}

/// Staking option constructor when no staking credential is set.
const STAKE_ABSENT: u64 = 0;
/// Staking option constructor wrapping a staking credential.
const STAKE_PRESENT: u64 = 1;

fn stake_to_data(stake: &Option<Credential>) -> BinaryNode {
    match stake {
        None => BinaryNode::constructor(STAKE_ABSENT, vec![]),
        Some(credential) => BinaryNode::constructor(
            STAKE_PRESENT,
            vec![BinaryNode::constructor(0, vec![credential.to_data()])],
        ),
    }
}

fn stake_from_data(node: &BinaryNode) -> Result<Option<Credential>, CodecError> {
    let (index, fields) = constructor_parts(node, "StakingCredential")?;
    match (index, fields) {
        (STAKE_ABSENT, []) => Ok(None),
        (STAKE_PRESENT, [inner]) => {
            let inner = constructor_fields(inner, 0, 1, "StakingCredential")?;
            Ok(Some(Credential::from_data(&inner[0])?))
        }
        _ => Err(CodecError::SchemaMismatch {
            expected: "StakingCredential",
            found: format!("constructor {} with {} fields", index, fields.len()),
        }),
    }
}

impl ToData for Address {
    fn to_data(&self) -> BinaryNode {
        BinaryNode::constructor(0, vec![self.payment.to_data(), stake_to_data(&self.stake)])
    }
}

impl FromData for Address {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        let fields = constructor_fields(node, 0, 2, "Address")?;
        Ok(Self {
            payment: Credential::from_data(&fields[0])?,
            stake: stake_from_data(&fields[1])?,
        })
    }
}
