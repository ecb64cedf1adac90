//! Redeemers passed to the beacon minting policy.

use aftermarket_derive::DataCodec;

/// Actions of the beacon minting policy.
///
/// Listing, closing and updating market outputs all go through the same
/// action, encoded as the nullary constructor 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, DataCodec)]
pub enum BeaconRedeemer {
    CreateCloseOrUpdateMarketUTxOs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, FromData, ToData};
    use crate::data::BinaryNode;

    #[test]
    fn nullary_layout() {
        assert_eq!(
            BeaconRedeemer::CreateCloseOrUpdateMarketUTxOs.to_cbor_hex(),
            "d87980"
        );
    }

    #[test]
    fn roundtrip() {
        let node = BinaryNode::constructor(0, vec![]);
        assert_eq!(
            BeaconRedeemer::from_data(&node).unwrap(),
            BeaconRedeemer::CreateCloseOrUpdateMarketUTxOs
        );
    }

    #[test]
    fn rejects_other_actions() {
        assert!(matches!(
            BeaconRedeemer::from_data(&BinaryNode::constructor(1, vec![])),
            Err(CodecError::SchemaMismatch { .. })
        ));
        assert!(BeaconRedeemer::from_data(&BinaryNode::constructor(
            0,
            vec![BinaryNode::integer(1u64)]
        ))
        .is_err());
    }
}
