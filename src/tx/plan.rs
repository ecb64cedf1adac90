//! Immutable transaction plan folded by the assembler.
//!
//! Each `with_*` method consumes the plan and returns the next one with its
//! stage advanced, so a plan value always describes exactly what has been
//! decided so far. Chain providers receive the plan to estimate fees and to
//! serialize the final body.

use crate::codec::{BeaconRedeemer, SpotDatum, ToData};
use crate::data::BinaryNode;
use crate::ledger::address::ShelleyAddress;
use crate::ledger::network::Network;
use crate::ledger::utxo::{Utxo, Value};
use crate::registry::ScriptReference;
use crate::tx::stage::Stage;
use crate::types::asset::AssetName;
use crate::types::hash::{PolicyId, ScriptHash};

/// An output locked at a script address with an inline datum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedOutput {
    pub address: ShelleyAddress,
    pub value: Value,
    pub inline_datum: BinaryNode,
}

/// A mint run through a reference script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintAction {
    pub policy_id: PolicyId,
    pub asset_name: AssetName,
    pub quantity: i64,
    pub script_hash: ScriptHash,
    pub reference: ScriptReference,
    pub redeemer: BinaryNode,
}

impl MintAction {
    /// Mints one token of `asset_name` redeemed with the beacon redeemer.
    pub fn beacon(script_hash: ScriptHash, reference: ScriptReference, asset_name: AssetName) -> Self {
        Self {
            policy_id: PolicyId::from(script_hash),
            asset_name,
            quantity: 1,
            script_hash,
            reference,
            redeemer: BeaconRedeemer::CreateCloseOrUpdateMarketUTxOs.to_data(),
        }
    }
}

/// Everything decided about a transaction at a given stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxPlan {
    stage: Stage,
    network: Option<Network>,
    datum: Option<SpotDatum>,
    outputs: Vec<PlannedOutput>,
    mints: Vec<MintAction>,
    change_address: Option<String>,
    collateral: Option<Utxo>,
    inputs: Vec<Utxo>,
    fee: Option<u64>,
    unsigned_cbor: Option<String>,
    signed_cbor: Option<String>,
}

impl Default for TxPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl TxPlan {
    pub fn new() -> Self {
        Self {
            stage: Stage::Init,
            network: None,
            datum: None,
            outputs: Vec::new(),
            mints: Vec::new(),
            change_address: None,
            collateral: None,
            inputs: Vec::new(),
            fee: None,
            unsigned_cbor: None,
            signed_cbor: None,
        }
    }

    fn advance(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_datum(mut self, datum: SpotDatum) -> Self {
        self.datum = Some(datum);
        self.advance(Stage::DatumReady)
    }

    pub fn with_outputs(mut self, network: Network, outputs: Vec<PlannedOutput>) -> Self {
        self.network = Some(network);
        self.outputs = outputs;
        self.advance(Stage::OutputsSet)
    }

    pub fn with_mints(mut self, mints: Vec<MintAction>) -> Self {
        self.mints = mints;
        self.advance(Stage::MintingConfigured)
    }

    pub fn with_change_address(mut self, address: String) -> Self {
        self.change_address = Some(address);
        self.advance(Stage::ChangeSet)
    }

    pub fn with_collateral(mut self, collateral: Utxo) -> Self {
        self.collateral = Some(collateral);
        self.advance(Stage::CollateralAttached)
    }

    pub fn with_inputs(mut self, inputs: Vec<Utxo>) -> Self {
        self.inputs = inputs;
        self.advance(Stage::UtxosSelected)
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self.advance(Stage::FeeComputed)
    }

    pub fn with_unsigned(mut self, cbor_hex: String) -> Self {
        self.unsigned_cbor = Some(cbor_hex);
        self.advance(Stage::Completed)
    }

    pub fn with_signed(mut self, cbor_hex: String) -> Self {
        self.signed_cbor = Some(cbor_hex);
        self.advance(Stage::Signed)
    }

    pub fn submitted(self) -> Self {
        self.advance(Stage::Submitted)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn network(&self) -> Option<Network> {
        self.network
    }

    pub fn datum(&self) -> Option<&SpotDatum> {
        self.datum.as_ref()
    }

    pub fn outputs(&self) -> &[PlannedOutput] {
        &self.outputs
    }

    pub fn mints(&self) -> &[MintAction] {
        &self.mints
    }

    pub fn change_address(&self) -> Option<&str> {
        self.change_address.as_deref()
    }

    pub fn collateral(&self) -> Option<&Utxo> {
        self.collateral.as_ref()
    }

    pub fn inputs(&self) -> &[Utxo] {
        &self.inputs
    }

    pub fn fee(&self) -> Option<u64> {
        self.fee
    }

    pub fn unsigned_cbor(&self) -> Option<&str> {
        self.unsigned_cbor.as_deref()
    }

    pub fn signed_cbor(&self) -> Option<&str> {
        self.signed_cbor.as_deref()
    }

    /// Reference inputs needed by the mints, without duplicates.
    pub fn reference_inputs(&self) -> Vec<ScriptReference> {
        let mut references: Vec<ScriptReference> = Vec::new();
        for mint in &self.mints {
            if !references.contains(&mint.reference) {
                references.push(mint.reference);
            }
        }
        references
    }
}
