//! Collaborators the assembler drives: the user's wallet and a chain provider.
//!
//! Both traits return [`BoxFuture`]s so they can be used as trait objects.
//! Implementations report failures as [`ExternalError`]; the assembler
//! passes them through unchanged, tagged with the stage they interrupted.

use crate::ledger::utxo::{AssetExtended, Utxo};
use crate::tx::plan::TxPlan;
use crate::types::wrapper_types::BoxFuture;
use aftermarket_derive::Error;

/// Failure reported by a wallet, provider or index collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalError {
    /// The collaborator could not be reached or answered garbage.
    #[error("request failed: {0}")]
    Request(String),

    /// The collaborator understood the request and refused it.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The user declined a signature or access prompt.
    #[error("declined by user")]
    Declined,
}

/// A connected wallet.
pub trait Wallet: Send + Sync {
    /// Network id as reported by the wallet: 0 for testnet.
    fn network_id(&self) -> BoxFuture<'_, Result<u8, ExternalError>>;

    /// Bech32 reward addresses, primary first.
    fn reward_addresses(&self) -> BoxFuture<'_, Result<Vec<String>, ExternalError>>;

    /// Bech32 change address, if the wallet exposes one.
    fn change_address(&self) -> BoxFuture<'_, Result<Option<String>, ExternalError>>;

    /// Outputs the user set aside as collateral.
    fn collateral(&self) -> BoxFuture<'_, Result<Vec<Utxo>, ExternalError>>;

    /// All spendable outputs.
    fn utxos(&self) -> BoxFuture<'_, Result<Vec<Utxo>, ExternalError>>;

    /// Native assets held by the wallet.
    fn assets(&self) -> BoxFuture<'_, Result<Vec<AssetExtended>, ExternalError>>;

    /// Signs a CBOR hex transaction and returns the signed CBOR hex.
    fn sign_tx<'a>(
        &'a self,
        cbor_hex: &'a str,
        partial: bool,
    ) -> BoxFuture<'a, Result<String, ExternalError>>;

    /// Submits a signed transaction and returns its hash as hex.
    fn submit_tx<'a>(&'a self, cbor_hex: &'a str) -> BoxFuture<'a, Result<String, ExternalError>>;
}

/// Chain access used to price and serialize a plan.
pub trait ChainProvider: Send + Sync {
    /// Fee estimate in lovelace for the plan as it stands.
    fn calculate_fee<'a>(&'a self, plan: &'a TxPlan) -> BoxFuture<'a, Result<u64, ExternalError>>;

    /// Balances the plan and returns the unsigned body as CBOR hex.
    fn complete<'a>(&'a self, plan: &'a TxPlan) -> BoxFuture<'a, Result<String, ExternalError>>;
}
