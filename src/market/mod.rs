//! Marketplace index: the off-chain service that tracks listings by asset
//! fingerprint, plus the listing flows that drive it together with the
//! assembler.

pub mod http;
pub mod listing;

pub use http::HttpMarketIndex;
pub use listing::{ListingError, ListingReceipt, list_asset, unlist_asset};

use crate::types::hash::TxHash;
use crate::types::wrapper_types::BoxFuture;
use aftermarket_derive::Error;

/// Failure talking to the marketplace index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("index request failed: {0}")]
    Request(String),

    #[error("index answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("index returned an invalid transaction hash: {0:?}")]
    InvalidTxHash(String),
}

/// Listing index keyed by asset fingerprint.
pub trait MarketIndex: Send + Sync {
    /// Records a listing made by `wallet_address` at `tx_hash` for `price_ada`.
    fn list_to_sell<'a>(
        &'a self,
        wallet_address: &'a str,
        fingerprint: &'a str,
        tx_hash: &'a TxHash,
        price_ada: u64,
    ) -> BoxFuture<'a, Result<(), IndexError>>;

    /// Drops the listing of `fingerprint`.
    fn del_from_market<'a>(&'a self, fingerprint: &'a str) -> BoxFuture<'a, Result<(), IndexError>>;

    /// Transaction that listed `fingerprint`.
    fn tx_from_market<'a>(
        &'a self,
        fingerprint: &'a str,
    ) -> BoxFuture<'a, Result<TxHash, IndexError>>;
}
